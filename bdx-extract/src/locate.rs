//! Table location by landmark text.
//!
//! The dashboards expose no stable selectors, so a table is found by
//! searching for text that precedes it (a heading such as `ALARM`) and
//! taking the next `<table>`/`<tbody>`/`<thead>` block after it.

use regex::Regex;
use tracing::debug;

use crate::html::{elements, find_close_tag, find_open_tag, Element};
use crate::ExtractError;

/// The kind of block a region is bounded by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Table,
    Tbody,
    Thead,
}

impl Boundary {
    /// Lowercase tag name.
    pub fn tag(&self) -> &'static str {
        match self {
            Boundary::Table => "table",
            Boundary::Tbody => "tbody",
            Boundary::Thead => "thead",
        }
    }
}

/// A bounded slice of a page: the contents between an opening tag and its
/// closing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRegion<'a> {
    html: &'a str,
}

impl<'a> TableRegion<'a> {
    /// Inner HTML of the region.
    pub fn html(&self) -> &'a str {
        self.html
    }

    /// Table rows (`<tr>`) of the region, in document order.
    pub fn rows(&self) -> Vec<Element<'a>> {
        elements(self.html, &["tr"])
    }

    /// First nested block of the given kind, e.g. the `<thead>` of a table.
    pub fn section(&self, boundary: Boundary) -> Result<TableRegion<'a>, ExtractError> {
        region_after(self.html, 0, boundary)
    }
}

/// A region found by a pattern marker, with the marker's first capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedRegion<'a> {
    /// Text matched by the marker.
    pub marker: &'a str,
    /// Capture group 1 of the marker, if it has one and it matched.
    pub capture: Option<&'a str>,
    pub region: TableRegion<'a>,
}

/// Locate the block of kind `boundary` that follows the first occurrence
/// of `marker`.
///
/// # Errors
///
/// - [`ExtractError::MarkerNotFound`] when `marker` is absent
/// - [`ExtractError::RegionNotFound`] when no opening tag follows it
/// - [`ExtractError::UnclosedRegion`] when the opening tag is never closed
pub fn locate<'a>(
    page: &'a str,
    marker: &str,
    boundary: Boundary,
) -> Result<TableRegion<'a>, ExtractError> {
    let at = page
        .find(marker)
        .ok_or_else(|| ExtractError::MarkerNotFound(marker.to_string()))?;
    region_after(page, at + marker.len(), boundary)
}

/// Locate one region per match of `marker`.
///
/// Matches whose region cannot be bounded are skipped. Regions are not
/// deduplicated: two markers followed by the same table yield it twice.
pub fn locate_all<'a>(page: &'a str, marker: &Regex, boundary: Boundary) -> Vec<LocatedRegion<'a>> {
    marker
        .captures_iter(page)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            match region_after(page, whole.end(), boundary) {
                Ok(region) => Some(LocatedRegion {
                    marker: whole.as_str(),
                    capture: caps.get(1).map(|m| m.as_str()),
                    region,
                }),
                Err(e) => {
                    debug!("Skipping marker {:?}: {}", whole.as_str(), e);
                    None
                }
            }
        })
        .collect()
}

/// Bound the first block of kind `boundary` at or after byte `from`.
fn region_after(
    page: &str,
    from: usize,
    boundary: Boundary,
) -> Result<TableRegion<'_>, ExtractError> {
    let tag = boundary.tag();
    let lower = page.to_ascii_lowercase();

    let open = find_open_tag(&lower, tag, from).ok_or(ExtractError::RegionNotFound(tag))?;
    let open_end = page[open..]
        .find('>')
        .map(|i| open + i + 1)
        .ok_or(ExtractError::UnclosedRegion(tag))?;
    let close = find_close_tag(&lower, tag, open_end).ok_or(ExtractError::UnclosedRegion(tag))?;

    Ok(TableRegion {
        html: &page[open_end..close],
    })
}

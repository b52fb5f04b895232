//! Cooling-unit dashboard pages: unit name, alarm table and parameter table.
//!
//! Both tables are located by their heading (`ALARM`, `PARAMETER`) and share
//! a fixed column layout. Only rows with a cell whose class contains
//! `td-detail` carry data; the others are headers and spacers.

use bdx_types::{AlarmRecord, ParameterRecord};
use tracing::debug;

use crate::html::Element;
use crate::locate::{locate, Boundary, TableRegion};
use crate::text::{canonical_unit, extract_text, normalize_item, parse_value};

/// Heading that precedes the alarm table.
pub const ALARM_MARKER: &str = "ALARM";
/// Heading that precedes the parameter table.
pub const PARAMETER_MARKER: &str = "PARAMETER";
/// Class that marks a data cell. Variants such as `td-detail-x` count too.
pub const DETAIL_CLASS: &str = "td-detail";

const TITLE_OPEN: &str = r#"<h5 class="card-title mb-0">"#;
const TITLE_CLOSE: &str = "</h5>";

/// Everything parsed from one dashboard page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardRecords {
    pub name: String,
    pub alarms: Vec<AlarmRecord>,
    pub parameters: Vec<ParameterRecord>,
}

impl DashboardRecords {
    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty() && self.parameters.is_empty()
    }
}

/// Parse a dashboard page. A missing table yields no records for it.
///
/// `fallback_name` names the unit when the page has no title heading; pass
/// something unique to the page, such as its URL, so untitled dashboards do
/// not collide.
pub fn parse_dashboard(html: &str, fallback_name: &str) -> DashboardRecords {
    let name = dashboard_name(html).unwrap_or_else(|| fallback_name.to_string());

    let alarms = match locate(html, ALARM_MARKER, Boundary::Tbody) {
        Ok(region) => parse_alarms(&region, &name),
        Err(e) => {
            debug!("No alarm table on {}: {}", name, e);
            Vec::new()
        }
    };

    let parameters = match locate(html, PARAMETER_MARKER, Boundary::Tbody) {
        Ok(region) => parse_parameters(&region, &name),
        Err(e) => {
            debug!("No parameter table on {}: {}", name, e);
            Vec::new()
        }
    };

    DashboardRecords {
        name,
        alarms,
        parameters,
    }
}

/// Unit name from the card title, trimmed, with dashes turned into `_`.
pub fn dashboard_name(html: &str) -> Option<String> {
    let start = html.find(TITLE_OPEN)? + TITLE_OPEN.len();
    let end = html[start..].find(TITLE_CLOSE)? + start;
    let name = extract_text(&html[start..end]).replace('-', "_");
    (!name.is_empty()).then_some(name)
}

/// Data cells of a row, or `None` when the row is not a data row.
fn detail_cells<'a>(row: &Element<'a>) -> Option<Vec<Element<'a>>> {
    let cells = row.cells();
    cells
        .iter()
        .any(|c| c.class_contains(DETAIL_CLASS))
        .then_some(cells)
}

/// Alarm rows: item, status.
pub fn parse_alarms(region: &TableRegion<'_>, source_name: &str) -> Vec<AlarmRecord> {
    region
        .rows()
        .iter()
        .filter_map(detail_cells)
        .filter_map(|cells| {
            if cells.len() < 2 {
                debug!("Alarm row with {} cells skipped", cells.len());
                return None;
            }
            let item = normalize_item(&cells[0].text());
            let status = cells[1].text().to_lowercase();
            if item.is_empty() || status.is_empty() {
                return None;
            }
            Some(AlarmRecord {
                item,
                status,
                source_name: source_name.to_string(),
            })
        })
        .collect()
}

/// Parameter rows: item, value, unit.
///
/// The unit column wins over any unit trailing the value text.
pub fn parse_parameters(region: &TableRegion<'_>, source_name: &str) -> Vec<ParameterRecord> {
    region
        .rows()
        .iter()
        .filter_map(detail_cells)
        .filter_map(|cells| {
            if cells.len() < 3 {
                debug!("Parameter row with {} cells skipped", cells.len());
                return None;
            }
            let item = normalize_item(&cells[0].text());
            if item.is_empty() {
                return None;
            }
            let (value, trailing_unit) = match parse_value(&cells[1].text()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!("Parameter {} skipped: {}", item, e);
                    return None;
                }
            };
            let unit_cell = cells[2].text();
            let unit = if unit_cell.is_empty() {
                trailing_unit
            } else {
                canonical_unit(&unit_cell)
            };
            Some(ParameterRecord {
                item,
                value,
                unit,
                source_name: source_name.to_string(),
            })
        })
        .collect()
}

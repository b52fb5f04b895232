//! Low-level HTML scanning.
//!
//! Deliberately naive: no DOM is built. Tag names are matched
//! case-insensitively by searching an ASCII-lowercased copy of the input,
//! which keeps byte offsets identical to the original. Elements that are
//! never closed end where the next sibling of the same kind starts.

use crate::text::extract_text;

/// Tags treated as table cells.
pub const CELL_TAGS: &[&str] = &["td", "th"];

/// A single element found by [`elements`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    /// Lowercase tag name as it was requested.
    pub tag: &'a str,
    /// Raw attribute text of the opening tag.
    pub attrs: &'a str,
    /// Raw HTML between the opening tag and its end.
    pub inner: &'a str,
}

impl<'a> Element<'a> {
    /// Visible text of the element.
    pub fn text(&self) -> String {
        extract_text(self.inner)
    }

    /// Table cells (`td`/`th`) inside this element, in document order.
    pub fn cells(&self) -> Vec<Element<'a>> {
        elements(self.inner, CELL_TAGS)
    }

    /// Value of an attribute, without surrounding quotes.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        let lower = self.attrs.to_ascii_lowercase();
        let pattern = format!("{}=", name.to_ascii_lowercase());

        let mut from = 0;
        let start = loop {
            let idx = lower.get(from..)?.find(&pattern)? + from;
            let at_boundary = idx == 0
                || lower.as_bytes()[idx - 1].is_ascii_whitespace()
                || lower.as_bytes()[idx - 1] == b'"'
                || lower.as_bytes()[idx - 1] == b'\'';
            if at_boundary {
                break idx + pattern.len();
            }
            from = idx + 1;
        };

        let rest = &self.attrs[start..];
        match rest.chars().next()? {
            quote @ ('"' | '\'') => {
                let body = &rest[1..];
                let end = body.find(quote).unwrap_or(body.len());
                Some(&body[..end])
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '/')
                    .unwrap_or(rest.len());
                Some(&rest[..end])
            }
        }
    }

    /// Whether the `class` attribute contains `needle` anywhere.
    pub fn class_contains(&self, needle: &str) -> bool {
        self.attr("class").is_some_and(|v| v.contains(needle))
    }
}

/// Find the next opening `<tag` in `lower` at or after `from`.
///
/// The tag name must be followed by `>`, `/` or whitespace, so `<th` does not
/// match `<thead>`.
pub(crate) fn find_open_tag(lower: &str, tag: &str, from: usize) -> Option<usize> {
    let needle = format!("<{}", tag);
    let mut pos = from;
    loop {
        let idx = lower.get(pos..)?.find(&needle)? + pos;
        let after = idx + needle.len();
        match lower.as_bytes().get(after) {
            Some(b) if *b == b'>' || *b == b'/' || b.is_ascii_whitespace() => return Some(idx),
            Some(_) => pos = idx + 1,
            None => return None,
        }
    }
}

/// Find the next closing `</tag` in `lower` at or after `from`.
pub(crate) fn find_close_tag(lower: &str, tag: &str, from: usize) -> Option<usize> {
    let needle = format!("</{}", tag);
    let mut pos = from;
    loop {
        let idx = lower.get(pos..)?.find(&needle)? + pos;
        match lower.as_bytes().get(idx + needle.len()) {
            Some(b) if *b == b'>' || b.is_ascii_whitespace() => return Some(idx),
            Some(_) => pos = idx + 1,
            None => return None,
        }
    }
}

fn next_open<'t>(lower: &str, tags: &[&'t str], from: usize) -> Option<(usize, &'t str)> {
    tags.iter()
        .filter_map(|tag| find_open_tag(lower, tag, from).map(|idx| (idx, *tag)))
        .min_by_key(|(idx, _)| *idx)
}

/// All elements whose tag is one of `tags`, in document order.
///
/// Nesting of the same tag is not supported; dashboard tables do not nest.
pub fn elements<'a>(html: &'a str, tags: &[&'a str]) -> Vec<Element<'a>> {
    let lower = html.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some((start, tag)) = next_open(&lower, tags, pos) {
        let Some(gt) = html[start..].find('>') else {
            break;
        };
        let open_end = start + gt + 1;
        let attrs = html[start + 1 + tag.len()..start + gt]
            .trim()
            .trim_end_matches('/')
            .trim_end();

        let close = find_close_tag(&lower, tag, open_end);
        let sibling = next_open(&lower, tags, open_end).map(|(idx, _)| idx);
        let end = [close, sibling]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(html.len());

        out.push(Element {
            tag,
            attrs,
            inner: &html[open_end..end],
        });

        pos = match close {
            Some(c) if c == end => html[c..].find('>').map(|i| c + i + 1).unwrap_or(html.len()),
            _ => end,
        };
    }

    out
}

//! Text extraction and normalization helpers.
//!
//! These operate on raw cell fragments such as `<td class="x"><b>23.5</b> °C</td>`
//! and on the label/unit strings that end up as metric labels.

use crate::ExtractError;

/// Unit spellings seen upstream and their canonical form.
///
/// Order matters for in-text replacement: longer spellings that contain a
/// shorter one (`%RH` contains `%`) come first.
const UNIT_TABLE: &[(&str, &str)] = &[
    ("I/min", "l/min"),
    ("L/min", "l/min"),
    ("°C", "C"),
    ("℃", "C"),
    ("degC", "C"),
    ("%RH", "percent_rh"),
    ("%rh", "percent_rh"),
    ("%", "percent"),
];

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&deg;", "°"),
    // last, so `&amp;lt;` decodes to `&lt;` and not `<`
    ("&amp;", "&"),
];

/// Remove every `<...>` tag, keeping the text between them.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Decode the handful of HTML entities the dashboards emit.
pub fn decode_entities(s: &str) -> String {
    ENTITIES
        .iter()
        .fold(s.to_string(), |acc, (entity, ch)| acc.replace(entity, ch))
}

/// Collapse whitespace runs into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an HTML fragment.
pub fn extract_text(fragment: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(fragment)))
}

/// Turn a display label into an identifier, preserving case.
///
/// Spaces and dashes become underscores, runs of underscores collapse to
/// one, and leading/trailing underscores are removed.
///
/// ```rust
/// use bdx_extract::text::normalize_label;
///
/// assert_eq!(normalize_label("CDU-1.1"), "CDU_1.1");
/// assert_eq!(normalize_label(" - Pump  A - "), "Pump_A");
/// ```
pub fn normalize_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        let ch = if ch.is_whitespace() || ch == '-' { '_' } else { ch };
        if ch == '_' && out.ends_with('_') {
            continue;
        }
        out.push(ch);
    }
    out.trim_matches('_').to_string()
}

/// Lowercased [`normalize_label`], used for alarm/parameter items and row labels.
pub fn normalize_item(s: &str) -> String {
    normalize_label(s).to_lowercase()
}

/// Canonical form of a unit string; unknown units are returned unchanged.
pub fn canonical_unit(unit: &str) -> String {
    let trimmed = unit.trim();
    UNIT_TABLE
        .iter()
        .find(|(from, _)| *from == trimmed)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| unit.to_string())
}

/// Replace every known unit spelling inside free text.
pub fn normalize_units(text: &str) -> String {
    UNIT_TABLE
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Parse a value cell such as `"12.5 I/min"`.
///
/// The text is unit-normalized, the first whitespace-delimited token is
/// parsed as the value, and whatever follows becomes the canonical unit.
///
/// ```rust
/// use bdx_extract::text::parse_value;
///
/// assert_eq!(parse_value("12.5 I/min").unwrap(), (12.5, "l/min".to_string()));
/// assert_eq!(parse_value("7").unwrap(), (7.0, String::new()));
/// assert!(parse_value("n/a").is_err());
/// ```
pub fn parse_value(text: &str) -> Result<(f64, String), ExtractError> {
    let normalized = normalize_units(text);
    let mut tokens = normalized.split_whitespace();

    let first = tokens
        .next()
        .ok_or_else(|| ExtractError::InvalidNumber(text.to_string()))?;
    let value: f64 = first
        .parse()
        .map_err(|_| ExtractError::InvalidNumber(text.to_string()))?;
    if !value.is_finite() {
        return Err(ExtractError::InvalidNumber(text.to_string()));
    }

    let rest = tokens.collect::<Vec<_>>().join(" ");
    Ok((value, canonical_unit(&rest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_text_strips_nested_tags_and_entities() {
        let cell = r#"<td class="td-detail"><span><b>23.5</b>&nbsp;&deg;C</span></td>"#;
        assert_eq!(extract_text(cell), "23.5 °C");
        assert_eq!(extract_text("<td>  A &amp; B\n  </td>"), "A & B");
    }

    #[test]
    fn decoded_angle_brackets_are_not_stripped() {
        assert_eq!(extract_text("<td>&lt;5&gt;</td>"), "<5>");
    }

    #[test]
    fn normalize_item_matches_dashboard_labels() {
        assert_eq!(normalize_item("CDU 1.1 - Data Hall"), "cdu_1.1_data_hall");
        assert_eq!(normalize_item("FWS TEMP SUP"), "fws_temp_sup");
        assert_eq!(normalize_item("__Leak--Detected__"), "leak_detected");
        assert_eq!(normalize_item("   "), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "CDU 1.1 - Data Hall",
            "a--b__c  d",
            "-_- x -_-",
            "Pump_A",
            "already_normal",
            "",
        ];
        for input in inputs {
            let once = normalize_item(input);
            assert_eq!(normalize_item(&once), once, "input {:?}", input);
            assert!(!once.contains("__"));
            assert!(!once.starts_with('_') && !once.ends_with('_'));

            let once = normalize_label(input);
            assert_eq!(normalize_label(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn canonical_unit_uses_table() {
        assert_eq!(canonical_unit("I/min"), "l/min");
        assert_eq!(canonical_unit("°C"), "C");
        assert_eq!(canonical_unit("%RH"), "percent_rh");
        assert_eq!(canonical_unit("%"), "percent");
        assert_eq!(canonical_unit(" °C "), "C");
    }

    #[test]
    fn unknown_units_pass_through_unchanged() {
        for unit in ["kW", "bar", "rpm", "", " kPa "] {
            assert_eq!(canonical_unit(unit), unit);
        }
    }

    #[test]
    fn canonical_units_are_fixed_points() {
        for (_, canonical) in UNIT_TABLE {
            assert_eq!(canonical_unit(canonical), *canonical);
        }
    }

    #[test]
    fn parse_value_routes_trailing_text_to_unit() {
        assert_eq!(parse_value("18.2 °C").unwrap(), (18.2, "C".to_string()));
        assert_eq!(parse_value("45 %RH").unwrap(), (45.0, "percent_rh".to_string()));
        assert_eq!(parse_value("3.4 kW").unwrap(), (3.4, "kW".to_string()));
        assert_eq!(parse_value("  -1.5  ").unwrap(), (-1.5, String::new()));
    }

    #[test]
    fn parse_value_rejects_non_numeric_first_token() {
        assert_eq!(
            parse_value("ON"),
            Err(ExtractError::InvalidNumber("ON".to_string()))
        );
        assert!(parse_value("").is_err());
        assert!(parse_value("NaN").is_err());
        assert!(parse_value("23.5°C").is_err());
    }
}

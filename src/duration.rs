use std::time::Duration;

use thiserror::Error;

/// Suffix to nanoseconds multiplier
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("μs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
    ("h", 3_600_000_000_000.0),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("invalid number {number:?} in duration {input:?}")]
    InvalidNumber { input: String, number: String },

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { input: String, unit: String },
}

/// Parse duration strings like "30s", "1m30s", "1.5h", "500ms", "16.958µs"
///
/// A bare `0` is accepted; any other number needs a unit.
pub fn parse_duration(s: &str) -> Result<Duration, DurationError> {
    let input = s.trim();
    if input.is_empty() {
        return Err(DurationError::Empty);
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut rest = input;
    let mut nanos = 0.0;

    while !rest.is_empty() {
        let number_end = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        let number = &rest[..number_end];
        let value: f64 = number.parse().map_err(|_| DurationError::InvalidNumber {
            input: input.to_string(),
            number: number.to_string(),
        })?;
        rest = &rest[number_end..];

        let unit_end = rest.find(is_number).unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let multiplier = UNITS
            .iter()
            .find(|(suffix, _)| *suffix == unit)
            .map(|(_, m)| *m)
            .ok_or_else(|| DurationError::UnknownUnit {
                input: input.to_string(),
                unit: unit.to_string(),
            })?;

        nanos += value * multiplier;
        rest = &rest[unit_end..];
    }

    Ok(Duration::from_nanos(nanos.round() as u64))
}

/// Format a duration for display
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        "0s".to_string()
    } else if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2}µs", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2}ms", nanos as f64 / 1_000_000.0)
    } else if d.as_secs() < 60 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        let secs = d.as_secs();
        match (secs / 3600, secs % 3600 / 60, secs % 60) {
            (0, m, s) => format!("{}m{}s", m, s),
            (h, m, s) => format!("{}h{}m{}s", h, m, s),
        }
    }
}

//! The JSON sensor array returned by the temperature/humidity endpoint.
//!
//! The endpoint answers with an array such as
//! `[{"label":"S1","temp":"23.5","rh":70.2}]`, where `temp` and `rh` are
//! sometimes numbers and sometimes numeric strings.

use bdx_types::SensorReading;
use serde::Deserialize;
use tracing::debug;

use crate::ExtractError;

/// A numeric field that upstream encodes either as a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    /// The value as `f64`, if it is finite and (for text) parses.
    pub fn coerce(&self) -> Option<f64> {
        let value = match self {
            NumericField::Number(n) => *n,
            NumericField::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

#[derive(Debug, Deserialize)]
struct RawSensor {
    label: String,
    #[serde(default)]
    temp: Option<NumericField>,
    #[serde(default)]
    rh: Option<NumericField>,
}

/// Decode the sensor array.
///
/// Entries that are not objects, have a blank label, or whose `temp`/`rh`
/// cannot be coerced are skipped; the rest of the batch is kept. Labels are
/// kept exactly as sent.
///
/// # Errors
///
/// [`ExtractError::Json`] when the payload is not a JSON array.
pub fn parse_sensors(body: &[u8]) -> Result<Vec<SensorReading>, ExtractError> {
    let entries: Vec<serde_json::Value> = serde_json::from_slice(body)?;

    let readings = entries
        .into_iter()
        .filter_map(|entry| {
            let raw: RawSensor = match serde_json::from_value(entry) {
                Ok(raw) => raw,
                Err(e) => {
                    debug!("Skipping malformed sensor entry: {}", e);
                    return None;
                }
            };

            let label = raw.label;
            let temperature = raw.temp.as_ref().and_then(NumericField::coerce);
            let humidity = raw.rh.as_ref().and_then(NumericField::coerce);

            match (label.trim().is_empty(), temperature, humidity) {
                (false, Some(temperature), Some(humidity)) => Some(SensorReading {
                    label,
                    temperature,
                    humidity,
                }),
                _ => {
                    debug!(
                        "Skipping sensor {:?}: temp={:?} rh={:?}",
                        label, raw.temp, raw.rh
                    );
                    None
                }
            }
        })
        .collect();

    Ok(readings)
}

//! Typed records parsed from upstream pages.
//!
//! Records live for exactly one collection cycle: a parser produces them,
//! the synthesizer turns them into samples, and they are dropped.

use std::fmt;

/// A rendered HTML snapshot of one upstream page.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawPage {
    /// URL the page was fetched from.
    pub url: String,
    /// Full HTML text of the page.
    pub html: String,
}

impl RawPage {
    /// Create a page from its URL and HTML text.
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Temperature and humidity reported by one physical sensor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading {
    pub label: String,
    pub temperature: f64,
    pub humidity: f64,
}

/// One row of a cooling-unit dashboard's alarm table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlarmRecord {
    /// Normalized alarm item, e.g. `cdu_1.1_data_hall`.
    pub item: String,
    /// Lowercased status text, e.g. `active`.
    pub status: String,
    /// Name of the unit the alarm belongs to.
    pub source_name: String,
}

/// One row of a cooling-unit dashboard's parameter table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterRecord {
    /// Normalized parameter item.
    pub item: String,
    pub value: f64,
    /// Canonical unit (may be empty).
    pub unit: String,
    pub source_name: String,
}

/// Fields reported by a CDU status table on the liquid-cooling overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatusField {
    Status,
    FwsFlow,
    FwsTempSup,
    FwsTempRet,
    TcsFlow,
    TcsTempSup,
    TcsTempRet,
}

impl StatusField {
    /// The value used for the `type` label.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusField::Status => "status",
            StatusField::FwsFlow => "fws_flow",
            StatusField::FwsTempSup => "fws_temp_sup",
            StatusField::FwsTempRet => "fws_temp_ret",
            StatusField::TcsFlow => "tcs_flow",
            StatusField::TcsTempSup => "tcs_temp_sup",
            StatusField::TcsTempRet => "tcs_temp_ret",
        }
    }
}

impl fmt::Display for StatusField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field of a CDU status table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusFieldRecord {
    /// Unit name, e.g. `CDU_1.1`.
    pub source_name: String,
    pub field: StatusField,
    pub value: f64,
    /// Canonical unit that followed the value (may be empty).
    pub unit: String,
}

/// Fields reported per rack by a rack-matrix table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RackField {
    RackLiquidCooling,
    TcsFlow,
    TcsDeltaTemp,
    TcsTempSupply,
}

impl RackField {
    /// The value used for the `type` label.
    pub fn as_str(&self) -> &'static str {
        match self {
            RackField::RackLiquidCooling => "rack_liquid_cooling",
            RackField::TcsFlow => "tcs_flow",
            RackField::TcsDeltaTemp => "tcs_delta_temp",
            RackField::TcsTempSupply => "tcs_temp_supply",
        }
    }
}

impl fmt::Display for RackField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field of one rack column in a rack-matrix table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RackFieldRecord {
    /// Rack identifier from the header, with the `RACK ` prefix removed.
    pub rack_number: String,
    pub field: RackField,
    pub value: f64,
    pub unit: String,
}

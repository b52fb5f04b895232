//! Metric families and samples.

use std::collections::BTreeMap;
use std::fmt;

/// A named group of samples sharing one label schema.
///
/// The names and label keys are part of the exporter's public contract
/// and must not change between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MetricFamily {
    Temperature,
    Humidity,
    Cdu,
    Liquid,
    LiquidRack,
    LastCollectTimestamp,
    SourceUp,
}

impl MetricFamily {
    /// Every family, in exposition order.
    pub const ALL: [MetricFamily; 7] = [
        MetricFamily::Temperature,
        MetricFamily::Humidity,
        MetricFamily::Cdu,
        MetricFamily::Liquid,
        MetricFamily::LiquidRack,
        MetricFamily::LastCollectTimestamp,
        MetricFamily::SourceUp,
    ];

    /// Exposed metric name.
    pub fn name(&self) -> &'static str {
        match self {
            MetricFamily::Temperature => "bdx_temperature",
            MetricFamily::Humidity => "bdx_humidity",
            MetricFamily::Cdu => "bdx_cdu",
            MetricFamily::Liquid => "bdx_liquid",
            MetricFamily::LiquidRack => "bdx_liquid_rack",
            MetricFamily::LastCollectTimestamp => "bdx_last_collect_timestamp_seconds",
            MetricFamily::SourceUp => "bdx_source_up",
        }
    }

    /// Text for the `# HELP` line.
    pub fn help(&self) -> &'static str {
        match self {
            MetricFamily::Temperature => "Temperature reported by a room sensor",
            MetricFamily::Humidity => "Relative humidity reported by a room sensor",
            MetricFamily::Cdu => "Cooling distribution unit alarms and parameters",
            MetricFamily::Liquid => "Cooling distribution unit status from the liquid cooling overview",
            MetricFamily::LiquidRack => "Per-rack liquid cooling readings",
            MetricFamily::LastCollectTimestamp => "Unix timestamp of the last collection cycle",
            MetricFamily::SourceUp => "Whether a source was collected successfully in the last cycle",
        }
    }

    /// Label keys every sample of this family carries, in exposition order.
    pub fn label_keys(&self) -> &'static [&'static str] {
        match self {
            MetricFamily::Temperature | MetricFamily::Humidity => &["name"],
            MetricFamily::Cdu => &["name", "type", "item", "status", "metrix_type"],
            MetricFamily::Liquid | MetricFamily::LiquidRack => &["name", "type", "metrix_type"],
            MetricFamily::LastCollectTimestamp => &[],
            MetricFamily::SourceUp => &["source"],
        }
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value published under a metric family.
///
/// # Example
///
/// ```rust
/// use bdx_types::{MetricFamily, MetricSample};
///
/// let sample = MetricSample::new(MetricFamily::Liquid, 42.0)
///     .label("name", "CDU_1.1")
///     .label("type", "fws_flow")
///     .label("metrix_type", "l/min");
///
/// assert!(sample.has_schema_labels());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricSample {
    pub family: MetricFamily,
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

impl MetricSample {
    /// Create a sample with no labels.
    pub fn new(family: MetricFamily, value: f64) -> Self {
        Self {
            family,
            labels: BTreeMap::new(),
            value,
        }
    }

    /// Set a label, replacing any previous value for the same key.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Get a label value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Check that the sample carries exactly its family's label keys.
    pub fn has_schema_labels(&self) -> bool {
        let keys = self.family.label_keys();
        self.labels.len() == keys.len() && keys.iter().all(|k| self.labels.contains_key(*k))
    }
}

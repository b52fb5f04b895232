//! Health state written at the end of every collection cycle.

use std::collections::BTreeMap;

/// Outcome of collecting one source during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceHealth {
    pub success: bool,
    /// Number of samples the source contributed.
    pub samples: usize,
    /// Error message when the source failed.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
}

impl SourceHealth {
    /// A source that produced `samples` samples.
    pub fn succeeded(samples: usize) -> Self {
        Self {
            success: true,
            samples,
            error: None,
        }
    }

    /// A source that failed and contributed nothing.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            samples: 0,
            error: Some(error.into()),
        }
    }
}

/// Process-wide health, replaced as a whole after each cycle.
///
/// A fresh snapshot (before the first cycle) reports failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthSnapshot {
    /// Unix timestamp in milliseconds of the last cycle start.
    pub last_collect_ms: Option<u64>,
    pub last_success: bool,
    /// Per-source outcome of the last cycle, keyed by source id.
    pub sources: BTreeMap<String, SourceHealth>,
}

impl HealthSnapshot {
    /// Snapshot used at process start.
    pub fn initial() -> Self {
        Self::default()
    }

    /// `"healthy"` when the last cycle succeeded, `"unhealthy"` otherwise.
    pub fn status(&self) -> &'static str {
        if self.last_success {
            "healthy"
        } else {
            "unhealthy"
        }
    }
}

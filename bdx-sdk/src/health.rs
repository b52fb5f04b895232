//! Shared health state and its JSON report.

use std::collections::BTreeMap;
use std::sync::Arc;

use bdx_types::{HealthSnapshot, SourceHealth};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// Process-wide health, read and replaced as one unit.
#[derive(Debug, Clone)]
pub struct HealthState {
    inner: Arc<RwLock<HealthSnapshot>>,
}

impl HealthState {
    /// Health before the first cycle: unhealthy, never collected.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HealthSnapshot::initial())),
        }
    }

    /// Replace the snapshot.
    pub fn replace(&self, snapshot: HealthSnapshot) {
        *self.inner.write() = snapshot;
    }

    /// A copy of the current snapshot.
    pub fn snapshot(&self) -> HealthSnapshot {
        self.inner.read().clone()
    }

    /// The current snapshot as served on `/health`.
    pub fn report(&self) -> HealthReport {
        HealthReport::from(&*self.inner.read())
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON body of the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    /// RFC 3339 time of the last cycle start, `null` before the first cycle.
    pub last_collect: Option<String>,
    pub last_success: bool,
    pub sources: BTreeMap<String, SourceHealth>,
}

impl From<&HealthSnapshot> for HealthReport {
    fn from(snapshot: &HealthSnapshot) -> Self {
        Self {
            status: snapshot.status(),
            last_collect: snapshot.last_collect_ms.and_then(rfc3339),
            last_success: snapshot.last_success,
            sources: snapshot.sources.clone(),
        }
    }
}

impl HealthReport {
    /// Serialize to the JSON text served over HTTP.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"status":"{}","last_collect":null,"last_success":{}}}"#,
                self.status, self.last_success
            )
        })
    }
}

fn rfc3339(ms: u64) -> Option<String> {
    let ms = i64::try_from(ms).ok()?;
    DateTime::<Utc>::from_timestamp_millis(ms).map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_reports_unhealthy_and_null_timestamp() {
        let state = HealthState::new();
        let report = state.report();

        assert_eq!(report.status, "unhealthy");
        assert_eq!(report.last_collect, None);
        assert!(!report.last_success);

        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["last_collect"], serde_json::Value::Null);
        assert_eq!(json["status"], "unhealthy");
    }

    #[test]
    fn replaced_snapshot_is_reported_whole() {
        let state = HealthState::new();
        let mut sources = BTreeMap::new();
        sources.insert("trh".to_string(), SourceHealth::succeeded(4));
        sources.insert("liquid".to_string(), SourceHealth::failed("timed out"));

        state.replace(HealthSnapshot {
            last_collect_ms: Some(1_703_160_000_000),
            last_success: true,
            sources,
        });

        let report = state.report();
        assert_eq!(report.status, "healthy");
        assert_eq!(report.last_collect.as_deref(), Some("2023-12-21T12:00:00Z"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["last_success"], true);
        assert_eq!(json["sources"]["trh"]["samples"], 4);
        assert_eq!(json["sources"]["liquid"]["success"], false);
        assert_eq!(json["sources"]["liquid"]["error"], "timed out");
        assert!(json["sources"]["trh"].get("error").is_none());
    }

    #[test]
    fn clones_observe_the_same_state() {
        let state = HealthState::new();
        let reader = state.clone();
        state.replace(HealthSnapshot {
            last_collect_ms: Some(0),
            last_success: true,
            sources: BTreeMap::new(),
        });
        assert!(reader.snapshot().last_success);
        assert_eq!(reader.report().last_collect.as_deref(), Some("1970-01-01T00:00:00Z"));
    }
}

//! # bdx-types
//!
//! Core types shared by the BDX cooling telemetry exporter.
//!
//! The upstream facility-monitoring dashboards are scraped into typed
//! records, the records are synthesized into [`MetricSample`]s, and each
//! collection cycle ends with a fresh [`HealthSnapshot`].
//!
//! ```text
//! RawPage / JSON ──▶ records ──▶ MetricSample ──▶ registry generation
//!                                                     │
//!                                 HealthSnapshot ◀────┘
//! ```
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for every type in this crate
//!
//! ## Example
//!
//! ```rust
//! use bdx_types::{MetricFamily, MetricSample};
//!
//! let sample = MetricSample::new(MetricFamily::Temperature, 23.5).label("name", "S1");
//!
//! assert_eq!(sample.family.name(), "bdx_temperature");
//! assert_eq!(sample.get("name"), Some("S1"));
//! ```

mod health;
mod metrics;
mod records;

pub use health::*;
pub use metrics::*;
pub use records::*;

//! # bdx-sdk
//!
//! Metric synthesis and publication for the BDX cooling telemetry exporter.
//!
//! Records parsed in a cycle are turned into samples by [`synth`], gathered
//! into a [`Generation`], and published to a [`MetricRegistry`] in one swap.
//! The registry and the [`HealthState`] are plain values: the collector owns
//! them and hands clones to the HTTP server.
//!
//! ## Quick Start
//!
//! ```rust
//! use bdx_sdk::{synth, Generation, MetricRegistry};
//! use bdx_types::{MetricFamily, SensorReading};
//!
//! let registry = MetricRegistry::new();
//!
//! let mut generation = Generation::new();
//! generation.extend(synth::sensor_samples(&[SensorReading {
//!     label: "S1".into(),
//!     temperature: 23.5,
//!     humidity: 70.2,
//! }]));
//! registry.publish(generation);
//!
//! let current = registry.snapshot();
//! assert_eq!(current.samples(MetricFamily::Temperature)[0].value, 23.5);
//! ```
//!
//! ## Features
//!
//! - `prometheus` (default): text exposition and the hyper-based HTTP server

mod health;
mod registry;
pub mod synth;

#[cfg(feature = "prometheus")]
pub mod prometheus;

pub use health::{HealthReport, HealthState};
pub use registry::{Generation, MetricRegistry};

// Re-export types for convenience
pub use bdx_types::{HealthSnapshot, MetricFamily, MetricSample, SourceHealth};

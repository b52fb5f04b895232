//! # bdx-exporter
//!
//! Pull-based Prometheus exporter for facility cooling and environmental
//! telemetry.
//!
//! The exporter periodically collects three kinds of upstream:
//!
//! - a temperature/humidity JSON endpoint (`TRH_URL`)
//! - one or more cooling-unit dashboard pages (`CDU_URLS`)
//! - a liquid-cooling overview page (`LIQUID_URL`)
//!
//! and republishes the values as gauges on `/metrics`, with collection health
//! on `/health`.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐    ┌──────────────┐    ┌─────────────┐    ┌──────────┐
//! │  bdx-adapters  │───▶│ bdx-extract  │───▶│   bdx-sdk   │───▶│ /metrics │
//! │ (fetch pages)  │    │(parse tables)│    │ (synthesize │    │ /health  │
//! └────────────────┘    └──────────────┘    │  + publish) │    └──────────┘
//!         ▲                                 └─────────────┘
//!         │
//!   ┌─────┴─────┐
//!   │ collector │  one cycle every SCRAPE_INTERVAL
//!   └───────────┘
//! ```
//!
//! - **[`config`]**: settings from an optional file and the environment
//! - **[`collector`]**: the collection cycle and its scheduler
//! - **[`duration`]**: `30s` / `1m30s` style durations
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use bdx_exporter::{Collector, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::load(None)?;
//! let collector = Arc::new(Collector::from_settings(settings)?);
//!
//! let report = collector.collect_once().await;
//! println!("{} samples", report.samples);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```

pub mod collector;
pub mod config;
pub mod duration;

pub use collector::{Collector, CycleReport, SchedulerHandle, Source, SourceError};
pub use config::{ConfigError, Settings};
pub use duration::{format_duration, parse_duration, DurationError};

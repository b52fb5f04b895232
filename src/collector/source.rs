//! Per-source pipelines: fetch, parse, synthesize.
//!
//! Each pipeline owns its intermediate records, so sources collected
//! concurrently share nothing but the fetchers.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use bdx_adapters::{FetchError, PageFetcher, SensorFetcher};
use bdx_extract::cdu::parse_dashboard;
use bdx_extract::liquid::{parse_overview, LiquidMarkers};
use bdx_extract::sensor::parse_sensors;
use bdx_extract::ExtractError;
use bdx_sdk::synth;
use bdx_types::MetricSample;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a source contributed nothing to a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// One independently collected upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// The temperature/humidity JSON endpoint.
    Sensors,
    /// The liquid-cooling overview page.
    Liquid { url: String },
    /// One cooling-unit dashboard page.
    Dashboard { url: String },
}

impl Source {
    /// Identifier used in health output and the `bdx_source_up` metric.
    pub fn id(&self) -> String {
        match self {
            Source::Sensors => "trh".to_string(),
            Source::Liquid { .. } => "liquid".to_string(),
            Source::Dashboard { url } => format!("cdu:{}", url),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Run a fetch under a timeout; running out of time is a fetch failure.
pub(crate) async fn with_timeout<T, F>(limit: Duration, fetch: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    tokio::time::timeout(limit, fetch)
        .await
        .map_err(|_| FetchError::Timeout)?
}

pub(crate) async fn collect_sensors(
    fetcher: &dyn SensorFetcher,
    timeout: Duration,
) -> Result<Vec<MetricSample>, SourceError> {
    let body = with_timeout(timeout, fetcher.fetch_sensors()).await?;
    let readings = parse_sensors(&body)?;
    debug!("Decoded {} sensor readings", readings.len());
    Ok(synth::sensor_samples(&readings))
}

pub(crate) async fn collect_dashboard(
    fetcher: &dyn PageFetcher,
    url: &str,
    timeout: Duration,
) -> Result<Vec<MetricSample>, SourceError> {
    let page = with_timeout(timeout, fetcher.fetch_page(url)).await?;
    let records = parse_dashboard(&page.html, url);
    if records.is_empty() {
        warn!("Dashboard {} ({}) yielded no records", records.name, url);
    } else {
        debug!(
            "Dashboard {}: {} alarms, {} parameters",
            records.name,
            records.alarms.len(),
            records.parameters.len()
        );
    }

    let mut samples = synth::alarm_samples(&records.alarms);
    samples.extend(synth::parameter_samples(&records.parameters));
    Ok(samples)
}

pub(crate) async fn collect_liquid(
    fetcher: &dyn PageFetcher,
    url: &str,
    markers: &LiquidMarkers,
    timeout: Duration,
) -> Result<Vec<MetricSample>, SourceError> {
    let page = with_timeout(timeout, fetcher.fetch_page(url)).await?;
    let records = parse_overview(&page.html, markers);
    if records.is_empty() {
        warn!("Liquid cooling overview ({}) yielded no records", url);
    } else {
        debug!(
            "Liquid cooling: {} status fields, {} rack fields",
            records.statuses.len(),
            records.racks.len()
        );
    }

    let mut samples = synth::status_samples(&records.statuses);
    samples.extend(synth::rack_samples(&records.racks));
    Ok(samples)
}

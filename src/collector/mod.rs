//! The collection cycle.
//!
//! A cycle collects every configured source concurrently, each under its own
//! timeout. Whatever happens to one source, the others still publish. At the
//! end of the cycle the complete generation replaces the registry contents in
//! one write, so a failed source leaves no stale samples behind, and the
//! health snapshot is replaced as a whole.

mod scheduler;
mod source;

#[cfg(test)]
mod fakes;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use bdx_adapters::{FetchError, HttpPageFetcher, HttpSensorFetcher, PageFetcher, SensorFetcher};
use bdx_sdk::{synth, Generation, HealthState, MetricRegistry};
use bdx_types::{HealthSnapshot, MetricSample, SourceHealth};
use futures_util::future::join_all;
use tracing::{info, warn};

use crate::config::Settings;

pub use scheduler::SchedulerHandle;
pub use source::{Source, SourceError};

/// Summary of one cycle, for logging and `--once`.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub started_ms: u64,
    pub elapsed: Duration,
    pub samples: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub last_success: bool,
}

/// Drives collection cycles and owns the published state.
pub struct Collector {
    settings: Settings,
    sensors: Option<Arc<dyn SensorFetcher>>,
    pages: Arc<dyn PageFetcher>,
    registry: MetricRegistry,
    health: HealthState,
}

impl Collector {
    /// A collector over the given page fetcher, with no sensor source.
    pub fn new(settings: Settings, pages: Arc<dyn PageFetcher>) -> Self {
        Self {
            settings,
            sensors: None,
            pages,
            registry: MetricRegistry::new(),
            health: HealthState::new(),
        }
    }

    /// Enable the sensor source.
    pub fn with_sensors(mut self, sensors: Arc<dyn SensorFetcher>) -> Self {
        self.sensors = Some(sensors);
        self
    }

    /// Build HTTP fetchers from the settings.
    pub fn from_settings(settings: Settings) -> Result<Self, FetchError> {
        let pages = HttpPageFetcher::builder()
            .session(settings.session.clone())
            .timeout(settings.scrape_timeout)
            .build()?;

        let sensors = match &settings.trh_url {
            Some(url) => Some(
                HttpSensorFetcher::builder()
                    .url(url.clone())
                    .referer(settings.referer.clone())
                    .session(settings.session.clone())
                    .timeout(settings.http_timeout)
                    .build()?,
            ),
            None => None,
        };

        let mut collector = Collector::new(settings, Arc::new(pages));
        if let Some(sensors) = sensors {
            collector = collector.with_sensors(Arc::new(sensors));
        }
        Ok(collector)
    }

    /// The registry the server reads from.
    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// The health state the server reads from.
    pub fn health(&self) -> &HealthState {
        &self.health
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Sources collected each cycle, in a stable order.
    pub fn sources(&self) -> Vec<Source> {
        let mut sources = Vec::new();
        if self.sensors.is_some() {
            sources.push(Source::Sensors);
        }
        if let Some(url) = &self.settings.liquid_url {
            sources.push(Source::Liquid { url: url.clone() });
        }
        sources.extend(
            self.settings
                .cdu_urls
                .iter()
                .map(|url| Source::Dashboard { url: url.clone() }),
        );
        sources
    }

    async fn collect_source(&self, source: &Source) -> Result<Vec<MetricSample>, SourceError> {
        match source {
            Source::Sensors => match &self.sensors {
                Some(fetcher) => {
                    source::collect_sensors(fetcher.as_ref(), self.settings.http_timeout).await
                }
                None => Ok(Vec::new()),
            },
            Source::Liquid { url } => {
                source::collect_liquid(
                    self.pages.as_ref(),
                    url,
                    &self.settings.liquid_markers,
                    self.settings.scrape_timeout,
                )
                .await
            }
            Source::Dashboard { url } => {
                source::collect_dashboard(self.pages.as_ref(), url, self.settings.scrape_timeout)
                    .await
            }
        }
    }

    /// Run one cycle and publish its results.
    pub async fn collect_once(&self) -> CycleReport {
        let started_ms = now_ms();
        let started = Instant::now();

        let sources = self.sources();
        let results = join_all(sources.iter().map(|s| self.collect_source(s))).await;

        let mut generation = Generation::new();
        let mut health = BTreeMap::new();
        for (source, result) in sources.iter().zip(&results) {
            let id = source.id();
            match result {
                Ok(samples) => {
                    let replaced = samples
                        .iter()
                        .filter(|s| generation.push((*s).clone()))
                        .count();
                    if replaced > 0 {
                        warn!("Source {} repeated {} series; kept the last value of each", id, replaced);
                    }
                    generation.push(synth::source_up_sample(&id, true));
                    health.insert(id, SourceHealth::succeeded(samples.len() - replaced));
                }
                Err(e) => {
                    warn!("Source {} failed: {}", id, e);
                    generation.push(synth::source_up_sample(&id, false));
                    health.insert(id, SourceHealth::failed(e.to_string()));
                }
            }
        }
        generation.push(synth::timestamp_sample(started_ms));

        let last_success = cycle_succeeded(&sources, &results);
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let report = CycleReport {
            started_ms,
            elapsed: started.elapsed(),
            samples: generation.len(),
            succeeded,
            failed: results.len() - succeeded,
            last_success,
        };

        self.registry.publish(generation);
        self.health.replace(HealthSnapshot {
            last_collect_ms: Some(started_ms),
            last_success,
            sources: health,
        });

        info!(
            "Cycle {}: collected {} samples from {}/{} sources in {:?} (success: {})",
            self.registry.published(),
            report.samples,
            report.succeeded,
            sources.len(),
            report.elapsed,
            report.last_success
        );
        report
    }

    /// Start periodic collection on the current runtime.
    ///
    /// The first cycle runs immediately. See [`SchedulerHandle`].
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let interval = self.settings.scrape_interval;
        scheduler::spawn(self, interval)
    }
}

/// Overall success: every subsystem succeeded.
///
/// - sensors: the fetch and decode succeeded (or the source is disabled)
/// - dashboards: at least one configured dashboard succeeded (or none configured)
/// - liquid: no error (or the source is disabled)
fn cycle_succeeded(sources: &[Source], results: &[Result<Vec<MetricSample>, SourceError>]) -> bool {
    let mut dashboards_configured = false;
    let mut dashboard_ok = false;
    let mut others_ok = true;

    for (source, result) in sources.iter().zip(results) {
        match source {
            Source::Dashboard { .. } => {
                dashboards_configured = true;
                dashboard_ok |= result.is_ok();
            }
            Source::Sensors | Source::Liquid { .. } => others_ok &= result.is_ok(),
        }
    }

    others_ok && (dashboard_ok || !dashboards_configured)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

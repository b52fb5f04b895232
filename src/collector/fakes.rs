//! In-memory fetchers for collector tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bdx_adapters::{FetchError, PageFetcher, RawPage, SensorFetcher};
use parking_lot::Mutex;

/// Sensor endpoint answering with a settable response.
#[derive(Debug)]
pub struct FakeSensors {
    response: Mutex<Result<Vec<u8>, FetchError>>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSensors {
    pub fn ok(body: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Ok(body.as_bytes().to_vec())),
            delay: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, response: Result<Vec<u8>, FetchError>) {
        *self.response.lock() = response;
    }

    pub fn delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Most concurrent fetches observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SensorFetcher for FakeSensors {
    async fn fetch_sensors(&self) -> Result<Vec<u8>, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.response.lock().clone();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

/// Pages keyed by URL; unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct FakePages {
    pages: Mutex<HashMap<String, Result<String, FetchError>>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl FakePages {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_ok(&self, url: &str, html: String) {
        self.pages.lock().insert(url.to_string(), Ok(html));
    }

    pub fn set_err(&self, url: &str, err: FetchError) {
        self.pages.lock().insert(url.to_string(), Err(err));
    }

    pub fn delay(&self, url: &str, delay: Duration) {
        self.delays.lock().insert(url.to_string(), delay);
    }
}

#[async_trait]
impl PageFetcher for FakePages {
    async fn fetch_page(&self, url: &str) -> Result<RawPage, FetchError> {
        let delay = self.delays.lock().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let page = self.pages.lock().get(url).cloned();
        match page {
            Some(Ok(html)) => Ok(RawPage::new(url, html)),
            Some(Err(e)) => Err(e),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// A cooling-unit dashboard with the given alarm and parameter rows.
pub fn dashboard_html(title: &str, alarms: &[(&str, &str)], parameters: &[(&str, &str, &str)]) -> String {
    let alarm_rows: String = alarms
        .iter()
        .map(|(item, status)| {
            format!(
                r#"<tr><td class="td-detail">{}</td><td class="td-detail">{}</td></tr>"#,
                item, status
            )
        })
        .collect();
    let parameter_rows: String = parameters
        .iter()
        .map(|(item, value, unit)| {
            format!(
                r#"<tr><td class="td-detail">{}</td><td class="td-detail">{}</td><td class="td-detail">{}</td></tr>"#,
                item, value, unit
            )
        })
        .collect();

    format!(
        r#"<html><body>
        <h5 class="card-title mb-0">{}</h5>
        <h6>ALARM</h6><table><tbody>{}</tbody></table>
        <h6>PARAMETER</h6><table><tbody>{}</tbody></table>
        </body></html>"#,
        title, alarm_rows, parameter_rows
    )
}

/// A liquid-cooling overview with one unit status table and one single-rack matrix.
pub fn overview_html(unit: &str, rack: &str) -> String {
    format!(
        r#"<html><body>
        <h6>CGK3A-CL-1.04-CDU-{unit} STATUS</h6>
        <table><tr><td>FWS FLOW</td><td>120 I/min</td><td>TCS TEMP SUP</td><td>21 °C</td></tr></table>
        <h6>ENERGY VALVE STATUS COMPARTMENT A</h6>
        <table><thead><tr><th>PARAMETER</th><th>RACK {rack}</th></tr></thead>
        <tbody><tr><td>TCS FLOW</td><td>40 I/min</td></tr></tbody></table>
        </body></html>"#
    )
}

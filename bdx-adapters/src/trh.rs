//! The temperature/humidity JSON endpoint.
//!
//! The endpoint is a form POST with the body `action=inf`; it only answers
//! when the session cookies and a matching `Referer` are present.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bdx_adapters::trh::{HttpSensorFetcher, SensorFetcher};
//! use bdx_adapters::Session;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpSensorFetcher::builder()
//!         .url("http://bdx.local/trh/ajax.php")
//!         .session(Session::new("map", "php-session"))
//!         .timeout(Duration::from_secs(10))
//!         .build()?;
//!
//!     let body = fetcher.fetch_sensors().await?;
//!     println!("{} bytes", body.len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, REFERER};
use reqwest::Client;
use tracing::debug;

use crate::{FetchError, Session};

/// Form body the endpoint expects.
pub const REQUEST_BODY: &str = "action=inf";

/// Source of the raw sensor JSON.
#[async_trait]
pub trait SensorFetcher: Send + Sync {
    /// Fetch the sensor array as raw bytes.
    async fn fetch_sensors(&self) -> Result<Vec<u8>, FetchError>;
}

/// Fetches sensor JSON with a form POST.
#[derive(Debug, Clone)]
pub struct HttpSensorFetcher {
    client: Client,
    url: String,
    referer: String,
    session: Session,
}

impl HttpSensorFetcher {
    /// Create a new builder for configuring the fetcher.
    pub fn builder() -> HttpSensorFetcherBuilder {
        HttpSensorFetcherBuilder::default()
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SensorFetcher for HttpSensorFetcher {
    async fn fetch_sensors(&self) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(REFERER, &self.referer)
            .header(COOKIE, self.session.cookie_header())
            .body(REQUEST_BODY)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;
        debug!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(body.to_vec())
    }
}

/// Builder for HttpSensorFetcher.
#[derive(Debug, Default)]
pub struct HttpSensorFetcherBuilder {
    url: Option<String>,
    referer: Option<String>,
    session: Option<Session>,
    timeout: Option<Duration>,
}

impl HttpSensorFetcherBuilder {
    /// Set the endpoint URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the Referer header (default: the endpoint URL).
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Set the session cookies.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<HttpSensorFetcher, FetchError> {
        let url = self
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| FetchError::Config("sensor endpoint URL is not set".to_string()))?;

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(10)))
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(HttpSensorFetcher {
            client,
            referer: self.referer.unwrap_or_else(|| url.clone()),
            url,
            session: self.session.unwrap_or_default(),
        })
    }
}

//! Dashboard page fetching.
//!
//! Pages are fetched as a plain GET carrying the session cookies; the
//! response body is the HTML snapshot the parsers work on. Anything that can
//! produce a [`RawPage`] for a URL can stand in through [`PageFetcher`].

use std::time::Duration;

use async_trait::async_trait;
use bdx_types::RawPage;
use reqwest::header::COOKIE;
use reqwest::Client;
use tracing::debug;

use crate::{FetchError, Session};

/// Produces an HTML snapshot for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page. A failure never yields a partial page.
    async fn fetch_page(&self, url: &str) -> Result<RawPage, FetchError>;
}

/// Fetches pages over HTTP with the session cookies attached.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    session: Session,
}

impl HttpPageFetcher {
    /// Create a new builder for configuring the fetcher.
    pub fn builder() -> HttpPageFetcherBuilder {
        HttpPageFetcherBuilder::default()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<RawPage, FetchError> {
        let response = self
            .client
            .get(url)
            .header(COOKIE, self.session.cookie_header())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;
        debug!("Fetched {} bytes of HTML from {}", html.len(), url);
        Ok(RawPage::new(url, html))
    }
}

/// Builder for HttpPageFetcher.
#[derive(Debug, Default)]
pub struct HttpPageFetcherBuilder {
    session: Option<Session>,
    timeout: Option<Duration>,
}

impl HttpPageFetcherBuilder {
    /// Set the session cookies.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the per-page timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<HttpPageFetcher, FetchError> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(30)))
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(HttpPageFetcher {
            client,
            session: self.session.unwrap_or_default(),
        })
    }
}

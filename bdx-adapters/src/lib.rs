//! # bdx-adapters
//!
//! Fetch adapters for the facility-monitoring web application.
//!
//! Two kinds of upstream are supported:
//!
//! - **Sensor endpoint** ([`trh`]) - a form POST answering with a JSON array
//!   of temperature/humidity readings
//! - **Dashboard pages** ([`page`]) - HTML pages fetched with the session
//!   cookies, handed to the table parsers as a [`RawPage`]
//!
//! Both are behind traits so the collector can be driven by in-memory fakes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bdx_adapters::page::{HttpPageFetcher, PageFetcher};
//! use bdx_adapters::Session;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpPageFetcher::builder()
//!         .session(Session::new("map", "php-session"))
//!         .build()?;
//!
//!     let page = fetcher.fetch_page("http://bdx.local/cdu/1").await?;
//!     println!("{} bytes from {}", page.html.len(), page.url);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod page;
pub mod session;
pub mod trh;

#[cfg(test)]
mod testing;

pub use error::FetchError;
pub use page::{HttpPageFetcher, PageFetcher};
pub use session::Session;
pub use trh::{HttpSensorFetcher, SensorFetcher};

// Re-export types for convenience
pub use bdx_types::RawPage;

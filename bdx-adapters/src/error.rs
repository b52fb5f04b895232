//! Error types for fetch adapters.

use thiserror::Error;

/// Errors that can occur while fetching from an upstream endpoint.
///
/// None of these are fatal: the collector logs them and the source
/// contributes nothing for the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Upstream answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Failed to read the response body.
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// The adapter could not be constructed.
    #[error("Invalid adapter configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if err.is_body() || err.is_decode() {
            FetchError::Body(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_url_and_code() {
        let err = FetchError::Status {
            url: "http://bdx.local/trh".into(),
            status: 403,
        };
        assert_eq!(err.to_string(), "http://bdx.local/trh returned status 403");
    }

    #[test]
    fn timeout_message_is_stable() {
        assert_eq!(FetchError::Timeout.to_string(), "Request timed out");
    }
}

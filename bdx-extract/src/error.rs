//! Error types for extraction.

use thiserror::Error;

/// Errors produced while locating or parsing upstream content.
///
/// None of these are fatal: a caller drops the affected table, row or
/// cell and carries on with the rest of the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The landmark text was not present on the page.
    #[error("marker not found: {0}")]
    MarkerNotFound(String),

    /// No opening tag followed the marker.
    #[error("no <{0}> found after marker")]
    RegionNotFound(&'static str),

    /// An opening tag was found but its closing tag was not.
    #[error("<{0}> is never closed")]
    UnclosedRegion(&'static str),

    /// The payload was not the expected JSON shape.
    #[error("invalid JSON payload: {0}")]
    Json(String),

    /// A cell's text could not be read as a number.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::Json(err.to_string())
    }
}

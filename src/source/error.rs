//! Record source error types
//!
//! Errors surfaced by record backends and importers.

use thiserror::Error;

/// Errors that can occur while reading records from a backend
#[derive(Error, Debug)]
pub enum SourceError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record data could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// CSV reader failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

/// Result type alias for record source operations
pub type SourceResult<T> = Result<T, SourceError>;

//! Analysis error types
//!
//! None of these abort a batch. `InvalidInput` is recovered locally with a
//! neutral result; `CodecError` only arises when decoding stored envelopes.

use thiserror::Error;

/// Errors raised by the content analyzer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Content was empty or otherwise unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised when decoding a stored analysis envelope
#[derive(Error, Debug)]
pub enum CodecError {
    /// Text was not a well-formed envelope
    #[error("Malformed analysis envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Envelope carried a version this build does not understand
    #[error("Unsupported analysis envelope version: {0}")]
    UnsupportedVersion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::InvalidInput("content is empty".to_string());
        assert_eq!(err.to_string(), "Invalid input: content is empty");

        let err = CodecError::UnsupportedVersion("7".to_string());
        assert_eq!(err.to_string(), "Unsupported analysis envelope version: 7");
    }
}

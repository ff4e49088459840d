//! Analysis Envelope
//!
//! Stored analyses are wrapped in a versioned, tagged JSON envelope so a
//! backend can persist them as text and hand them back later. Decoding
//! goes through `serde_json` only.
//!
//! ```text
//! {"version":"1","record_id":"m1","analyzed_at":"...","analysis":{...}}
//! ```

use crate::analysis::analyzer::AnalysisResult;
use crate::analysis::error::CodecError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current envelope version written by [`encode`]
pub const CURRENT_VERSION: &str = "1";

/// Versioned wrapper around a stored analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "version")]
pub enum AnalysisEnvelope {
    #[serde(rename = "1")]
    V1 {
        record_id: String,
        analyzed_at: DateTime<Utc>,
        analysis: AnalysisResult,
    },
}

impl AnalysisEnvelope {
    /// Wrap an analysis in the current envelope version
    pub fn new(record_id: impl Into<String>, analysis: AnalysisResult) -> Self {
        AnalysisEnvelope::V1 {
            record_id: record_id.into(),
            analyzed_at: Utc::now(),
            analysis,
        }
    }

    /// Identifier of the analyzed record
    pub fn record_id(&self) -> &str {
        match self {
            AnalysisEnvelope::V1 { record_id, .. } => record_id,
        }
    }

    /// The wrapped analysis
    pub fn analysis(&self) -> &AnalysisResult {
        match self {
            AnalysisEnvelope::V1 { analysis, .. } => analysis,
        }
    }

    /// Unwrap into the analysis
    pub fn into_analysis(self) -> AnalysisResult {
        match self {
            AnalysisEnvelope::V1 { analysis, .. } => analysis,
        }
    }
}

/// Encode an envelope as JSON text
pub fn encode(envelope: &AnalysisEnvelope) -> Result<String, CodecError> {
    Ok(serde_json::to_string(envelope)?)
}

/// Decode an envelope from JSON text
///
/// An unknown `version` is reported as such rather than as a generic
/// parse failure.
pub fn decode(text: &str) -> Result<AnalysisEnvelope, CodecError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    match value.get("version").and_then(|v| v.as_str()) {
        Some(CURRENT_VERSION) => Ok(serde_json::from_value(value)?),
        Some(other) => Err(CodecError::UnsupportedVersion(other.to_string())),
        None => Err(CodecError::UnsupportedVersion("<missing>".to_string())),
    }
}

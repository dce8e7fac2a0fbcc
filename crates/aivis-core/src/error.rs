//! Error types for URL validation, fetching and scoring.
//!
//! Per-check failures are never errors: they are encoded as `passed: false`
//! in the check results. Only structural problems surface here.

use std::time::Duration;
use thiserror::Error;

/// Problems with caller-supplied input. These are user-correctable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("missing url")]
    MissingUrl,

    #[error("malformed url '{input}': {reason}")]
    MalformedUrl { input: String, reason: String },

    #[error("unsupported url scheme '{0}' (only http and https can be analyzed)")]
    UnsupportedScheme(String),

    #[error("unknown mode '{0}' (expected 'quick' or 'full')")]
    UnknownMode(String),
}

/// Failure to retrieve a single resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Scoring configuration defects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("invalid weight table: {0}")]
    InvalidWeightTable(String),
}

/// Errors returned by a full analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("analysis failed: {0}")]
    Failed(#[from] ScoreError),
}

impl AnalysisError {
    /// Whether the caller can fix this by changing their input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AnalysisError::InvalidInput(_))
    }
}

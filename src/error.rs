//! Crate-wide error taxonomy.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by phonemizer backends and the multilingual service.
///
/// Recoverable conditions (missing optional resources, empty input, load
/// timeouts) are handled locally with degraded output and never reach the
/// caller through this type.
#[derive(Debug, Error)]
pub enum PhonemizerError {
    /// The backend was never initialized, or has been disposed.
    #[error("backend is not initialized")]
    NotInitialized,

    /// No backend could be resolved for the language, even after fallback.
    #[error("no backend available for language '{0}'")]
    UnsupportedLanguage(String),

    /// A bounded operation exceeded its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// A required data file could not be found at any candidate location.
    #[error("resource missing: {0}")]
    ResourceMissing(String),

    /// The caller's cancellation token fired.
    #[error("operation was cancelled")]
    Cancelled,

    /// A backend failed while phonemizing.
    #[error("backend '{backend}' failed: {message}")]
    BackendFailure { backend: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid dictionary data: {0}")]
    InvalidData(String),
}

impl From<serde_json::Error> for PhonemizerError {
    fn from(e: serde_json::Error) -> Self {
        PhonemizerError::InvalidData(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PhonemizerError>;

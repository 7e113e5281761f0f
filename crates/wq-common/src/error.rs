//! Error types for the water-quality storage crates.

use thiserror::Error;

/// Result type alias using WqError.
pub type WqResult<T> = Result<T, WqError>;

/// Primary error type for storage and URI operations.
#[derive(Debug, Error)]
pub enum WqError {
    // === URI & classification errors ===
    #[error("Unsupported backend for URI: {0}")]
    UnsupportedBackend(String),

    #[error("Not a valid URI: {0}")]
    NotAUri(String),

    #[error("Invalid file name pattern: {0}")]
    InvalidPattern(String),

    // === Backend errors ===
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // === HTTP errors ===
    #[error("HTTP failure: {0}")]
    HttpFailure(String),

    // === Infrastructure errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

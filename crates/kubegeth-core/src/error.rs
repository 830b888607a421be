//! Error types for kubegeth core.

use thiserror::Error;

/// Errors from key generation, address parsing and genesis building.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The entropy source or a curve operation failed. Not retryable.
    #[error("key generation failed: {0}")]
    Generation(String),

    /// Malformed input, e.g. building a genesis from zero accounts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("address checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

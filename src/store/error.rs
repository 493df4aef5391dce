//! Durable store error types

use thiserror::Error;

/// Errors that can occur in the reload-durable store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backing file exists but does not hold a JSON object of strings
    #[error("Corrupt store {path}: {reason}")]
    Corrupt { path: String, reason: String },

    /// A lock guarding the store was poisoned by a panicking writer
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

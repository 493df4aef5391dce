//! Backend error types

use thiserror::Error;

/// Errors that can occur when talking to the timesheet backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// No bearer token is configured; nothing was sent
    #[error("No authentication token found")]
    MissingToken,

    #[error("Backend unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Access denied. Please check your authentication token or permissions.")]
    Forbidden,

    /// Non-2xx response; `message` is the response body
    #[error("API error {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Classify a transport error the way the rest of the client expects
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Unavailable
        } else {
            BackendError::Request(err)
        }
    }
}

/// Result type alias for backend calls
pub type BackendResult<T> = Result<T, BackendError>;

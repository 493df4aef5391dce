//! Timer error types

use super::form::{describe_fields, EntryField};
use crate::backend::BackendError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by timer operations
#[derive(Error, Debug)]
pub enum TimerError {
    /// No signed-in user (or the account has no profile user id)
    #[error("User ID not available. Please log in again.")]
    MissingIdentity,

    /// Required form fields were blank at Time Out; the timer keeps running
    #[error("Please fill all fields ({}) before Time Out.", describe_fields(.missing))]
    IncompleteEntry { missing: Vec<EntryField> },

    /// No bearer token, the submission never left the client
    #[error("No authentication token found")]
    NotAuthenticated,

    /// The backend could not be reached or answered unintelligibly
    #[error("Failed to save timesheet: {0}")]
    NetworkFailure(String),

    /// The backend answered with a non-2xx status
    #[error("Failed to save timesheet: {status} - {message}")]
    ServerRejected { status: u16, message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<BackendError> for TimerError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::MissingToken => TimerError::NotAuthenticated,
            BackendError::Rejected { status, message } => {
                TimerError::ServerRejected { status, message }
            }
            BackendError::Forbidden => TimerError::ServerRejected {
                status: 403,
                message: BackendError::Forbidden.to_string(),
            },
            other @ (BackendError::Unavailable
            | BackendError::Timeout
            | BackendError::Request(_)
            | BackendError::Decode(_)) => TimerError::NetworkFailure(other.to_string()),
        }
    }
}

/// Result type alias for timer operations
pub type TimerResult<T> = Result<T, TimerError>;

//! Board error types

use crate::backend::BackendError;
use crate::timer::TimerError;
use thiserror::Error;

/// Errors surfaced by board operations
#[derive(Error, Debug)]
pub enum BoardError {
    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Manual hours were not `HH:MM`
    #[error("Invalid hours worked '{0}', expected HH:MM")]
    InvalidHours(String),

    /// Manual changes need the admin role
    #[error("Only admins can {action} timesheets.")]
    AdminOnly { action: &'static str },

    /// Manual entries are blocked while an interval is open
    #[error("Stop the running timer before adding or updating timesheets manually")]
    TimerRunning,

    #[error("Render error: {0}")]
    Render(String),
}

impl From<csv::Error> for BoardError {
    fn from(err: csv::Error) -> Self {
        BoardError::Render(err.to_string())
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Render(err.to_string())
    }
}

/// Result type alias for board operations
pub type BoardResult<T> = Result<T, BoardError>;

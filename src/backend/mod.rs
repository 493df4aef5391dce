//! Timesheet Backend
//!
//! REST collaborator the client reads context from and submits timesheets to.
//!
//! - **client**: `reqwest` implementation with bearer-token auth
//! - **dto**: Request/response bodies
//! - **error**: Error taxonomy for backend calls
//!
//! The timer and the board only see the [`TimesheetBackend`] trait, so they
//! can be driven by a fake in tests.

mod client;
mod dto;
mod error;

pub use client::{BackendClient, BackendConfig};
pub use dto::{
    CurrentUser, Identity, Profile, Role, Shift, TaskCategory, Timesheet, TimesheetEntry,
    UserSummary,
};
pub use error::{BackendError, BackendResult};

use async_trait::async_trait;

/// Operations the client needs from the timesheet backend
#[async_trait]
pub trait TimesheetBackend: Send + Sync {
    /// `GET /api/users/me`
    async fn current_user(&self) -> BackendResult<CurrentUser>;

    /// `GET /api/task-categories`
    async fn task_categories(&self) -> BackendResult<Vec<TaskCategory>>;

    /// `GET /api/shifts`
    async fn shifts(&self) -> BackendResult<Vec<Shift>>;

    /// `GET /api/users/all` (admins)
    async fn users(&self) -> BackendResult<Vec<UserSummary>>;

    /// `GET /api/timesheets`
    async fn timesheets(&self) -> BackendResult<Vec<Timesheet>>;

    /// `POST /api/timesheets/posttimesheet`, returns the created record
    async fn post_timesheet(&self, entry: &TimesheetEntry) -> BackendResult<Timesheet>;

    /// `PUT /api/timesheets/{id}`
    async fn update_timesheet(&self, id: i64, entry: &TimesheetEntry) -> BackendResult<Timesheet>;

    /// `DELETE /api/timesheets/{id}`
    async fn delete_timesheet(&self, id: i64) -> BackendResult<()>;
}

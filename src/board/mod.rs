//! Timesheet Board
//!
//! The screen hosting the timer: it fetches identity and reference data on
//! mount, keeps the list of timesheets on display, and routes Time In /
//! Time Out / Retry to the [`TimeTracker`]. Adding, updating and deleting
//! timesheets by hand is for admins only. Every failure is caught here and
//! kept as the board's error message; nothing is fatal.

mod error;
pub mod render;

pub use error::{BoardError, BoardResult};
pub use render::{render_reference, render_timesheets, OutputFormat};

use crate::backend::{
    Identity, Shift, TaskCategory, Timesheet, TimesheetBackend, TimesheetEntry, UserSummary,
};
use crate::timer::{EntryForm, StartOutcome, StopOutcome, TimeTracker, TimerError, TimerResult};
use chrono::NaiveTime;
use std::sync::Arc;

/// Notice recorded after a successful Time Out or retry
pub const SAVED_NOTICE: &str = "Timesheet saved successfully!";

/// A timesheet typed in by hand rather than timed
#[derive(Debug, Clone)]
pub struct ManualEntry {
    pub form: EntryForm,
    /// Hours worked as `HH:MM`
    pub hours: String,
    /// File under this user instead of the signed-in admin
    pub user_id: Option<i64>,
}

/// Hosting screen state
pub struct TimesheetBoard {
    backend: Arc<dyn TimesheetBackend>,
    tracker: TimeTracker,
    identity: Option<Identity>,
    categories: Vec<TaskCategory>,
    shifts: Vec<Shift>,
    users: Vec<UserSummary>,
    entries: Vec<Timesheet>,
    error: Option<String>,
    notice: Option<String>,
}

impl TimesheetBoard {
    pub fn new(backend: Arc<dyn TimesheetBackend>, tracker: TimeTracker) -> Self {
        Self {
            backend,
            tracker,
            identity: None,
            categories: Vec::new(),
            shifts: Vec::new(),
            users: Vec::new(),
            entries: Vec::new(),
            error: None,
            notice: None,
        }
    }

    /// Rehydrate the timer, then load identity and reference data
    ///
    /// Fetch failures end up in [`last_error`](Self::last_error); only a
    /// store failure while rehydrating is returned.
    pub async fn mount(&mut self) -> TimerResult<()> {
        self.tracker.rehydrate().await?;

        if !self.load_identity().await {
            return Ok(());
        }

        match self.backend.task_categories().await {
            Ok(categories) => self.categories = categories,
            Err(e) => self.fail("Failed to fetch categories", &e),
        }
        match self.backend.shifts().await {
            Ok(shifts) => self.shifts = shifts,
            Err(e) => self.fail("Failed to fetch shifts", &e),
        }
        if self.is_admin() {
            self.refresh_users().await;
        }
        self.refresh_entries().await;

        Ok(())
    }

    /// Fetch the signed-in user; `false` if that failed
    pub async fn load_identity(&mut self) -> bool {
        match self.backend.current_user().await {
            Ok(user) => {
                let identity = Identity::from(user);
                tracing::info!(
                    account_id = identity.account_id,
                    user_id = ?identity.profile_user_id,
                    role = %identity.role,
                    "Signed in"
                );
                self.identity = Some(identity);
                true
            }
            Err(e) => {
                self.fail("Failed to fetch current user", &e);
                false
            }
        }
    }

    /// Re-fetch the displayed timesheets; `false` if that failed
    pub async fn refresh_entries(&mut self) -> bool {
        match self.backend.timesheets().await {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "Fetched timesheets");
                self.entries = entries;
                true
            }
            Err(e) => {
                self.fail("Failed to fetch timesheets", &e);
                false
            }
        }
    }

    /// Re-fetch the user list (admins); `false` if that failed
    pub async fn refresh_users(&mut self) -> bool {
        match self.backend.users().await {
            Ok(users) => {
                self.users = users;
                true
            }
            Err(e) => {
                self.fail("Failed to fetch users", &e);
                false
            }
        }
    }

    /// Time In
    pub async fn time_in(&mut self) -> BoardResult<StartOutcome> {
        let result = self.tracker.start(self.identity.as_ref()).await;
        self.settle(result)
    }

    /// Time Out: close the interval, submit it, and show the echo
    ///
    /// Entries left pending by earlier failures are sent first and shown too.
    pub async fn time_out(&mut self, form: &EntryForm) -> BoardResult<StopOutcome> {
        let queued = self.tracker.pending().len();
        let result = self
            .tracker
            .stop(form, self.identity.as_ref(), self.backend.as_ref())
            .await;

        match &result {
            Ok(StopOutcome::Submitted {
                echo, resubmitted, ..
            }) => {
                self.entries.extend(resubmitted.iter().cloned());
                self.entries.push(echo.clone());
                self.notice = Some(SAVED_NOTICE.to_string());
            }
            Ok(StopOutcome::NotRunning) => {}
            Err(_) => self.refresh_if_sent(queued + 1).await,
        }
        self.settle(result)
    }

    /// Resubmit the entries failed Time Outs left behind
    ///
    /// Returns the echoes of the accepted entries; empty if nothing was pending.
    pub async fn retry(&mut self) -> BoardResult<Vec<Timesheet>> {
        let queued = self.tracker.pending().len();
        let result = self.tracker.retry_submission(self.backend.as_ref()).await;

        match &result {
            Ok(echoes) if !echoes.is_empty() => {
                self.entries.extend(echoes.iter().cloned());
                self.notice = Some(SAVED_NOTICE.to_string());
            }
            Ok(_) => {}
            Err(_) => self.refresh_if_sent(queued).await,
        }
        self.settle(result)
    }

    /// Re-fetch the list when a failed submission still got some entries through
    async fn refresh_if_sent(&mut self, queued: usize) {
        if self.tracker.pending().len() < queued {
            self.refresh_entries().await;
        }
    }

    /// Create a timesheet by hand (admins)
    pub async fn add_manual(&mut self, manual: &ManualEntry) -> BoardResult<Timesheet> {
        let result = self.submit_manual(None, manual).await;
        if result.is_ok() {
            self.notice = Some("Timesheet added successfully!".to_string());
            self.refresh_entries().await;
        }
        self.settle(result)
    }

    /// Replace an existing timesheet (admins)
    pub async fn update_manual(&mut self, id: i64, manual: &ManualEntry) -> BoardResult<Timesheet> {
        let result = self.submit_manual(Some(id), manual).await;
        if result.is_ok() {
            self.notice = Some("Timesheet updated successfully!".to_string());
            self.refresh_entries().await;
        }
        self.settle(result)
    }

    /// Delete a timesheet (admins)
    pub async fn delete(&mut self, id: i64) -> BoardResult<()> {
        let result = match self.require_admin("delete") {
            Ok(()) => self
                .backend
                .delete_timesheet(id)
                .await
                .map_err(BoardError::from),
            Err(e) => Err(e),
        };
        if result.is_ok() {
            tracing::info!(timesheet_id = id, "Timesheet deleted");
            self.notice = Some("Timesheet deleted successfully!".to_string());
            self.refresh_entries().await;
        }
        self.settle(result)
    }

    /// Cancel the tick task; the open interval stays persisted
    pub fn unmount(&mut self) {
        self.tracker.shutdown();
    }

    async fn submit_manual(&self, id: Option<i64>, manual: &ManualEntry) -> BoardResult<Timesheet> {
        self.require_admin("add or update")?;
        if self.tracker.state().await.is_tracking() {
            return Err(BoardError::TimerRunning);
        }

        let entry = self.manual_entry(manual)?;
        let saved = match id {
            Some(id) => self.backend.update_timesheet(id, &entry).await?,
            None => self.backend.post_timesheet(&entry).await?,
        };
        tracing::info!(timesheet_id = ?saved.timesheet_id.or(id), "Manual timesheet saved");
        Ok(saved)
    }

    fn manual_entry(&self, manual: &ManualEntry) -> BoardResult<TimesheetEntry> {
        let hours = manual.hours.trim();
        NaiveTime::parse_from_str(hours, "%H:%M")
            .map_err(|_| BoardError::InvalidHours(manual.hours.clone()))?;

        // Only admins may file under someone else
        let own_id = self.identity.as_ref().and_then(Identity::timesheet_user_id);
        let user_id = manual
            .user_id
            .filter(|_| self.is_admin())
            .or(own_id)
            .ok_or(TimerError::MissingIdentity)?;

        manual
            .form
            .to_entry(format!("{}:00", hours), user_id)
            .map_err(|missing| TimerError::IncompleteEntry { missing }.into())
    }

    fn require_admin(&self, action: &'static str) -> BoardResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(action, "Refused manual timesheet change for non-admin");
            Err(BoardError::AdminOnly { action })
        }
    }

    fn settle<T, E>(&mut self, result: Result<T, E>) -> BoardResult<T>
    where
        E: Into<BoardError>,
    {
        match result {
            Ok(value) => {
                self.error = None;
                Ok(value)
            }
            Err(e) => {
                let err = e.into();
                self.error = Some(err.to_string());
                self.notice = None;
                Err(err)
            }
        }
    }

    fn fail(&mut self, context: &str, err: &dyn std::fmt::Display) {
        tracing::error!(error = %err, "{}", context);
        self.error = Some(format!("{}: {}", context, err));
    }

    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(|i| i.role.is_admin())
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn categories(&self) -> &[TaskCategory] {
        &self.categories
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn users(&self) -> &[UserSummary] {
        &self.users
    }

    pub fn entries(&self) -> &[Timesheet] {
        &self.entries
    }

    /// Message of the last failure, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn tracker(&self) -> &TimeTracker {
        &self.tracker
    }

    /// Render the displayed timesheets
    pub fn render(&self, format: OutputFormat) -> BoardResult<String> {
        render_timesheets(
            &self.entries,
            &self.categories,
            &self.shifts,
            &self.users,
            format,
        )
    }
}

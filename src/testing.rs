//! In-crate fakes shared by unit tests

use crate::backend::{
    BackendError, BackendResult, CurrentUser, Profile, Shift, TaskCategory, Timesheet,
    TimesheetBackend, TimesheetEntry, UserSummary,
};
use async_trait::async_trait;
use std::sync::Mutex;

/// How the fake answers submissions
#[derive(Debug, Clone, Copy)]
pub(crate) enum Failure {
    Status(u16),
    Unavailable,
    Timeout,
}

/// Scriptable stand-in for the REST backend
pub(crate) struct FakeBackend {
    pub user: Option<CurrentUser>,
    pub categories: Vec<TaskCategory>,
    pub shifts: Vec<Shift>,
    pub users: Vec<UserSummary>,
    pub timesheets: Mutex<Vec<Timesheet>>,
    /// Failure for submissions; `None` accepts them
    pub fail_with: Mutex<Option<Failure>>,
    pub posted: Mutex<Vec<TimesheetEntry>>,
    pub deleted: Mutex<Vec<i64>>,
}

impl FakeBackend {
    /// Backend for a regular user with profile id 7
    pub fn new() -> Self {
        Self {
            user: Some(CurrentUser {
                id: 1,
                profile: Some(Profile {
                    user_id: Some(7),
                    role_name: Some("user".to_string()),
                }),
            }),
            categories: vec![
                TaskCategory {
                    category_id: 1,
                    category_name: "Development".to_string(),
                },
                TaskCategory {
                    category_id: 2,
                    category_name: "Support".to_string(),
                },
            ],
            shifts: vec![Shift {
                shift_id: 1,
                shift_name: "Morning".to_string(),
            }],
            users: Vec::new(),
            timesheets: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
            posted: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(self, status: u16) -> Self {
        self.failing(Failure::Status(status))
    }

    /// Submissions fail as if nothing listened on the backend's port
    pub fn unreachable(self) -> Self {
        self.failing(Failure::Unavailable)
    }

    pub fn timing_out(self) -> Self {
        self.failing(Failure::Timeout)
    }

    fn failing(self, failure: Failure) -> Self {
        *self.fail_with.lock().unwrap() = Some(failure);
        self
    }

    /// Backend with an admin signed in (profile id 8)
    pub fn admin() -> Self {
        Self {
            user: Some(CurrentUser {
                id: 2,
                profile: Some(Profile {
                    user_id: Some(8),
                    role_name: Some("admin".to_string()),
                }),
            }),
            ..Self::new()
        }
    }

    pub fn accept(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    pub fn posted(&self) -> Vec<TimesheetEntry> {
        self.posted.lock().unwrap().clone()
    }

    fn check(&self) -> BackendResult<()> {
        match *self.fail_with.lock().unwrap() {
            Some(Failure::Status(status)) => Err(BackendError::Rejected {
                status,
                message: "Internal Server Error".to_string(),
            }),
            Some(Failure::Unavailable) => Err(BackendError::Unavailable),
            Some(Failure::Timeout) => Err(BackendError::Timeout),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TimesheetBackend for FakeBackend {
    async fn current_user(&self) -> BackendResult<CurrentUser> {
        self.user.clone().ok_or(BackendError::Rejected {
            status: 401,
            message: "Unauthorized".to_string(),
        })
    }

    async fn task_categories(&self) -> BackendResult<Vec<TaskCategory>> {
        Ok(self.categories.clone())
    }

    async fn shifts(&self) -> BackendResult<Vec<Shift>> {
        Ok(self.shifts.clone())
    }

    async fn users(&self) -> BackendResult<Vec<UserSummary>> {
        Ok(self.users.clone())
    }

    async fn timesheets(&self) -> BackendResult<Vec<Timesheet>> {
        Ok(self.timesheets.lock().unwrap().clone())
    }

    async fn post_timesheet(&self, entry: &TimesheetEntry) -> BackendResult<Timesheet> {
        self.check()?;
        self.posted.lock().unwrap().push(entry.clone());
        let mut timesheets = self.timesheets.lock().unwrap();
        let echo = Timesheet::from_entry(entry, Some(timesheets.len() as i64 + 100));
        timesheets.push(echo.clone());
        Ok(echo)
    }

    async fn update_timesheet(&self, id: i64, entry: &TimesheetEntry) -> BackendResult<Timesheet> {
        self.check()?;
        let echo = Timesheet::from_entry(entry, Some(id));
        let mut timesheets = self.timesheets.lock().unwrap();
        for ts in timesheets.iter_mut() {
            if ts.timesheet_id == Some(id) {
                *ts = echo.clone();
            }
        }
        Ok(echo)
    }

    async fn delete_timesheet(&self, id: i64) -> BackendResult<()> {
        self.check()?;
        self.deleted.lock().unwrap().push(id);
        self.timesheets
            .lock()
            .unwrap()
            .retain(|ts| ts.timesheet_id != Some(id));
        Ok(())
    }
}

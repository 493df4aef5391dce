//! Timer state
//!
//! `TimerState` keeps its fields private so the tracking flag and the
//! time-in stamp can never disagree: a running state always carries its
//! `time_in`, an idle state never does.

use super::elapsed::{is_elapsed_display, ZERO_DISPLAY};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Coarse phase of the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    /// No open interval
    Idle,
    /// An interval is open and the tick task is publishing its elapsed time
    Running,
}

impl std::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerPhase::Idle => write!(f, "idle"),
            TimerPhase::Running => write!(f, "running"),
        }
    }
}

/// `{ timeIn, isTracking, elapsedDisplay }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    time_in: Option<DateTime<Utc>>,
    elapsed_display: String,
}

impl TimerState {
    /// Not tracking, display reset
    pub fn idle() -> Self {
        Self {
            time_in: None,
            elapsed_display: ZERO_DISPLAY.to_string(),
        }
    }

    /// Tracking since `time_in`
    ///
    /// A malformed `elapsed_display` is replaced by `"00:00:00"`.
    pub fn running(time_in: DateTime<Utc>, elapsed_display: impl Into<String>) -> Self {
        let display = elapsed_display.into();
        Self {
            time_in: Some(time_in),
            elapsed_display: if is_elapsed_display(&display) {
                display
            } else {
                ZERO_DISPLAY.to_string()
            },
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.time_in.is_some()
    }

    pub fn time_in(&self) -> Option<DateTime<Utc>> {
        self.time_in
    }

    pub fn elapsed_display(&self) -> &str {
        &self.elapsed_display
    }

    pub fn phase(&self) -> TimerPhase {
        if self.is_tracking() {
            TimerPhase::Running
        } else {
            TimerPhase::Idle
        }
    }

    /// Replace the display of a running state; ignored while idle
    pub(crate) fn publish(&mut self, display: String) {
        if self.is_tracking() {
            self.elapsed_display = display;
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::idle()
    }
}

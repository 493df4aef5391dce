//! Timer persistence
//!
//! Maps [`TimerState`] onto string keys of a [`KeyValueStore`]:
//!
//! | key            | value                                        |
//! |----------------|----------------------------------------------|
//! | `timeIn`       | RFC 3339, millisecond precision, `Z` suffix  |
//! | `isTracking`   | `"true"` / `"false"`                         |
//! | `elapsedTime`  | `HH:MM:SS`                                   |
//! | `pendingEntry` | JSON array of [`TimesheetEntry`] awaiting resubmission, oldest first |

use super::{KeyValueStore, StoreResult};
use crate::backend::TimesheetEntry;
use crate::timer::TimerState;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

pub const TIME_IN_KEY: &str = "timeIn";
pub const IS_TRACKING_KEY: &str = "isTracking";
pub const ELAPSED_KEY: &str = "elapsedTime";
pub const PENDING_ENTRY_KEY: &str = "pendingEntry";

/// Timer state persistence over a shared key-value store
#[derive(Clone)]
pub struct TimerStore {
    kv: Arc<dyn KeyValueStore>,
}

impl TimerStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Underlying key-value store
    pub fn kv(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    /// Load a previously open interval
    ///
    /// Returns `None` unless the store says tracking was on *and* holds a
    /// parseable time-in stamp.
    pub fn load(&self) -> StoreResult<Option<TimerState>> {
        let tracking = self.kv.get(IS_TRACKING_KEY)?.as_deref() == Some("true");
        if !tracking {
            return Ok(None);
        }

        let time_in = match self.kv.get(TIME_IN_KEY)? {
            Some(raw) => match DateTime::parse_from_rfc3339(raw.trim()) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Ignoring unparseable persisted time-in");
                    return Ok(None);
                }
            },
            None => {
                tracing::warn!("Persisted tracking flag has no time-in, ignoring");
                return Ok(None);
            }
        };

        let display = self.kv.get(ELAPSED_KEY)?.unwrap_or_default();
        Ok(Some(TimerState::running(time_in, display)))
    }

    /// Write the whole triple
    pub fn save(&self, state: &TimerState) -> StoreResult<()> {
        match state.time_in() {
            Some(time_in) => self.kv.set(
                TIME_IN_KEY,
                &time_in.to_rfc3339_opts(SecondsFormat::Millis, true),
            )?,
            None => self.kv.remove(TIME_IN_KEY)?,
        }
        self.kv.set(IS_TRACKING_KEY, if state.is_tracking() { "true" } else { "false" })?;
        self.kv.set(ELAPSED_KEY, state.elapsed_display())?;
        Ok(())
    }

    /// Write only the elapsed display, leaving the interval keys alone
    pub fn save_elapsed(&self, display: &str) -> StoreResult<()> {
        self.kv.set(ELAPSED_KEY, display)
    }

    /// Remember the entries whose submission failed
    pub fn save_pending(&self, entries: &[TimesheetEntry]) -> StoreResult<()> {
        let json = serde_json::to_string(entries)?;
        self.kv.set(PENDING_ENTRY_KEY, &json)
    }

    /// Entries awaiting resubmission, oldest first
    ///
    /// A lone JSON object is read as a queue of one.
    pub fn load_pending(&self) -> StoreResult<Vec<TimesheetEntry>> {
        let Some(json) = self.kv.get(PENDING_ENTRY_KEY)? else {
            return Ok(Vec::new());
        };

        let decoded = serde_json::from_str::<Vec<TimesheetEntry>>(&json)
            .or_else(|_| serde_json::from_str::<TimesheetEntry>(&json).map(|e| vec![e]));
        match decoded {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping undecodable pending timesheet entries");
                self.kv.remove(PENDING_ENTRY_KEY)?;
                Ok(Vec::new())
            }
        }
    }

    pub fn clear_pending(&self) -> StoreResult<()> {
        self.kv.remove(PENDING_ENTRY_KEY)
    }

    /// Remove every timer key, pending entry included
    pub fn clear(&self) -> StoreResult<()> {
        for key in [TIME_IN_KEY, IS_TRACKING_KEY, ELAPSED_KEY, PENDING_ENTRY_KEY] {
            self.kv.remove(key)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for TimerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerStore").finish_non_exhaustive()
    }
}

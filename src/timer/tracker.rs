//! Time Tracker
//!
//! State machine for one open work interval:
//!
//! ```text
//!            start()                      stop() ──► submit entry
//!   Idle ─────────────────► Running ─────────────────► Idle
//!                            │  ▲
//!                            └──┘ tick() every second
//! ```
//!
//! Every transition of `{timeIn, isTracking, elapsedDisplay}` is written to
//! the [`TimerStore`], and [`TimeTracker::rehydrate`] picks an open interval
//! back up after a restart. A submission that fails at Stop leaves the timer
//! idle and queues the computed entry as a pending submission. Pending
//! entries are sent oldest first, by [`TimeTracker::retry_submission`] or
//! ahead of the entry of the next Stop, and leave the queue only once the
//! backend has accepted them.

use super::clock::Clock;
use super::elapsed::{elapsed_display, ZERO_DISPLAY};
use super::error::{TimerError, TimerResult};
use super::form::EntryForm;
use super::state::{TimerPhase, TimerState};
use super::ticker::{Ticker, TICK_PERIOD};
use crate::backend::{Identity, Timesheet, TimesheetBackend, TimesheetEntry};
use crate::store::TimerStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Result of a Start request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new interval was opened
    Started { time_in: DateTime<Utc> },
    /// An interval was already open; nothing changed
    AlreadyRunning { time_in: DateTime<Utc> },
}

/// Result of a Stop request
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    /// The timer was idle; nothing changed
    NotRunning,
    /// The interval was closed and the backend accepted the entry
    Submitted {
        entry: TimesheetEntry,
        echo: Timesheet,
        /// Echoes of earlier pending entries sent ahead of this one
        resubmitted: Vec<Timesheet>,
    },
}

/// State shared between the tracker and its tick task
struct TrackerCore {
    state: RwLock<TimerState>,
    store: TimerStore,
    clock: Arc<dyn Clock>,
    display: watch::Sender<String>,
}

impl TrackerCore {
    /// Recompute, store and publish the elapsed display while running
    async fn tick(&self) -> Option<String> {
        let mut state = self.state.write().await;
        let time_in = state.time_in()?;

        let elapsed = elapsed_display(time_in, self.clock.now());
        state.publish(elapsed.clone());
        if let Err(e) = self.store.save_elapsed(&elapsed) {
            tracing::warn!(error = %e, "Failed to persist timer tick");
        }
        drop(state);

        tracing::trace!(elapsed = %elapsed, "Tick");
        self.display.send_replace(elapsed.clone());
        Some(elapsed)
    }
}

/// Client-side time tracker
pub struct TimeTracker {
    core: Arc<TrackerCore>,
    ticker: Option<Ticker>,
    pending: Vec<TimesheetEntry>,
}

impl TimeTracker {
    /// Create an idle tracker; call [`rehydrate`](Self::rehydrate) to resume a stored interval
    pub fn new(store: TimerStore, clock: Arc<dyn Clock>) -> Self {
        let (display, _) = watch::channel(ZERO_DISPLAY.to_string());

        Self {
            core: Arc::new(TrackerCore {
                state: RwLock::new(TimerState::idle()),
                store,
                clock,
                display,
            }),
            ticker: None,
            pending: Vec::new(),
        }
    }

    /// Restore an interval left open by a previous run
    ///
    /// Returns `true` if the tracker is running afterwards. The stored
    /// display is republished as-is; the resumed tick task brings it up to
    /// date within one period. Stored pending submissions are restored too.
    pub async fn rehydrate(&mut self) -> TimerResult<bool> {
        self.pending = self.core.store.load_pending()?;
        for entry in &self.pending {
            tracing::info!(
                hours_worked = %entry.hours_worked,
                work_date = %entry.work_date,
                "Restored pending timesheet submission"
            );
        }

        if self.core.state.read().await.is_tracking() {
            return Ok(true);
        }

        let Some(restored) = self.core.store.load()? else {
            return Ok(false);
        };

        let elapsed = restored.elapsed_display().to_string();
        tracing::info!(
            time_in = ?restored.time_in(),
            elapsed = %elapsed,
            "Resuming open interval"
        );

        *self.core.state.write().await = restored;
        self.core.display.send_replace(elapsed);
        self.spawn_ticker();
        Ok(true)
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> TimerState {
        self.core.state.read().await.clone()
    }

    pub async fn phase(&self) -> TimerPhase {
        self.core.state.read().await.phase()
    }

    /// Receiver of the latest elapsed display
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.core.display.subscribe()
    }

    /// Entries whose submission failed, oldest first
    pub fn pending(&self) -> &[TimesheetEntry] {
        &self.pending
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.core.clock
    }

    /// Whether the tick task is alive
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Open an interval (Time In)
    pub async fn start(&mut self, identity: Option<&Identity>) -> TimerResult<StartOutcome> {
        identity
            .and_then(Identity::timesheet_user_id)
            .ok_or(TimerError::MissingIdentity)?;

        let mut state = self.core.state.write().await;
        if let Some(time_in) = state.time_in() {
            tracing::debug!(%time_in, "Start ignored, already running");
            return Ok(StartOutcome::AlreadyRunning { time_in });
        }

        let time_in = self.core.clock.now();
        let running = TimerState::running(time_in, ZERO_DISPLAY);
        self.core.store.save(&running)?;
        *state = running;
        drop(state);

        if !self.pending.is_empty() {
            tracing::warn!(
                pending = self.pending.len(),
                "Starting a new interval while submissions are still pending"
            );
        }

        tracing::info!(%time_in, "Time in");
        self.core.display.send_replace(ZERO_DISPLAY.to_string());
        self.spawn_ticker();
        Ok(StartOutcome::Started { time_in })
    }

    /// Recompute the elapsed display; `None` while idle
    pub async fn tick(&self) -> Option<String> {
        self.core.tick().await
    }

    /// Close the interval (Time Out) and submit it
    ///
    /// Identity and form are checked before anything changes; on either
    /// failure the timer keeps running. Once they pass, the interval is
    /// closed for good: the entry joins the pending queue behind any earlier
    /// failed entries and the whole queue is sent in order. A failed
    /// submission returns the error and leaves the unsent entries queued; it
    /// does not reopen the interval.
    pub async fn stop(
        &mut self,
        form: &EntryForm,
        identity: Option<&Identity>,
        backend: &dyn TimesheetBackend,
    ) -> TimerResult<StopOutcome> {
        let mut state = self.core.state.write().await;
        let Some(time_in) = state.time_in() else {
            tracing::debug!("Stop ignored, not running");
            return Ok(StopOutcome::NotRunning);
        };

        let user_id = identity
            .and_then(Identity::timesheet_user_id)
            .ok_or(TimerError::MissingIdentity)?;

        let time_out = self.core.clock.now();
        let hours_worked = elapsed_display(time_in, time_out);
        let entry = form
            .to_entry(hours_worked, user_id)
            .map_err(|missing| TimerError::IncompleteEntry { missing })?;

        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        *state = TimerState::idle();
        if let Err(e) = self.core.store.save(&state) {
            tracing::warn!(error = %e, "Failed to persist closed interval");
        }
        drop(state);
        self.core.display.send_replace(ZERO_DISPLAY.to_string());

        tracing::info!(
            %time_in,
            %time_out,
            hours_worked = %entry.hours_worked,
            "Time out"
        );

        if !self.pending.is_empty() {
            tracing::info!(
                pending = self.pending.len(),
                "Sending earlier pending timesheets first"
            );
        }
        self.pending.push(entry);

        let mut sent = self.submit_pending(backend).await?;
        match sent.pop() {
            Some((entry, echo)) => Ok(StopOutcome::Submitted {
                entry,
                echo,
                resubmitted: sent.into_iter().map(|(_, echo)| echo).collect(),
            }),
            None => Ok(StopOutcome::NotRunning),
        }
    }

    /// Resubmit the entries failed Stops left behind, oldest first
    ///
    /// Returns the echoes of the accepted entries, empty when nothing is
    /// pending. Stops at the first failure.
    pub async fn retry_submission(
        &mut self,
        backend: &dyn TimesheetBackend,
    ) -> TimerResult<Vec<Timesheet>> {
        let sent = self.submit_pending(backend).await?;
        Ok(sent.into_iter().map(|(_, echo)| echo).collect())
    }

    /// Stop the tick task without touching state (unmount)
    ///
    /// The stored record is left as is, so the next rehydrate resumes.
    pub fn shutdown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            tracing::debug!("Tick task cancelled");
            ticker.cancel();
        }
    }

    async fn submit_pending(
        &mut self,
        backend: &dyn TimesheetBackend,
    ) -> TimerResult<Vec<(TimesheetEntry, Timesheet)>> {
        let mut sent = Vec::new();
        if self.pending.is_empty() {
            return Ok(sent);
        }
        self.persist_pending();

        while let Some(entry) = self.pending.first().cloned() {
            match backend.post_timesheet(&entry).await {
                Ok(echo) => {
                    self.pending.remove(0);
                    tracing::info!(
                        timesheet_id = ?echo.timesheet_id,
                        hours_worked = %entry.hours_worked,
                        "Timesheet submitted"
                    );
                    sent.push((entry, echo));
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        pending = self.pending.len(),
                        "Timesheet submission failed"
                    );
                    self.persist_pending();
                    return Err(e.into());
                }
            }
        }

        let idle = !self.core.state.read().await.is_tracking();
        let cleared = if idle {
            self.core.store.clear()
        } else {
            self.core.store.clear_pending()
        };
        if let Err(e) = cleared {
            tracing::warn!(error = %e, "Failed to clear persisted timer state");
        }
        Ok(sent)
    }

    fn persist_pending(&self) {
        let saved = if self.pending.is_empty() {
            self.core.store.clear_pending()
        } else {
            self.core.store.save_pending(&self.pending)
        };
        if let Err(e) = saved {
            tracing::warn!(error = %e, "Failed to persist pending timesheet entries");
        }
    }

    fn spawn_ticker(&mut self) {
        let core = Arc::clone(&self.core);
        self.ticker = Some(Ticker::spawn(TICK_PERIOD, move || {
            let core = Arc::clone(&core);
            async move { core.tick().await.is_some() }
        }));
    }
}

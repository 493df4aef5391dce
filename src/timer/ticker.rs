//! Repeating tick task
//!
//! A [`Ticker`] owns one spawned tokio task that calls back on a fixed
//! period. The task is aborted when the ticker is cancelled or dropped, so a
//! ticker can never outlive the state it was created for.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Fixed cadence of elapsed-time recomputation
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle to a running periodic task
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn a task running `on_tick` every `period`
    ///
    /// The first call happens one full period after spawning. Each call is
    /// awaited before the next is scheduled, so calls never overlap. The
    /// task ends on its own once `on_tick` returns `false`.
    pub fn spawn<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;
                if !on_tick().await {
                    tracing::debug!("Ticker callback asked to stop");
                    break;
                }
            }
        });

        Self { handle }
    }

    /// Whether the task has ended (stopped itself or was aborted)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the task
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

//! # Timesheet
//!
//! Terminal client for a timesheet REST backend: clock in, watch the elapsed
//! time tick, clock out and have the interval submitted as a timesheet entry.
//!
//! ## Modules
//!
//! - [`timer`]: Time-tracking state machine, ticker and elapsed formatting
//! - [`store`]: Reload-durable key-value store and timer persistence
//! - [`backend`]: REST client and DTOs for the timesheet backend
//! - [`board`]: Hosting screen state (identity, reference data, timesheet list)
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: `tracing` subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use timesheet::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let kv = Arc::new(FileStore::open("store.json")?);
//!     let token = kv.get(ACCESS_TOKEN_KEY)?;
//!
//!     let backend = Arc::new(BackendClient::new(BackendConfig::default(), token)?);
//!     let tracker = TimeTracker::new(TimerStore::new(kv), Arc::new(SystemClock));
//!     let mut board = TimesheetBoard::new(backend, tracker);
//!
//!     board.mount().await?;
//!     board.time_in().await?;
//!     board.unmount();
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod board;
pub mod config;
pub mod logging;
pub mod store;
pub mod timer;

#[cfg(test)]
mod testing;

// Re-export top-level types for convenience
pub use backend::{
    BackendClient, BackendConfig, BackendError, BackendResult, Identity, Role, Shift,
    TaskCategory, Timesheet, TimesheetBackend, TimesheetEntry, UserSummary,
};

pub use board::{BoardError, BoardResult, ManualEntry, OutputFormat, TimesheetBoard};

pub use config::{Config, ConfigError, LoggingConfig};

pub use store::{
    FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult, TimerStore, ACCESS_TOKEN_KEY,
};

pub use timer::{
    Clock, EntryField, EntryForm, StartOutcome, StopOutcome, SystemClock, TimeTracker,
    TimerError, TimerPhase, TimerResult, TimerState,
};

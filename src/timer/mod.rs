//! Time-Tracking Timer
//!
//! Tracks one open work interval, publishes its elapsed time every second,
//! and turns it into a timesheet entry at Time Out.
//!
//! - **tracker**: The Idle/Running state machine and submission
//! - **state**: `TimerState` and its invariant
//! - **elapsed**: `HH:MM:SS` formatting
//! - **ticker**: Repeating task scoped to the Running state
//! - **clock**: Injectable wall clock
//! - **form**: Companion fields required at Time Out
//! - **error**: Error types

pub mod clock;
pub mod elapsed;
pub mod error;
pub mod form;
pub mod state;
pub mod ticker;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use elapsed::{elapsed_display, format_elapsed_ms, is_elapsed_display, ZERO_DISPLAY};
pub use error::{TimerError, TimerResult};
pub use form::{EntryField, EntryForm};
pub use state::{TimerPhase, TimerState};
pub use ticker::{Ticker, TICK_PERIOD};
pub use tracker::{StartOutcome, StopOutcome, TimeTracker};

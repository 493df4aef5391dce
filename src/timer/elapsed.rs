//! Elapsed-time formatting
//!
//! Durations are rendered as `HH:MM:SS` with cumulative hours: 25 hours is
//! `"25:00:00"`, never wrapped into days. Everything floors to whole seconds.

use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Display of an interval that has not accrued any time
pub const ZERO_DISPLAY: &str = "00:00:00";

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_SECOND: i64 = 1_000;

/// Format a millisecond count as zero-padded `HH:MM:SS`
///
/// Negative input (wall clock moved backwards) is clamped to zero.
pub fn format_elapsed_ms(elapsed_ms: i64) -> String {
    let ms = elapsed_ms.max(0);
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;

    let mut out = String::with_capacity(8);
    let _ = write!(out, "{hours:02}:{minutes:02}:{seconds:02}");
    out
}

/// Elapsed display between `time_in` and `now`
pub fn elapsed_display(time_in: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_elapsed_ms((now - time_in).num_milliseconds())
}

/// Whether `s` is a well-formed elapsed display (`HH:MM:SS`, hours at least two digits)
pub fn is_elapsed_display(s: &str) -> bool {
    let mut parts = s.split(':');
    let (Some(h), Some(m), Some(sec), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if h.len() < 2 || m.len() != 2 || sec.len() != 2 {
        return false;
    }
    if !(digits(h) && digits(m) && digits(sec)) {
        return false;
    }

    matches!((m.parse::<u8>(), sec.parse::<u8>()), (Ok(m), Ok(s)) if m < 60 && s < 60)
}

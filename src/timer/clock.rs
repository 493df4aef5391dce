//! Wall-clock source
//!
//! The tracker reads time only through [`Clock`], so tests can pin and
//! advance it.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Mutex;

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date (UTC), used as the default work date
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Reads the operating system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::minutes(2));
        assert_eq!(clock.now(), start + Duration::minutes(2));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    }
}

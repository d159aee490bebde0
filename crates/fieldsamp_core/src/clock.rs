//! Clock abstraction so time-dependent logic is deterministic under test.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Source of "now" for timers, caches, and transition timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Shared clock handle passed into consumers.
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at the given instant.
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }

    /// Advance by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock();
        *now += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        "2024-01-01T10:00:00Z".parse().unwrap()
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at(t0());
        assert_eq!(clock.now(), t0());

        clock.advance_secs(90);
        assert_eq!(clock.now(), t0() + Duration::seconds(90));
    }

    #[test]
    fn manual_clock_set_jumps() {
        let clock = ManualClock::at(t0());
        let later = t0() + Duration::hours(2);
        clock.set(later);
        assert_eq!(clock.now(), later);
    }
}

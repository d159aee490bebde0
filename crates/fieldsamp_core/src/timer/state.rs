//! Timer state machine for a single sample.
//!
//! Phases are derived from the recorded times, mirroring the persisted
//! record: start unset is NotStarted, start set with stop unset is Running,
//! both set is Stopped. Transitions validate the entry phase and return an
//! error without touching state when called from the wrong phase.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{RunPhase, Sample};

/// A transition was attempted from a phase that does not allow it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {action} a timer that is {phase}")]
pub struct TransitionError {
    pub action: &'static str,
    pub phase: RunPhase,
}

impl TransitionError {
    fn new(action: &'static str, phase: RunPhase) -> Self {
        Self { action, phase }
    }
}

/// Client-local elapsed-time state for one sample.
///
/// Invariant: `elapsed` is `(stop ?? now) - start` in whole seconds while
/// `start` is set, and 0 otherwise. `now` is supplied by the caller on every
/// mutation so the state never reads the wall clock itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerState {
    pub running: bool,
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
    /// Derived display value in whole seconds.
    pub elapsed: i64,
}

impl TimerState {
    /// Rebuild state from a sample's persisted times. For a running sample
    /// the elapsed value is anchored to `now` so the display is correct
    /// before the first tick.
    pub fn from_sample(sample: &Sample, now: DateTime<Utc>) -> Self {
        Self::from_times(sample.start_time, sample.stop_time, now)
    }

    /// Rebuild state from raw persisted times.
    pub fn from_times(
        start: Option<DateTime<Utc>>,
        stop: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let running = start.is_some() && stop.is_none();
        let elapsed = match (start, stop) {
            (Some(s), Some(e)) => whole_seconds(s, e),
            (Some(s), None) => whole_seconds(s, now),
            (None, _) => 0,
        };
        Self {
            running,
            start,
            stop,
            elapsed,
        }
    }

    /// Current phase, derived from the recorded times.
    pub fn phase(&self) -> RunPhase {
        match (&self.start, &self.stop) {
            (None, _) => RunPhase::NotStarted,
            (Some(_), None) => RunPhase::Running,
            (Some(_), Some(_)) => RunPhase::Stopped,
        }
    }

    /// Start measuring. Valid only from NotStarted.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.phase() != RunPhase::NotStarted {
            return Err(TransitionError::new("start", self.phase()));
        }
        self.start = Some(now);
        self.stop = None;
        self.elapsed = 0;
        self.running = true;
        Ok(())
    }

    /// Stop measuring. Valid only while Running.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.phase() != RunPhase::Running {
            return Err(TransitionError::new("stop", self.phase()));
        }
        // phase() == Running guarantees start is set
        let start = self.start.unwrap_or(now);
        self.stop = Some(now);
        self.running = false;
        self.elapsed = whole_seconds(start, now);
        Ok(())
    }

    /// Resume measuring. Valid only from Stopped. The start anchor is kept,
    /// so elapsed time is wall-clock since the original start - the stopped
    /// interval is not credited back. That is the contract, not a bug.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.phase() != RunPhase::Stopped {
            return Err(TransitionError::new("resume", self.phase()));
        }
        let start = self.start.unwrap_or(now);
        self.stop = None;
        self.running = true;
        self.elapsed = whole_seconds(start, now);
        Ok(())
    }

    /// Clear both times. Callers gate this behind an explicit confirmation;
    /// the state itself allows it from any phase.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Recompute the derived elapsed value. Display-only: does nothing
    /// unless the timer is running.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if !self.running {
            return;
        }
        if let Some(start) = self.start {
            self.elapsed = whole_seconds(start, now);
        }
    }
}

fn whole_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_seconds().max(0)
}

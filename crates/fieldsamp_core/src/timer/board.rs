//! The list view's mapping from sample id to timer state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{Sample, SampleId};

use super::TimerState;

/// Owns one `TimerState` per visible sample.
///
/// Controllers mutate entries through `with_entry`; the fetch path overwrites
/// everything with `rebuild_from`. An entry exists only while its sample is
/// in the current list - `rebuild_from` drops states for samples that are no
/// longer displayed.
#[derive(Debug, Default)]
pub struct TimerBoard {
    entries: HashMap<SampleId, TimerState>,
}

impl TimerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SampleId) -> Option<&TimerState> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mutate the entry for `id` in place, creating a NotStarted entry if
    /// the sample has no state yet. This is the single mutation path used by
    /// controllers.
    pub fn with_entry<R>(&mut self, id: SampleId, f: impl FnOnce(&mut TimerState) -> R) -> R {
        f(self.entries.entry(id).or_default())
    }

    /// Replace the entry for `id` outright (confirmed server state).
    pub fn insert(&mut self, id: SampleId, state: TimerState) {
        self.entries.insert(id, state);
    }

    pub fn remove(&mut self, id: SampleId) -> Option<TimerState> {
        self.entries.remove(&id)
    }

    /// Reconciliation: rebuild every entry from freshly fetched samples,
    /// overwriting any optimistic client-only state with server truth.
    pub fn rebuild_from(&mut self, samples: &[Sample], now: DateTime<Utc>) {
        self.entries.clear();
        for sample in samples {
            self.entries
                .insert(sample.id, TimerState::from_sample(sample, now));
        }
    }

    /// Recompute elapsed for every running entry. Returns how many entries
    /// are running so the caller can stop ticking at zero.
    pub fn tick_all(&mut self, now: DateTime<Utc>) -> usize {
        let mut running = 0;
        for state in self.entries.values_mut() {
            if state.running {
                state.tick(now);
                running += 1;
            }
        }
        running
    }

    pub fn any_running(&self) -> bool {
        self.entries.values().any(|s| s.running)
    }
}

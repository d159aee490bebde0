//! Explicit fetch cache with TTL and in-flight tracking.
//!
//! Owned by the consuming component and driven by an injected clock, so
//! expiry and de-duplication are deterministic under test. Replaces the
//! ambient module-level caches of the original screens.

use chrono::{DateTime, Duration, Utc};

use crate::clock::{Clock, SharedClock};

/// Caches the result of one fetch for a bounded time, and tracks whether a
/// fetch is currently in flight so callers can avoid issuing duplicates.
pub struct FetchCache<T> {
    value: Option<(T, DateTime<Utc>)>,
    ttl: Duration,
    in_flight: bool,
    clock: SharedClock,
}

impl<T: Clone> FetchCache<T> {
    pub fn new(ttl_secs: i64, clock: SharedClock) -> Self {
        Self {
            value: None,
            ttl: Duration::seconds(ttl_secs),
            in_flight: false,
            clock,
        }
    }

    /// The cached value, if present and fresh.
    pub fn get(&self) -> Option<T> {
        let (value, fetched_at) = self.value.as_ref()?;
        if self.clock.now() - *fetched_at < self.ttl {
            Some(value.clone())
        } else {
            None
        }
    }

    /// The last stored value regardless of freshness. Used to serve a reader
    /// while a refresh is already in flight.
    pub fn last(&self) -> Option<T> {
        self.value.as_ref().map(|(v, _)| v.clone())
    }

    /// Mark a fetch as started. Returns false (and does nothing) if one is
    /// already in flight.
    pub fn begin_fetch(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Store a fetched value, stamping it with the current instant and
    /// clearing the in-flight flag.
    pub fn put(&mut self, value: T) {
        self.value = Some((value, self.clock.now()));
        self.in_flight = false;
    }

    /// Clear the in-flight flag without storing (failed fetch).
    pub fn end_fetch(&mut self) {
        self.in_flight = false;
    }

    /// Drop the cached value. The next `get` misses.
    pub fn invalidate(&mut self) {
        self.value = None;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;

    fn cache(ttl_secs: i64) -> (FetchCache<u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at("2024-01-01T10:00:00Z".parse().unwrap()));
        (FetchCache::new(ttl_secs, clock.clone()), clock)
    }

    #[test]
    fn value_expires_after_ttl() {
        let (mut cache, clock) = cache(30);
        cache.put(7);
        assert_eq!(cache.get(), Some(7));

        clock.advance_secs(29);
        assert_eq!(cache.get(), Some(7));

        clock.advance_secs(1);
        assert_eq!(cache.get(), None);
        assert_eq!(cache.last(), Some(7)); // stale but still held
    }

    #[test]
    fn begin_fetch_dedupes() {
        let (mut cache, _clock) = cache(30);
        assert!(cache.begin_fetch());
        assert!(!cache.begin_fetch());

        cache.put(1);
        assert!(!cache.in_flight());
        assert!(cache.begin_fetch());
    }

    #[test]
    fn failed_fetch_clears_flag_only() {
        let (mut cache, _clock) = cache(30);
        cache.put(3);
        assert!(cache.begin_fetch());
        cache.end_fetch();
        assert!(!cache.in_flight());
        assert_eq!(cache.get(), Some(3));
    }

    #[test]
    fn invalidate_forces_miss() {
        let (mut cache, _clock) = cache(30);
        cache.put(9);
        cache.invalidate();
        assert_eq!(cache.get(), None);
        assert_eq!(cache.last(), None);
    }
}

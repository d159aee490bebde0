//! Sample list view support: cached fetch, board reconciliation, and a
//! plain-text rendering of the per-sample timers.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;

use fieldsamp_core::cache::FetchCache;
use fieldsamp_core::clock::{Clock, SharedClock};
use fieldsamp_core::format::{format_duration, format_timestamp};
use fieldsamp_core::models::Sample;
use fieldsamp_core::timer::TimerBoard;

use crate::api::{ApiClient, ApiResult};

/// Fetch seam for the sample list, so the view is testable without HTTP.
pub trait SampleFetch {
    fn samples_by_address(
        &self,
        address_id: i64,
        date: Option<NaiveDate>,
    ) -> impl Future<Output = ApiResult<Vec<Sample>>> + Send;
}

impl SampleFetch for ApiClient {
    async fn samples_by_address(
        &self,
        address_id: i64,
        date: Option<NaiveDate>,
    ) -> ApiResult<Vec<Sample>> {
        ApiClient::samples_by_address(self, address_id, date).await
    }
}

/// The sample list for one address and date.
///
/// Owns the fetch cache and the timer board. Every successful (re)fetch
/// rebuilds the board from server truth - that overwrite is the
/// reconciliation mechanism for any optimistic state still in flight.
pub struct SampleList<F> {
    fetch: F,
    address_id: i64,
    date: Option<NaiveDate>,
    cache: FetchCache<Vec<Sample>>,
    board: Arc<Mutex<TimerBoard>>,
    clock: SharedClock,
}

impl<F: SampleFetch> SampleList<F> {
    pub fn new(
        fetch: F,
        address_id: i64,
        date: Option<NaiveDate>,
        cache_ttl_secs: i64,
        board: Arc<Mutex<TimerBoard>>,
        clock: SharedClock,
    ) -> Self {
        Self {
            fetch,
            address_id,
            date,
            cache: FetchCache::new(cache_ttl_secs, clock.clone()),
            board,
            clock,
        }
    }

    pub fn board(&self) -> Arc<Mutex<TimerBoard>> {
        self.board.clone()
    }

    /// Current samples, fetching only when the cache is stale and no fetch
    /// is already in flight. A fresh fetch rebuilds the timer board.
    pub async fn refresh(&mut self) -> ApiResult<Vec<Sample>> {
        if let Some(cached) = self.cache.get() {
            return Ok(cached);
        }
        if !self.cache.begin_fetch() {
            // a fetch is already running; serve the last known list
            return Ok(self.cache.last().unwrap_or_default());
        }
        match self
            .fetch
            .samples_by_address(self.address_id, self.date)
            .await
        {
            Ok(samples) => {
                self.cache.put(samples.clone());
                self.board
                    .lock()
                    .rebuild_from(&samples, self.clock.now());
                Ok(samples)
            }
            Err(err) => {
                self.cache.end_fetch();
                Err(err)
            }
        }
    }

    /// Drop the cached list so the next `refresh` hits the backend.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Render one row per sample: description, barcode, phase, elapsed,
    /// start and stop times.
    pub fn render_table(&self, samples: &[Sample]) -> String {
        let board = self.board.lock();
        let mut out = format!(
            "{:<6} {:<24} {:<10} {:<12} {:>9}  {:<23} {:<23}\n",
            "id", "description", "barcode", "phase", "elapsed", "start", "stop"
        );
        for sample in samples {
            let state = board.get(sample.id).copied().unwrap_or_default();
            out.push_str(&format!(
                "{:<6} {:<24} {:<10} {:<12} {:>9}  {:<23} {:<23}\n",
                sample.id,
                sample.description.as_deref().unwrap_or("-"),
                sample.cassette_barcode.as_deref().unwrap_or("-"),
                state.phase().to_string(),
                format_duration(state.elapsed),
                format_timestamp(state.start),
                format_timestamp(state.stop),
            ));
        }
        out
    }
}

//! Optimistic timer controller for sample collection.
//!
//! Every transition mutates the owning view's board first, then persists.
//! A failed persistence call is reported once through the notification sink
//! and otherwise absorbed - the optimistic local state is kept, not rolled
//! back. Responses pass through a per-sample sequence reducer so a stale
//! response can never overwrite newer local state.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use fieldsamp_core::clock::{Clock, SharedClock};
use fieldsamp_core::models::{Sample, SampleId, SamplePatch};
use fieldsamp_core::timer::{TimerBoard, TimerState};

use crate::api::{ApiClient, ApiResult};
use crate::notify::{NoticeKind, Notify};

/// Persistence seam between the controller and the backend.
pub trait SampleStore {
    fn patch_sample(
        &self,
        id: SampleId,
        patch: SamplePatch,
    ) -> impl Future<Output = ApiResult<Sample>> + Send;
}

impl SampleStore for ApiClient {
    async fn patch_sample(&self, id: SampleId, patch: SamplePatch) -> ApiResult<Sample> {
        self.update_sample(id, &patch).await
    }
}

/// Drives the Start/Stop/Resume/Reset lifecycle for the samples on a board.
///
/// The board stays owned by the list view; the controller only mutates
/// entries through it.
pub struct TimerController<S, N> {
    store: S,
    notifier: N,
    clock: SharedClock,
    board: Arc<Mutex<TimerBoard>>,
    /// Last issued operation sequence number per sample.
    ops: Mutex<HashMap<SampleId, u64>>,
    /// Samples with an open reset confirmation prompt.
    pending_reset: Mutex<HashSet<SampleId>>,
}

impl<S: SampleStore, N: Notify> TimerController<S, N> {
    pub fn new(store: S, notifier: N, clock: SharedClock, board: Arc<Mutex<TimerBoard>>) -> Self {
        Self {
            store,
            notifier,
            clock,
            board,
            ops: Mutex::new(HashMap::new()),
            pending_reset: Mutex::new(HashSet::new()),
        }
    }

    pub fn board(&self) -> Arc<Mutex<TimerBoard>> {
        self.board.clone()
    }

    /// Start the timer. No-op unless the sample is scanned and NotStarted;
    /// a refused start makes no network call and raises no notice (the
    /// presenting view disables the button).
    pub async fn start(&self, sample: &Sample) {
        if !sample.is_scanned() {
            tracing::debug!(sample = sample.id, "start refused: cassette not scanned");
            return;
        }
        let now = self.clock.now();
        let accepted = self
            .board
            .lock()
            .with_entry(sample.id, |state| state.start(now))
            .is_ok();
        if !accepted {
            return;
        }
        let patch = SamplePatch::new().start_time(Some(now)).stop_time(None);
        self.persist(sample.id, patch, "start timer").await;
    }

    /// Stop a running timer. No-op from any other phase.
    pub async fn stop(&self, id: SampleId) {
        let now = self.clock.now();
        let accepted = self
            .board
            .lock()
            .with_entry(id, |state| state.stop(now))
            .is_ok();
        if !accepted {
            return;
        }
        self.persist(id, SamplePatch::new().stop_time(Some(now)), "stop timer")
            .await;
    }

    /// Resume a stopped timer. Clears only the stop time; the start anchor
    /// is untouched, so elapsed time is wall-clock since the original start.
    pub async fn resume(&self, id: SampleId) {
        let now = self.clock.now();
        let accepted = self
            .board
            .lock()
            .with_entry(id, |state| state.resume(now))
            .is_ok();
        if !accepted {
            return;
        }
        self.persist(id, SamplePatch::new().stop_time(None), "resume timer")
            .await;
    }

    /// Open the reset confirmation prompt. Reset is destructive, so it only
    /// proceeds once `confirm_reset` follows.
    pub fn request_reset(&self, id: SampleId) {
        self.pending_reset.lock().insert(id);
    }

    /// Dismiss a pending reset prompt.
    pub fn cancel_reset(&self, id: SampleId) -> bool {
        self.pending_reset.lock().remove(&id)
    }

    pub fn reset_pending(&self, id: SampleId) -> bool {
        self.pending_reset.lock().contains(&id)
    }

    /// Clear both recorded times. No-op unless a reset was requested first.
    pub async fn confirm_reset(&self, id: SampleId) {
        if !self.pending_reset.lock().remove(&id) {
            return;
        }
        self.board.lock().with_entry(id, |state| state.reset());
        let patch = SamplePatch::new().start_time(None).stop_time(None);
        self.persist(id, patch, "reset timer").await;
    }

    async fn persist(&self, id: SampleId, patch: SamplePatch, action: &'static str) {
        let seq = self.next_seq(id);
        let result = self.store.patch_sample(id, patch).await;
        self.apply_result(id, seq, action, result);
    }

    /// Reduce a persistence response into the board. Only the newest issued
    /// operation for a sample may apply its confirmed record; older
    /// responses are discarded so out-of-order arrival cannot clobber a
    /// later optimistic transition. Failures notify once and leave the
    /// optimistic state in place.
    fn apply_result(
        &self,
        id: SampleId,
        seq: u64,
        action: &'static str,
        result: ApiResult<Sample>,
    ) {
        match result {
            Ok(confirmed) => {
                if !self.is_latest(id, seq) {
                    tracing::debug!(sample = id, seq, "discarding stale response");
                    return;
                }
                let now = self.clock.now();
                self.board
                    .lock()
                    .insert(id, TimerState::from_sample(&confirmed, now));
                tracing::debug!(sample = id, action, "persisted");
            }
            Err(err) => {
                tracing::warn!(
                    sample = id,
                    action,
                    error = %err,
                    "persistence failed; keeping optimistic state"
                );
                self.notifier
                    .notify(&format!("Failed to {action}"), NoticeKind::Error);
            }
        }
    }

    fn next_seq(&self, id: SampleId) -> u64 {
        let mut ops = self.ops.lock();
        let seq = ops.entry(id).or_insert(0);
        *seq += 1;
        *seq
    }

    fn is_latest(&self, id: SampleId, seq: u64) -> bool {
        self.ops.lock().get(&id) == Some(&seq)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chrono::{DateTime, Utc};
    use reqwest::StatusCode;

    use fieldsamp_core::clock::ManualClock;
    use fieldsamp_core::models::RunPhase;

    use crate::api::ApiError;
    use crate::notify::{MemoryNotifier, NoticeKind};

    use super::*;

    fn t0() -> DateTime<Utc> {
        "2024-01-01T10:00:00Z".parse().unwrap()
    }

    fn sample(id: SampleId, barcode: Option<&str>) -> Sample {
        Sample {
            id,
            address_id: 1,
            description: Some("living room".to_string()),
            cassette_barcode: barcode.map(str::to_string),
            is_inside: Some(true),
            flow_rate: None,
            volume_required: None,
            start_time: None,
            stop_time: None,
            total_time_ran: None,
            fields: None,
            fibers: None,
            created_at: "2024-01-01T08:00:00Z".parse().unwrap(),
        }
    }

    /// In-memory backend that applies patches to a single record.
    struct FakeStore {
        record: Mutex<Sample>,
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeStore {
        fn holding(record: Sample) -> Self {
            Self {
                record: Mutex::new(record),
                fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }

        fn record(&self) -> Sample {
            self.record.lock().clone()
        }
    }

    impl SampleStore for &FakeStore {
        async fn patch_sample(&self, id: SampleId, patch: SamplePatch) -> ApiResult<Sample> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::Status {
                    url: format!("/api/v1/samples/{id}"),
                    status: StatusCode::BAD_GATEWAY,
                    message: "upstream unavailable".to_string(),
                });
            }
            let mut record = self.record.lock();
            let body = serde_json::to_value(&patch).unwrap();
            if let Some(v) = body.get("start_time") {
                record.start_time = v.as_str().map(|s| s.parse().unwrap());
            }
            if let Some(v) = body.get("stop_time") {
                record.stop_time = v.as_str().map(|s| s.parse().unwrap());
            }
            Ok(record.clone())
        }
    }

    fn controller(
        store: &FakeStore,
        clock: Arc<ManualClock>,
    ) -> (
        TimerController<&FakeStore, Arc<MemoryNotifier>>,
        Arc<MemoryNotifier>,
    ) {
        let notifier = Arc::new(MemoryNotifier::new());
        let board = Arc::new(Mutex::new(TimerBoard::new()));
        (
            TimerController::new(store, notifier.clone(), clock, board),
            notifier,
        )
    }

    #[tokio::test]
    async fn start_without_barcode_is_a_silent_noop() {
        let store = FakeStore::holding(sample(1, None));
        let clock = Arc::new(ManualClock::at(t0()));
        let (ctl, notifier) = controller(&store, clock);

        ctl.start(&sample(1, None)).await;

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
        assert!(notifier.notices().is_empty());
        assert!(ctl.board().lock().get(1).is_none());
    }

    #[tokio::test]
    async fn full_cycle_anchors_elapsed_to_original_start() {
        let store = FakeStore::holding(sample(1, Some("CAS-0001")));
        let clock = Arc::new(ManualClock::at(t0()));
        let (ctl, notifier) = controller(&store, clock.clone());

        ctl.start(&sample(1, Some("CAS-0001"))).await;
        clock.advance_secs(300);
        ctl.stop(1).await;
        clock.advance_secs(600);
        ctl.resume(1).await;
        clock.advance_secs(900);
        ctl.stop(1).await;

        let board = ctl.board();
        let state = *board.lock().get(1).unwrap();
        // final_stop - original_start, not cumulative active time
        assert_eq!(state.elapsed, 1800);
        assert_eq!(state.start, Some(t0()));
        assert_eq!(state.phase(), RunPhase::Stopped);

        // backend converged on the same times
        let record = store.record();
        assert_eq!(record.start_time, Some(t0()));
        assert_eq!(
            record.stop_time,
            Some(t0() + chrono::Duration::seconds(1800))
        );
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn resume_clears_stop_only() {
        let store = FakeStore::holding(sample(1, Some("CAS-0001")));
        let clock = Arc::new(ManualClock::at(t0()));
        let (ctl, _notifier) = controller(&store, clock.clone());

        ctl.start(&sample(1, Some("CAS-0001"))).await;
        clock.advance_secs(60);
        ctl.stop(1).await;
        clock.advance_secs(30);
        ctl.resume(1).await;

        let board = ctl.board();
        let state = *board.lock().get(1).unwrap();
        assert!(state.running);
        assert_eq!(state.stop, None);
        assert_eq!(state.start, Some(t0()));

        let record = store.record();
        assert_eq!(record.start_time, Some(t0()));
        assert_eq!(record.stop_time, None);
    }

    #[tokio::test]
    async fn failed_stop_keeps_optimistic_state_and_notifies_once() {
        let store = FakeStore::holding(sample(1, Some("CAS-0001")));
        let clock = Arc::new(ManualClock::at(t0()));
        let (ctl, notifier) = controller(&store, clock.clone());

        ctl.start(&sample(1, Some("CAS-0001"))).await;
        clock.advance_secs(120);
        store.fail.store(true, Ordering::SeqCst);
        ctl.stop(1).await;

        let board = ctl.board();
        let state = *board.lock().get(1).unwrap();
        assert!(!state.running);
        assert_eq!(state.stop, Some(t0() + chrono::Duration::seconds(120)));
        assert_eq!(state.elapsed, 120);

        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert!(notices[0].message.contains("stop timer"));
    }

    #[tokio::test]
    async fn reset_requires_request_then_confirm() {
        let store = FakeStore::holding(sample(1, Some("CAS-0001")));
        let clock = Arc::new(ManualClock::at(t0()));
        let (ctl, _notifier) = controller(&store, clock.clone());

        ctl.start(&sample(1, Some("CAS-0001"))).await;
        clock.advance_secs(10);

        // confirm with no pending request must not clear anything
        ctl.confirm_reset(1).await;
        assert!(ctl.board().lock().get(1).unwrap().start.is_some());
        assert!(store.record().start_time.is_some());

        ctl.request_reset(1);
        assert!(ctl.reset_pending(1));
        ctl.confirm_reset(1).await;

        let board = ctl.board();
        let state = *board.lock().get(1).unwrap();
        assert_eq!(state, TimerState::default());
        assert!(!ctl.reset_pending(1));
        assert_eq!(store.record().start_time, None);
        assert_eq!(store.record().stop_time, None);
    }

    #[tokio::test]
    async fn cancel_reset_dismisses_prompt() {
        let store = FakeStore::holding(sample(1, Some("CAS-0001")));
        let clock = Arc::new(ManualClock::at(t0()));
        let (ctl, _notifier) = controller(&store, clock.clone());

        ctl.start(&sample(1, Some("CAS-0001"))).await;
        ctl.request_reset(1);
        assert!(ctl.cancel_reset(1));

        ctl.confirm_reset(1).await;
        assert!(ctl.board().lock().get(1).unwrap().start.is_some());
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let store = FakeStore::holding(sample(1, Some("CAS-0001")));
        let clock = Arc::new(ManualClock::at(t0()));
        let (ctl, _notifier) = controller(&store, clock.clone());

        ctl.start(&sample(1, Some("CAS-0001"))).await;
        clock.advance_secs(60);
        ctl.stop(1).await;

        // a response from the (older) start operation arriving after the
        // stop has been applied must not resurrect the running state
        let mut stale = sample(1, Some("CAS-0001"));
        stale.start_time = Some(t0());
        stale.stop_time = None;
        ctl.apply_result(1, 1, "start timer", Ok(stale));

        let board = ctl.board();
        let state = *board.lock().get(1).unwrap();
        assert_eq!(state.phase(), RunPhase::Stopped);
        assert_eq!(state.elapsed, 60);
    }

    #[tokio::test]
    async fn start_twice_is_a_noop_second_time() {
        let store = FakeStore::holding(sample(1, Some("CAS-0001")));
        let clock = Arc::new(ManualClock::at(t0()));
        let (ctl, _notifier) = controller(&store, clock.clone());

        ctl.start(&sample(1, Some("CAS-0001"))).await;
        clock.advance_secs(5);
        ctl.start(&sample(1, Some("CAS-0001"))).await;

        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctl.board().lock().get(1).unwrap().start, Some(t0()));
    }
}

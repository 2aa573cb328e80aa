//! Tracker integration tests.
//!
//! These tests drive `SleepTracker` end-to-end against both store backends
//! and a store that can be told to fail.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use sleep_tracker::{
    ManualClock, MemoryStore, NewSession, Result, Session, SessionId, SessionStore, SleepQuality,
    SleepTracker, SqliteStore, TrackerError, TrackingState,
};

/// Store wrapper that counts writes and can fail on demand.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    fail_list: AtomicBool,
}

impl FlakyStore {
    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("disk full").into());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TrackerError::LockPoisoned);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn insert(&self, session: NewSession) -> Result<SessionId> {
        self.check_write()?;
        self.inner.insert(session).await
    }

    async fn update(&self, session: &Session) -> Result<()> {
        self.check_write()?;
        self.inner.update(session).await
    }

    async fn get(&self, id: SessionId) -> Result<Option<Session>> {
        self.check_read()?;
        self.inner.get(id).await
    }

    async fn most_recent(&self) -> Result<Option<Session>> {
        self.check_read()?;
        self.inner.most_recent().await
    }

    async fn all(&self) -> Result<Vec<Session>> {
        self.check_read()?;
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(TrackerError::LockPoisoned);
        }
        self.inner.all().await
    }

    async fn clear(&self) -> Result<()> {
        self.check_write()?;
        self.inner.clear().await
    }
}

async fn memory_tracker(
    start_ms: i64,
) -> (SleepTracker<MemoryStore>, Arc<MemoryStore>, Arc<ManualClock>) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_ms));
    let tracker = SleepTracker::with_clock(store.clone(), clock.clone())
        .await
        .unwrap();
    (tracker, store, clock)
}

fn assert_tonight_invariant<S: SessionStore>(tracker: &SleepTracker<S>) {
    if let Some(night) = tracker.tonight() {
        assert!(night.is_open(), "tonight must be open: {:?}", night);
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_empty_store_starts_idle() {
    let (tracker, _, _) = memory_tracker(0).await;

    assert_eq!(tracker.state(), TrackingState::Idle);
    assert!(tracker.tonight().is_none());
    assert!(tracker.start_button_visible());
    assert!(!tracker.stop_button_visible());
    assert!(!tracker.clear_button_visible());
}

#[tokio::test]
async fn test_start_tracking_inserts_open_session() {
    let (tracker, store, _) = memory_tracker(1_000).await;

    tracker.start_tracking().await.unwrap();

    let stored = store.all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].start_time_ms, 1_000);
    assert_eq!(stored[0].end_time_ms, 1_000);

    assert_eq!(tracker.state(), TrackingState::Tracking);
    assert!(tracker.stop_button_visible());
    assert!(!tracker.start_button_visible());
    assert!(tracker.clear_button_visible());
    assert_tonight_invariant(&tracker);
}

#[tokio::test]
async fn test_stop_tracking_closes_and_signals() {
    let (tracker, store, clock) = memory_tracker(1_000).await;
    let id = tracker.start_tracking().await.unwrap();

    clock.set(2_000);
    let closed = tracker.stop_tracking().await.unwrap().unwrap();

    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.start_time_ms, 1_000);
    assert_eq!(stored.end_time_ms, 2_000);
    assert_eq!(closed, stored);

    assert!(tracker.tonight().is_none());
    assert!(tracker.start_button_visible());
    assert!(!tracker.stop_button_visible());

    let signal = tracker.consume_navigation().unwrap();
    assert_eq!(signal, stored);
    assert!(signal.end_time_ms > signal.start_time_ms);
}

#[tokio::test]
async fn test_clear_history_empties_store() {
    let (tracker, store, clock) = memory_tracker(1_000).await;
    for _ in 0..3 {
        tracker.start_tracking().await.unwrap();
        clock.advance(1_000);
        tracker.stop_tracking().await.unwrap();
        clock.advance(1_000);
    }
    tracker.start_tracking().await.unwrap();
    assert_eq!(tracker.history().len(), 4);

    tracker.clear_history().await.unwrap();

    assert_eq!(store.count(), 0);
    assert!(tracker.tonight().is_none());
    assert!(tracker.history().is_empty());
    assert!(!tracker.clear_button_visible());
    assert!(tracker.start_button_visible());
}

#[tokio::test]
async fn test_consume_navigation_with_nothing_pending() {
    let (tracker, _, _) = memory_tracker(0).await;
    assert!(tracker.consume_navigation().is_none());
    assert!(!tracker.consume_notification());
}

// ============================================================================
// Invariants
// ============================================================================

#[tokio::test]
async fn test_navigation_consumed_once() {
    let (tracker, _, clock) = memory_tracker(1_000).await;
    tracker.start_tracking().await.unwrap();
    clock.advance(60_000);
    tracker.stop_tracking().await.unwrap();

    assert!(tracker.consume_navigation().is_some());
    assert!(tracker.consume_navigation().is_none());
}

#[tokio::test]
async fn test_stop_while_idle_is_noop() {
    let store = Arc::new(FlakyStore::default());
    let clock = Arc::new(ManualClock::new(1_000));
    let tracker = SleepTracker::with_clock(store.clone(), clock).await.unwrap();

    let result = tracker.stop_tracking().await.unwrap();

    assert!(result.is_none());
    assert_eq!(store.writes(), 0);
    assert!(tracker.pending_navigation().is_none());
}

#[tokio::test]
async fn test_stop_while_idle_keeps_pending_navigation() {
    let (tracker, _, clock) = memory_tracker(1_000).await;
    tracker.start_tracking().await.unwrap();
    clock.advance(5_000);
    let closed = tracker.stop_tracking().await.unwrap().unwrap();

    // Second stop must not clear or replace the unconsumed signal.
    assert!(tracker.stop_tracking().await.unwrap().is_none());
    assert_eq!(tracker.consume_navigation(), Some(closed));
}

#[tokio::test]
async fn test_tonight_invariant_across_sequence() {
    let (tracker, _, clock) = memory_tracker(10).await;

    assert_tonight_invariant(&tracker);
    tracker.start_tracking().await.unwrap();
    assert_tonight_invariant(&tracker);
    clock.advance(1);
    tracker.start_tracking().await.unwrap();
    assert_tonight_invariant(&tracker);
    clock.advance(1);
    tracker.stop_tracking().await.unwrap();
    assert_tonight_invariant(&tracker);
    tracker.clear_history().await.unwrap();
    assert_tonight_invariant(&tracker);
}

// ============================================================================
// Store failures
// ============================================================================

#[tokio::test]
async fn test_failed_insert_leaves_state_untouched() {
    let store = Arc::new(FlakyStore::default());
    let tracker = SleepTracker::with_clock(store.clone(), Arc::new(ManualClock::new(1_000)))
        .await
        .unwrap();

    store.fail_writes(true);
    let err = tracker.start_tracking().await.unwrap_err();

    assert!(err.is_store_error());
    assert_eq!(tracker.state(), TrackingState::Idle);
    assert!(tracker.start_button_visible());
}

#[tokio::test]
async fn test_failed_update_keeps_tracking() {
    let store = Arc::new(FlakyStore::default());
    let clock = Arc::new(ManualClock::new(1_000));
    let tracker = SleepTracker::with_clock(store.clone(), clock.clone())
        .await
        .unwrap();
    tracker.start_tracking().await.unwrap();

    store.fail_writes(true);
    clock.advance(1_000);
    assert!(tracker.stop_tracking().await.is_err());

    assert_eq!(tracker.state(), TrackingState::Tracking);
    assert!(tracker.pending_navigation().is_none());

    // The store still holds the open night; retrying succeeds.
    store.fail_writes(false);
    let closed = tracker.stop_tracking().await.unwrap().unwrap();
    assert_eq!(closed.end_time_ms, 2_000);
}

#[tokio::test]
async fn test_failed_clear_keeps_history() {
    let store = Arc::new(FlakyStore::default());
    let tracker = SleepTracker::with_clock(store.clone(), Arc::new(ManualClock::new(1_000)))
        .await
        .unwrap();
    tracker.start_tracking().await.unwrap();

    store.fail_writes(true);
    assert!(tracker.clear_history().await.is_err());

    assert_eq!(tracker.history().len(), 1);
    assert!(tracker.tonight().is_some());
    assert!(!tracker.notification_pending());
}

#[tokio::test]
async fn test_clear_applies_even_if_history_reload_fails() {
    let store = Arc::new(FlakyStore::default());
    let tracker = SleepTracker::with_clock(store.clone(), Arc::new(ManualClock::new(1_000)))
        .await
        .unwrap();
    tracker.start_tracking().await.unwrap();

    store.fail_list(true);
    let err = tracker.clear_history().await.unwrap_err();
    assert!(err.is_store_error());

    assert_eq!(store.inner.count(), 0);
    assert!(tracker.tonight().is_none());
    assert!(tracker.history().is_empty());
    assert!(tracker.start_button_visible());
    assert!(!tracker.stop_button_visible());
    assert!(!tracker.clear_button_visible());
    assert!(tracker.consume_notification());

    // Nothing left to stop.
    assert!(tracker.stop_tracking().await.unwrap().is_none());
}

#[tokio::test]
async fn test_stop_applies_even_if_history_reload_fails() {
    let store = Arc::new(FlakyStore::default());
    let clock = Arc::new(ManualClock::new(1_000));
    let tracker = SleepTracker::with_clock(store.clone(), clock.clone())
        .await
        .unwrap();
    let id = tracker.start_tracking().await.unwrap();

    store.fail_list(true);
    clock.set(2_000);
    assert!(tracker.stop_tracking().await.is_err());

    assert!(tracker.tonight().is_none());
    assert!(tracker.start_button_visible());
    assert_eq!(tracker.history()[0].end_time_ms, 2_000);

    let signal = tracker.consume_navigation().unwrap();
    assert_eq!(signal.id, id);
    assert_eq!(signal.end_time_ms, 2_000);

    // A second stop must not rewrite the stored end time.
    clock.set(3_000);
    let writes = store.writes();
    assert!(tracker.stop_tracking().await.unwrap().is_none());
    assert_eq!(store.writes(), writes);
    assert_eq!(store.inner.get(id).await.unwrap().unwrap().end_time_ms, 2_000);
}

#[tokio::test]
async fn test_initialize_error_propagates() {
    let store = Arc::new(FlakyStore::default());
    store.fail_reads(true);

    let result = SleepTracker::new(store).await;
    assert!(matches!(result, Err(TrackerError::LockPoisoned)));
}

#[tokio::test]
async fn test_initialize_recovers_after_partial_write() {
    let store = Arc::new(FlakyStore::default());
    let tracker = SleepTracker::with_clock(store.clone(), Arc::new(ManualClock::new(1_000)))
        .await
        .unwrap();

    // The insert lands but the follow-up query fails.
    store.fail_reads(true);
    let result = tracker.start_tracking().await;
    assert!(result.is_err());
    assert!(tracker.tonight().is_none());

    store.fail_reads(false);
    tracker.initialize().await.unwrap();
    assert_eq!(tracker.state(), TrackingState::Tracking);
    assert_eq!(tracker.history().len(), 1);
}

// ============================================================================
// Observers
// ============================================================================

#[tokio::test]
async fn test_observer_sees_navigation_then_clear() {
    let (tracker, _, clock) = memory_tracker(1_000).await;
    let mut navigation = tracker.subscribe_navigation();
    let mut tonight = tracker.subscribe_tonight();

    tracker.start_tracking().await.unwrap();
    tonight.changed().await.unwrap();
    assert!(tonight.borrow_and_update().is_some());

    clock.advance(8 * 3_600_000);
    tracker.stop_tracking().await.unwrap();

    navigation.changed().await.unwrap();
    let target = navigation.borrow_and_update().clone().unwrap();
    assert_eq!(target.end_time_ms - target.start_time_ms, 8 * 3_600_000);

    tracker.consume_navigation();
    navigation.changed().await.unwrap();
    assert!(navigation.borrow_and_update().is_none());
}

#[tokio::test]
async fn test_history_subscriber_refreshes_on_rating() {
    let (tracker, _, clock) = memory_tracker(1_000).await;
    let id = tracker.start_tracking().await.unwrap();
    clock.advance(1_000);
    tracker.stop_tracking().await.unwrap();

    let mut history = tracker.subscribe_history();
    tracker.set_quality(id, SleepQuality::SoSo).await.unwrap();

    history.changed().await.unwrap();
    assert_eq!(history.borrow_and_update()[0].quality, SleepQuality::SoSo);
}

#[tokio::test]
async fn test_concurrent_operations_are_serialized() {
    let (tracker, store, _) = memory_tracker(1_000).await;
    let tracker = Arc::new(tracker);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let tracker = Arc::clone(&tracker);
        handles.push(tokio::spawn(async move {
            tracker.start_tracking().await.unwrap();
            tracker.stop_tracking().await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_tonight_invariant(&tracker);
    let tonight_id = tracker.tonight().map(|s| s.id);
    let latest = store.most_recent().await.unwrap().unwrap();
    if let Some(id) = tonight_id {
        assert_eq!(id, latest.id);
    }
    assert_eq!(tracker.history().len(), store.count());
}

// ============================================================================
// SQLite backend
// ============================================================================

#[tokio::test]
async fn test_sqlite_tracking_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sleep.db");
    let clock = Arc::new(ManualClock::new(1_000));

    let id = {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let tracker = SleepTracker::with_clock(store, clock.clone()).await.unwrap();
        tracker.start_tracking().await.unwrap()
    };

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let tracker = SleepTracker::with_clock(store.clone(), clock.clone())
        .await
        .unwrap();
    assert_eq!(tracker.tonight().map(|s| s.id), Some(id));
    assert!(tracker.stop_button_visible());

    clock.set(2_000);
    tracker.stop_tracking().await.unwrap();
    tracker
        .set_quality(id, SleepQuality::PrettyGood)
        .await
        .unwrap();

    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.end_time_ms, 2_000);
    assert_eq!(stored.quality, SleepQuality::PrettyGood);
}

#[tokio::test]
async fn test_sqlite_clear_and_summary() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let clock = Arc::new(ManualClock::new(0));
    let tracker = SleepTracker::with_clock(store, clock.clone()).await.unwrap();

    tracker.start_tracking().await.unwrap();
    clock.set(6 * 3_600_000);
    tracker.stop_tracking().await.unwrap();

    let utc = chrono::FixedOffset::east_opt(0).unwrap();
    let summary = tracker.history_summary(&utc);
    assert!(summary.contains("Hours:Minutes:Seconds: 6:00:00"));

    tracker.clear_history().await.unwrap();
    assert!(tracker.consume_notification());
    assert!(tracker
        .history_summary(&utc)
        .contains("No sleep recorded yet."));
}

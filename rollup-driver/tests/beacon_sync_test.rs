//! Beacon sync tracking against a scripted execution engine.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use rollup_driver::test_utils::MockExecutionEngine;
use rollup_driver::{SyncProgress, SyncProgressTracker, SYNC_PROGRESS_CHECK_INTERVAL};
use rollup_primitives::test_utils::random_hash;

const TIMEOUT: Duration = Duration::from_secs(30);

fn syncing(current_block: u64) -> SyncProgress {
    SyncProgress {
        starting_block: 0,
        current_block,
        highest_block: 4_096,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_stall_after_progress_and_rearm() {
    let engine = Arc::new(MockExecutionEngine::new());
    engine.set_progress(Some(syncing(100)));
    engine.set_auto_progress(true);

    let tracker = Arc::new(SyncProgressTracker::new(engine.clone(), TIMEOUT));
    tracker.update_meta(1, 4_096, random_hash());

    let token = CancellationToken::new();
    let handle = tokio::spawn({
        let tracker = tracker.clone();
        let token = token.clone();
        async move { tracker.track(token).await }
    });

    // Progress on every tick up to 50s
    time::sleep(Duration::from_secs(55)).await;
    assert!(!tracker.triggered());
    engine.set_auto_progress(false);
    // Freeze the engine before querying it, every query advances a progressing mock
    assert!(tracker.out_of_sync().await.unwrap());

    // Last progress at 50s; 80s is exactly at the timeout, 90s is past it
    time::sleep(Duration::from_secs(30)).await;
    assert!(!tracker.triggered());
    time::sleep(Duration::from_secs(10)).await;
    assert!(tracker.triggered());
    assert!(!tracker.head_changed(4_096));
    assert!(tracker.head_changed(4_097));

    // A new verified head re-arms the tracker with a fresh clock
    let calls = engine.sync_progress_calls();
    tracker.clear_meta();
    tracker.update_meta(2, 8_192, random_hash());
    assert!(!tracker.triggered());
    assert_eq!(tracker.last_synced_verified_block_id(), Some(2));

    time::sleep(SYNC_PROGRESS_CHECK_INTERVAL * 3).await;
    assert!(!tracker.triggered());
    assert!(engine.sync_progress_calls() > calls);

    time::sleep(SYNC_PROGRESS_CHECK_INTERVAL).await;
    assert!(tracker.triggered());

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_engine_reaching_verified_height() {
    let engine = Arc::new(MockExecutionEngine::new());
    engine.set_progress(Some(syncing(100)));

    let tracker = Arc::new(SyncProgressTracker::new(engine.clone(), TIMEOUT));
    tracker.update_meta(7, 4_096, random_hash());

    let token = CancellationToken::new();
    let handle = tokio::spawn({
        let tracker = tracker.clone();
        let token = token.clone();
        async move { tracker.track(token).await }
    });

    time::sleep(Duration::from_secs(15)).await;

    // Engine finishes: no longer syncing, head at the verified height
    engine.set_progress(None);
    engine.set_head(4_096);

    time::sleep(Duration::from_secs(120)).await;
    assert!(!tracker.triggered());
    assert!(!tracker.out_of_sync().await.unwrap());
    assert!(engine.block_number_calls() > 0);

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_tracking() {
    let engine = Arc::new(MockExecutionEngine::new());
    let tracker = Arc::new(SyncProgressTracker::new(engine.clone(), TIMEOUT));
    tracker.update_meta(1, 16, random_hash());

    let token = CancellationToken::new();
    let handle = tokio::spawn({
        let tracker = tracker.clone();
        let token = token.clone();
        async move { tracker.track(token).await }
    });

    time::sleep(Duration::from_secs(25)).await;
    token.cancel();
    handle.await.unwrap();

    let calls = engine.sync_progress_calls();
    assert_eq!(calls, 2);
    time::sleep(Duration::from_secs(60)).await;
    assert_eq!(engine.sync_progress_calls(), calls);
}

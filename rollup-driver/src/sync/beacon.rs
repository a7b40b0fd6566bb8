//! Beacon-sync progress tracking.
//!
//! While the execution engine catches up to a verified head through its own
//! state sync, [`SyncProgressTracker`] polls the engine's progress and flags the
//! sync as stalled once nothing has moved for longer than the configured timeout.
//! The chain syncer reads that flag to decide whether to keep waiting or to fall
//! back to inserting blocks one by one.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use rollup_primitives::B256;

use crate::error::SyncResult;
use crate::rpc::ExecutionEngine;
use crate::types::{sync_progressed, SyncProgress};

/// How often the engine's sync progress is polled.
pub const SYNC_PROGRESS_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Verified head the tracker was armed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VerifiedHead {
    id: u64,
    height: u64,
    hash: B256,
}

#[derive(Debug)]
struct TrackerState {
    triggered: bool,
    last_synced_verified_head: Option<VerifiedHead>,
    last_progressed_at: Instant,
}

/// Monitors engine-driven sync and signals when it stalls.
pub struct SyncProgressTracker<E> {
    engine: E,
    timeout: Duration,
    state: Mutex<TrackerState>,
}

impl<E: ExecutionEngine> SyncProgressTracker<E> {
    pub fn new(engine: E, timeout: Duration) -> Self {
        Self {
            engine,
            timeout,
            state: Mutex::new(TrackerState {
                triggered: false,
                last_synced_verified_head: None,
                last_progressed_at: Instant::now(),
            }),
        }
    }

    /// Stall duration after which the tracker triggers.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // Critical sections never panic, recover the state if a reader did.
    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Poll the engine every [`SYNC_PROGRESS_CHECK_INTERVAL`] until `shutdown_token` is cancelled.
    pub async fn track(&self, shutdown_token: CancellationToken) {
        let mut ticker = time::interval_at(
            Instant::now() + SYNC_PROGRESS_CHECK_INTERVAL,
            SYNC_PROGRESS_CHECK_INTERVAL,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last_progress: Option<SyncProgress> = None;

        tracing::debug!("Beacon sync progress tracker started (timeout {:?})", self.timeout);

        loop {
            tokio::select! {
                _ = shutdown_token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if self.triggered() {
                tracing::debug!("Beacon sync already triggered, skipping progress check");
                continue;
            }

            let progress = tokio::select! {
                _ = shutdown_token.cancelled() => break,
                result = self.engine.sync_progress() => result,
            };

            let progress = match progress {
                Ok(progress) => progress,
                Err(e) => {
                    tracing::warn!("Failed to get engine sync progress: {}", e);
                    continue;
                }
            };

            if progress.is_none() {
                if let Some(target) = self.last_synced_verified_block_height() {
                    let head = tokio::select! {
                        _ = shutdown_token.cancelled() => break,
                        result = self.engine.block_number() => result,
                    };

                    match head {
                        Ok(head) if head >= target => {
                            tracing::info!(
                                "Execution engine finished syncing to verified height {} (head {})",
                                target,
                                head
                            );
                            self.state().last_progressed_at = Instant::now();
                            last_progress = None;
                            continue;
                        }
                        Ok(head) => {
                            tracing::debug!(
                                "Execution engine idle at {} below verified height {}",
                                head,
                                target
                            );
                        }
                        Err(e) => {
                            tracing::warn!("Failed to get engine head: {}", e);
                            continue;
                        }
                    }
                }
            }

            let progressed = sync_progressed(last_progress.as_ref(), progress.as_ref());
            last_progress = progress;

            let mut state = self.state();
            if progressed {
                tracing::debug!("Beacon sync progressed: {:?}", last_progress);
                state.last_progressed_at = Instant::now();
                continue;
            }

            let Some(head) = state.last_synced_verified_head else {
                continue;
            };

            let stalled_for = state.last_progressed_at.elapsed();
            if !state.triggered && stalled_for > self.timeout {
                tracing::warn!(
                    "Beacon sync made no progress for {:?}, giving up on verified block {} (height {}, hash {})",
                    stalled_for,
                    head.id,
                    head.height,
                    head.hash
                );
                state.triggered = true;
            }
        }

        tracing::debug!("Beacon sync progress tracker stopped");
    }

    /// Record the latest verified head, arming the tracker if it was not armed yet.
    pub fn update_meta(&self, id: u64, height: u64, hash: B256) {
        let mut state = self.state();
        if state.last_synced_verified_head.is_none() {
            state.last_progressed_at = Instant::now();
        }
        state.last_synced_verified_head = Some(VerifiedHead {
            id,
            height,
            hash,
        });
    }

    /// Reset the trigger and forget the verified head.
    pub fn clear_meta(&self) {
        let mut state = self.state();
        state.triggered = false;
        state.last_synced_verified_head = None;
    }

    /// Whether beacon sync should be (re-)attempted towards `height`.
    ///
    /// Always true before the tracker has triggered. Once triggered, true only when
    /// a different verified height is on record.
    pub fn head_changed(&self, height: u64) -> bool {
        let state = self.state();
        if !state.triggered {
            return true;
        }

        state.last_synced_verified_head.is_some_and(|head| head.height != height)
    }

    /// Whether the engine is currently in the middle of a sync.
    pub async fn out_of_sync(&self) -> SyncResult<bool> {
        let progress = self.engine.sync_progress().await?;
        Ok(progress.is_some_and(|progress| !progress.is_empty()))
    }

    pub fn triggered(&self) -> bool {
        self.state().triggered
    }

    pub fn last_synced_verified_block_id(&self) -> Option<u64> {
        self.state().last_synced_verified_head.map(|head| head.id)
    }

    pub fn last_synced_verified_block_height(&self) -> Option<u64> {
        self.state().last_synced_verified_head.map(|head| head.height)
    }

    /// Hash of the armed verified head, all-zero when unset.
    pub fn last_synced_verified_block_hash(&self) -> B256 {
        self.state().last_synced_verified_head.map(|head| head.hash).unwrap_or_default()
    }
}

impl<E> std::fmt::Debug for SyncProgressTracker<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("SyncProgressTracker")
            .field("timeout", &self.timeout)
            .field("triggered", &state.triggered)
            .field("last_synced_verified_head", &state.last_synced_verified_head)
            .finish()
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{RpcError, RpcResult};
use crate::rpc::ExecutionEngine;
use crate::types::SyncProgress;

#[derive(Debug, Default)]
struct EngineState {
    progress: Option<SyncProgress>,
    head: u64,
    failing: bool,
    auto_progress: bool,
}

/// Scriptable execution engine.
#[derive(Debug, Default)]
pub struct MockExecutionEngine {
    state: Mutex<EngineState>,
    sync_progress_calls: AtomicUsize,
    block_number_calls: AtomicUsize,
}

impl MockExecutionEngine {
    /// An idle engine at head 0.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_progress(&self, progress: Option<SyncProgress>) {
        self.state.lock().unwrap().progress = progress;
    }

    pub fn set_head(&self, head: u64) {
        self.state.lock().unwrap().head = head;
    }

    /// Make every call fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    /// Bump `current_block` on every progress query.
    pub fn set_auto_progress(&self, enabled: bool) {
        self.state.lock().unwrap().auto_progress = enabled;
    }

    pub fn sync_progress_calls(&self) -> usize {
        self.sync_progress_calls.load(Ordering::SeqCst)
    }

    pub fn block_number_calls(&self) -> usize {
        self.block_number_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionEngine for MockExecutionEngine {
    async fn sync_progress(&self) -> RpcResult<Option<SyncProgress>> {
        self.sync_progress_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(RpcError::Transport("mock engine unreachable".to_string()));
        }
        if state.auto_progress {
            if let Some(progress) = state.progress.as_mut() {
                progress.current_block += 1;
            }
        }
        Ok(state.progress)
    }

    async fn block_number(&self) -> RpcResult<u64> {
        self.block_number_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if state.failing {
            return Err(RpcError::Transport("mock engine unreachable".to_string()));
        }
        Ok(state.head)
    }
}

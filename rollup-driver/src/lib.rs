//! Rollup driver components.
//!
//! - [`SyncProgressTracker`] watches the execution engine during beacon sync and
//!   flags a stall once no progress was made for longer than the configured timeout
//! - [`AnchorTxValidator`] checks that the first transaction of a block is a
//!   well-formed anchor transaction and that it executed successfully
//!
//! Both talk to the L2 node through the [`ExecutionEngine`] and [`ChainClient`]
//! traits; [`HttpRpcClient`] implements them over JSON-RPC.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use rollup_driver::{HttpRpcClient, SyncProgressTracker};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(HttpRpcClient::new("http://127.0.0.1:8545", Duration::from_secs(30))?);
//! let tracker = Arc::new(SyncProgressTracker::new(client, Duration::from_secs(120)));
//!
//! let token = CancellationToken::new();
//! let handle = tokio::spawn({
//!     let tracker = tracker.clone();
//!     let token = token.clone();
//!     async move { tracker.track(token).await }
//! });
//!
//! tracker.update_meta(1, 1024, Default::default());
//! // ...
//! token.cancel();
//! handle.await?;
//! # Ok(())
//! # }
//! ```

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub mod config;
pub mod error;
pub mod logging;
pub mod rpc;
pub mod sync;
pub mod types;
pub mod validation;

pub use config::DriverConfig;
pub use error::{
    AnchorTxError, AnchorTxResult, DriverError, LoggingError, LoggingResult, Result, RpcError,
    RpcResult, SyncError, SyncResult,
};
pub use logging::{init_logging, LogFileConfig, LoggingConfig, LoggingGuard};
pub use rpc::{ChainClient, ExecutionEngine, HttpRpcClient};
pub use sync::{SyncProgressTracker, SYNC_PROGRESS_CHECK_INTERVAL};
pub use tracing::level_filters::LevelFilter;
pub use types::{sync_progressed, SyncProgress};
pub use validation::{AnchorTxValidator, ANCHOR_METHOD_SIGNATURE};

pub use rollup_primitives::{Address, Receipt, Transaction, B256};

/// Current version of the rollup-driver library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

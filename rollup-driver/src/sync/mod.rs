//! Chain synchronization support.
//!
//! The chain syncer itself lives outside this crate; [`beacon`] provides the
//! stall detector it consults while the execution engine syncs on its own.

pub mod beacon;

pub use beacon::{SyncProgressTracker, SYNC_PROGRESS_CHECK_INTERVAL};
pub use crate::types::sync_progressed;

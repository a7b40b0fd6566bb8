//! Common type definitions for the rollup driver.

use serde::{Deserialize, Serialize};

use rollup_primitives::serde_utils::quantity;

/// Execution engine sync progress, as reported by `eth_syncing`.
///
/// Only the fourteen counters take part in [`sync_progressed`]; `starting_block`,
/// `highest_block` and `known_states` are informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncProgress {
    #[serde(with = "quantity")]
    pub starting_block: u64,
    #[serde(with = "quantity")]
    pub current_block: u64,
    #[serde(with = "quantity")]
    pub highest_block: u64,

    // Fast sync
    #[serde(with = "quantity")]
    pub pulled_states: u64,
    #[serde(with = "quantity")]
    pub known_states: u64,

    // Snap sync
    #[serde(with = "quantity")]
    pub synced_accounts: u64,
    #[serde(with = "quantity")]
    pub synced_account_bytes: u64,
    #[serde(with = "quantity")]
    pub synced_bytecodes: u64,
    #[serde(with = "quantity")]
    pub synced_bytecode_bytes: u64,
    #[serde(with = "quantity")]
    pub synced_storage: u64,
    #[serde(with = "quantity")]
    pub synced_storage_bytes: u64,

    // State healing
    #[serde(with = "quantity")]
    pub healed_trienodes: u64,
    #[serde(with = "quantity")]
    pub healed_trienode_bytes: u64,
    #[serde(with = "quantity")]
    pub healed_bytecodes: u64,
    #[serde(with = "quantity")]
    pub healed_bytecode_bytes: u64,
    #[serde(with = "quantity")]
    pub healing_trienodes: u64,
    #[serde(with = "quantity")]
    pub healing_bytecode: u64,
}

impl SyncProgress {
    /// The counters compared by [`sync_progressed`], in a fixed order.
    pub fn counters(&self) -> [u64; 14] {
        [
            self.current_block,
            self.pulled_states,
            self.synced_accounts,
            self.synced_account_bytes,
            self.synced_bytecodes,
            self.synced_bytecode_bytes,
            self.synced_storage,
            self.synced_storage_bytes,
            self.healed_trienodes,
            self.healed_trienode_bytes,
            self.healed_bytecodes,
            self.healed_bytecode_bytes,
            self.healing_trienodes,
            self.healing_bytecode,
        ]
    }

    /// True when every field, informational ones included, is zero.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Whether the engine made progress between two snapshots.
///
/// False when either snapshot is missing. Otherwise true iff at least one counter
/// is strictly greater in `new`; a counter going backwards is not progress.
pub fn sync_progressed(old: Option<&SyncProgress>, new: Option<&SyncProgress>) -> bool {
    let (Some(old), Some(new)) = (old, new) else {
        return false;
    };

    old.counters().iter().zip(new.counters().iter()).any(|(before, after)| after > before)
}

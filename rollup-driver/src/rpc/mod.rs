//! Collaborators reached over JSON-RPC.

mod http;

use std::sync::Arc;

use async_trait::async_trait;

use rollup_primitives::{Address, Receipt, Transaction, B256};

use crate::error::RpcResult;
use crate::types::SyncProgress;

pub use http::HttpRpcClient;

/// Execution engine surface used by the beacon-sync tracker.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Current sync progress; `None` when the engine is not syncing.
    async fn sync_progress(&self) -> RpcResult<Option<SyncProgress>>;

    /// Height of the engine's canonical head.
    async fn block_number(&self) -> RpcResult<u64>;
}

/// Chain client surface used by the anchor transaction validator.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> RpcResult<u64>;

    /// Receipt of a transaction; `None` when the transaction is unknown or still pending.
    async fn transaction_receipt(&self, tx_hash: B256) -> RpcResult<Option<Receipt>>;

    /// Reserved anchor signer, read from `GOLDEN_TOUCH_ADDRESS()` on the system contract.
    async fn golden_touch_address(&self, system_contract: Address) -> RpcResult<Address>;

    async fn transaction_by_block_number_and_index(
        &self,
        block_number: u64,
        index: u64,
    ) -> RpcResult<Option<Transaction>>;
}

#[async_trait]
impl<T: ExecutionEngine + ?Sized> ExecutionEngine for Arc<T> {
    async fn sync_progress(&self) -> RpcResult<Option<SyncProgress>> {
        (**self).sync_progress().await
    }

    async fn block_number(&self) -> RpcResult<u64> {
        (**self).block_number().await
    }
}

#[async_trait]
impl<T: ChainClient + ?Sized> ChainClient for Arc<T> {
    async fn chain_id(&self) -> RpcResult<u64> {
        (**self).chain_id().await
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> RpcResult<Option<Receipt>> {
        (**self).transaction_receipt(tx_hash).await
    }

    async fn golden_touch_address(&self, system_contract: Address) -> RpcResult<Address> {
        (**self).golden_touch_address(system_contract).await
    }

    async fn transaction_by_block_number_and_index(
        &self,
        block_number: u64,
        index: u64,
    ) -> RpcResult<Option<Transaction>> {
        (**self).transaction_by_block_number_and_index(block_number, index).await
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use rollup_primitives::{Address, Receipt, Transaction, B256};

use super::golden_touch_address;
use crate::error::{RpcError, RpcResult};
use crate::rpc::ChainClient;

/// In-memory chain client.
#[derive(Debug)]
pub struct MockChainClient {
    chain_id: u64,
    golden_touch_address: Option<Address>,
    receipts: Mutex<HashMap<B256, Receipt>>,
    transactions: Mutex<HashMap<(u64, u64), Transaction>>,
    failing: AtomicBool,
    golden_touch_calls: AtomicUsize,
}

impl MockChainClient {
    /// A client whose system contract reports the well-known golden touch address.
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            golden_touch_address: Some(golden_touch_address()),
            receipts: Mutex::new(HashMap::new()),
            transactions: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
            golden_touch_calls: AtomicUsize::new(0),
        }
    }

    /// Make `GOLDEN_TOUCH_ADDRESS()` lookups fail.
    pub fn without_golden_touch_address(mut self) -> Self {
        self.golden_touch_address = None;
        self
    }

    pub fn insert_receipt(&self, receipt: Receipt) {
        self.insert_receipt_for(receipt.transaction_hash, receipt);
    }

    /// Serve `receipt` for `tx_hash`, whatever hash the receipt itself carries.
    pub fn insert_receipt_for(&self, tx_hash: B256, receipt: Receipt) {
        self.receipts.lock().unwrap().insert(tx_hash, receipt);
    }

    pub fn insert_transaction(&self, block_number: u64, index: u64, tx: Transaction) {
        self.transactions.lock().unwrap().insert((block_number, index), tx);
    }

    /// Make receipt and transaction lookups fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn golden_touch_calls(&self) -> usize {
        self.golden_touch_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> RpcResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RpcError::Transport("mock chain client unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn chain_id(&self) -> RpcResult<u64> {
        self.check_available()?;
        Ok(self.chain_id)
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> RpcResult<Option<Receipt>> {
        self.check_available()?;
        Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn golden_touch_address(&self, system_contract: Address) -> RpcResult<Address> {
        self.golden_touch_calls.fetch_add(1, Ordering::SeqCst);
        self.golden_touch_address.ok_or_else(|| RpcError::Rpc {
            code: -32000,
            message: format!("execution reverted: no GOLDEN_TOUCH_ADDRESS on {}", system_contract),
        })
    }

    async fn transaction_by_block_number_and_index(
        &self,
        block_number: u64,
        index: u64,
    ) -> RpcResult<Option<Transaction>> {
        self.check_available()?;
        Ok(self.transactions.lock().unwrap().get(&(block_number, index)).cloned())
    }
}

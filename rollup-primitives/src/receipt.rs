//! Transaction receipts as returned by `eth_getTransactionReceipt`.

use serde::{Deserialize, Serialize};

use crate::hash_types::{Address, B256};
use crate::serde_utils::{hex_bytes, opt_quantity, quantity};

/// Receipt status of a successful execution.
pub const RECEIPT_STATUS_SUCCESSFUL: u64 = 1;
/// Receipt status of a reverted execution.
pub const RECEIPT_STATUS_FAILED: u64 = 0;

/// An event emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    #[serde(default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub log_index: Option<u64>,
    #[serde(default)]
    pub removed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: B256,
    #[serde(with = "quantity")]
    pub transaction_index: u64,
    pub block_hash: B256,
    #[serde(with = "quantity")]
    pub block_number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(with = "quantity")]
    pub cumulative_gas_used: u64,
    #[serde(with = "quantity")]
    pub gas_used: u64,
    #[serde(default)]
    pub contract_address: Option<Address>,
    pub logs: Vec<Log>,
    /// Post-Byzantium status code; pre-Byzantium receipts carry a state root instead.
    #[serde(default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub status: Option<u64>,
    #[serde(rename = "type", default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<u8>,
}

impl Receipt {
    pub fn is_successful(&self) -> bool {
        self.status == Some(RECEIPT_STATUS_SUCCESSFUL)
    }
}

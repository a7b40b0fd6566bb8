use serde::{Deserialize, Serialize};

use super::{
    AccessList, AccessListTx, DynamicFeeTx, LegacyTx, Signature, Transaction, TypedTransaction,
    ACCESS_LIST_TX_TYPE, DYNAMIC_FEE_TX_TYPE,
};
use crate::error::DecodeError;
use crate::hash_types::{Address, B256};
use crate::serde_utils::{hex_bytes, opt_quantity, quantity, word_quantity};

/// Transaction object as returned by `eth_getTransactionBy*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    #[serde(rename = "type", default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<u64>,
    pub hash: B256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    #[serde(default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub transaction_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(with = "quantity")]
    pub nonce: u64,
    #[serde(default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
    #[serde(default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<u128>,
    #[serde(default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<u128>,
    #[serde(with = "quantity")]
    pub gas: u64,
    pub to: Option<Address>,
    #[serde(with = "quantity")]
    pub value: u128,
    #[serde(with = "hex_bytes")]
    pub input: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_list: Option<AccessList>,
    #[serde(with = "quantity")]
    pub v: u64,
    #[serde(with = "word_quantity")]
    pub r: B256,
    #[serde(with = "word_quantity")]
    pub s: B256,
}

impl TryFrom<RpcTransaction> for Transaction {
    type Error = DecodeError;

    fn try_from(rpc: RpcTransaction) -> Result<Self, Self::Error> {
        let signature = Signature {
            v: rpc.v,
            r: rpc.r,
            s: rpc.s,
        };

        let tx = match rpc.tx_type.unwrap_or_default() {
            0 => TypedTransaction::Legacy(LegacyTx {
                nonce: rpc.nonce,
                gas_price: rpc.gas_price.ok_or(DecodeError::MissingField("gasPrice"))?,
                gas: rpc.gas,
                to: rpc.to,
                value: rpc.value,
                input: rpc.input,
            }),
            t if t == u64::from(ACCESS_LIST_TX_TYPE) => TypedTransaction::AccessList(AccessListTx {
                chain_id: rpc.chain_id.ok_or(DecodeError::MissingField("chainId"))?,
                nonce: rpc.nonce,
                gas_price: rpc.gas_price.ok_or(DecodeError::MissingField("gasPrice"))?,
                gas: rpc.gas,
                to: rpc.to,
                value: rpc.value,
                input: rpc.input,
                access_list: rpc.access_list.unwrap_or_default(),
            }),
            t if t == u64::from(DYNAMIC_FEE_TX_TYPE) => TypedTransaction::DynamicFee(DynamicFeeTx {
                chain_id: rpc.chain_id.ok_or(DecodeError::MissingField("chainId"))?,
                nonce: rpc.nonce,
                max_priority_fee_per_gas: rpc
                    .max_priority_fee_per_gas
                    .ok_or(DecodeError::MissingField("maxPriorityFeePerGas"))?,
                max_fee_per_gas: rpc
                    .max_fee_per_gas
                    .ok_or(DecodeError::MissingField("maxFeePerGas"))?,
                gas: rpc.gas,
                to: rpc.to,
                value: rpc.value,
                input: rpc.input,
                access_list: rpc.access_list.unwrap_or_default(),
            }),
            other => return Err(DecodeError::UnsupportedType(other)),
        };

        Ok(Transaction::new(tx, signature))
    }
}

//! JSON-RPC 2.0 over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use rollup_primitives::serde_utils::parse_quantity;
use rollup_primitives::{selector, Address, Receipt, RpcTransaction, Transaction, B256};

use super::{ChainClient, ExecutionEngine};
use crate::error::{RpcError, RpcResult};
use crate::types::SyncProgress;

/// View function on the system contract returning the reserved anchor signer.
const GOLDEN_TOUCH_ADDRESS_SIGNATURE: &str = "GOLDEN_TOUCH_ADDRESS()";

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

/// Client for an L2 node's HTTP JSON-RPC endpoint.
///
/// Serves both as the [`ExecutionEngine`] polled by the sync tracker and as the
/// [`ChainClient`] used for anchor validation.
#[derive(Debug)]
pub struct HttpRpcClient {
    client: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    /// Create a client; every request is bounded by `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> RpcResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue a single JSON-RPC call and decode its `result`.
    pub async fn request<R: DeserializeOwned>(&self, method: &str, params: Value) -> RpcResult<R> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::trace!("-> {} (id {})", method, id);
        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::HttpStatus(status.as_u16()));
        }

        let response: JsonRpcResponse = response.json().await?;
        decode_response(response)
    }
}

fn decode_response<R: DeserializeOwned>(response: JsonRpcResponse) -> RpcResult<R> {
    if let Some(error) = response.error {
        return Err(RpcError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    Ok(serde_json::from_value(response.result.unwrap_or(Value::Null))?)
}

/// `eth_syncing` answers `false` when idle and a progress object otherwise.
fn decode_sync_status(value: Value) -> RpcResult<Option<SyncProgress>> {
    match value {
        Value::Bool(false) | Value::Null => Ok(None),
        Value::Bool(true) => Err(RpcError::Decode("eth_syncing returned true".to_string())),
        object => Ok(Some(serde_json::from_value(object)?)),
    }
}

/// An ABI-encoded `address` return value occupies one 32-byte word.
fn decode_address_return(data: &[u8]) -> RpcResult<Address> {
    let word = data
        .get(..B256::LEN)
        .ok_or_else(|| RpcError::Decode(format!("short address return data: {} bytes", data.len())))?;
    let word = B256::from_slice(word).map_err(|e| RpcError::Decode(e.to_string()))?;
    Ok(Address::from_word(&word))
}

fn decode_hex_data(s: &str) -> RpcResult<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| RpcError::Decode(e.to_string()))
}

#[async_trait]
impl ExecutionEngine for HttpRpcClient {
    async fn sync_progress(&self) -> RpcResult<Option<SyncProgress>> {
        let value: Value = self.request("eth_syncing", json!([])).await?;
        decode_sync_status(value)
    }

    async fn block_number(&self) -> RpcResult<u64> {
        let number: String = self.request("eth_blockNumber", json!([])).await?;
        let number = parse_quantity(&number).map_err(RpcError::Decode)?;
        u64::try_from(number).map_err(|e| RpcError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChainClient for HttpRpcClient {
    async fn chain_id(&self) -> RpcResult<u64> {
        let chain_id: String = self.request("eth_chainId", json!([])).await?;
        let chain_id = parse_quantity(&chain_id).map_err(RpcError::Decode)?;
        u64::try_from(chain_id).map_err(|e| RpcError::Decode(e.to_string()))
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> RpcResult<Option<Receipt>> {
        self.request("eth_getTransactionReceipt", json!([tx_hash])).await
    }

    async fn golden_touch_address(&self, system_contract: Address) -> RpcResult<Address> {
        let call = json!({
            "to": system_contract,
            "data": format!("0x{}", hex::encode(selector(GOLDEN_TOUCH_ADDRESS_SIGNATURE))),
        });
        let data: String = self.request("eth_call", json!([call, "latest"])).await?;
        decode_address_return(&decode_hex_data(&data)?)
    }

    async fn transaction_by_block_number_and_index(
        &self,
        block_number: u64,
        index: u64,
    ) -> RpcResult<Option<Transaction>> {
        let tx: Option<RpcTransaction> = self
            .request(
                "eth_getTransactionByBlockNumberAndIndex",
                json!([format!("{:#x}", block_number), format!("{:#x}", index)]),
            )
            .await?;

        tx.map(|tx| Transaction::try_from(tx).map_err(|e| RpcError::Decode(e.to_string())))
            .transpose()
    }
}

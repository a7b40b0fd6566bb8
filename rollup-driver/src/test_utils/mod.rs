//! Mock collaborators and fixtures for tests.

mod chain;
mod engine;

pub use chain::MockChainClient;
pub use engine::MockExecutionEngine;

use rollup_primitives::secp256k1::{PublicKey, Secp256k1, SecretKey};
use rollup_primitives::{
    public_key_to_address, Address, DynamicFeeTx, Log, Receipt, Signer, Transaction,
    TypedTransaction, B256,
};

/// Chain id used by the fixtures.
pub const TEST_CHAIN_ID: u64 = 167;

/// Well-known golden touch private key of the protocol's system contract.
pub const GOLDEN_TOUCH_PRIVATE_KEY: &str =
    "92954368afd3caa1f3ce3ead0069c1af414054aefe1ef9aeacc1bf426222ce38";

pub fn golden_touch_key() -> SecretKey {
    let bytes = hex::decode(GOLDEN_TOUCH_PRIVATE_KEY).expect("golden touch key is hex");
    SecretKey::from_slice(&bytes).expect("golden touch key is a valid secret key")
}

/// Address of [`golden_touch_key`].
pub fn golden_touch_address() -> Address {
    let secp = Secp256k1::signing_only();
    public_key_to_address(&PublicKey::from_secret_key(&secp, &golden_touch_key()))
}

/// A signed EIP-1559 transaction calling `to` with `input`.
pub fn anchor_tx(key: &SecretKey, chain_id: u64, to: Address, input: Vec<u8>) -> Transaction {
    let body = TypedTransaction::DynamicFee(DynamicFeeTx {
        chain_id,
        nonce: 0,
        max_priority_fee_per_gas: 1,
        max_fee_per_gas: 1,
        gas: 250_000,
        to: Some(to),
        value: 0,
        input,
        access_list: vec![],
    });
    Signer::new(chain_id).sign(body, key).expect("fixture transaction signs")
}

/// A successful receipt for `tx` included in `block_number`, with one event.
pub fn anchor_receipt(tx: &Transaction, block_number: u64) -> Receipt {
    Receipt {
        transaction_hash: tx.hash(),
        transaction_index: 0,
        block_hash: B256::new([block_number as u8; 32]),
        block_number,
        to: tx.to(),
        cumulative_gas_used: 180_000,
        gas_used: 180_000,
        logs: vec![Log {
            address: tx.to().unwrap_or_default(),
            topics: vec![B256::new([0x01; 32])],
            data: vec![],
            log_index: Some(0),
            removed: false,
        }],
        status: Some(1),
        tx_type: Some(tx.tx_type()),
        ..Default::default()
    }
}

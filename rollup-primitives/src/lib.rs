//! Primitive types of the rollup chain.
//!
//! - [`Address`] and [`B256`] fixed-size byte strings with `0x` hex encoding
//! - keccak-256 hashing and Solidity method selectors
//! - legacy, EIP-2930 and EIP-1559 transactions with signing and sender recovery
//! - receipts and logs as served over JSON-RPC

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub mod error;
pub mod hash_types;
pub mod receipt;
pub mod serde_utils;
pub mod transaction;

pub use error::{DecodeError, SignatureError, SignatureResult};
pub use hash_types::{keccak256, selector, Address, ParseBytesError, B256};
pub use receipt::{Log, Receipt};
pub use transaction::{
    public_key_to_address, recover_address, AccessList, AccessListItem, AccessListTx,
    DynamicFeeTx, LegacyTx, RpcTransaction, Signature, Signer, Transaction, TypedTransaction,
};

pub use secp256k1;

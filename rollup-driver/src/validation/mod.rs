//! Validation of protocol-mandated transactions.

mod anchor_tx;

pub use anchor_tx::{AnchorTxValidator, ANCHOR_METHOD_SIGNATURE};

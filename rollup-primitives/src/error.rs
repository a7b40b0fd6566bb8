//! Error types for transaction signing and decoding.

use thiserror::Error;

/// Signature-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Invalid chain id for signer: have {got}, want {expected}")]
    InvalidChainId {
        expected: u64,
        got: u64,
    },

    #[error("Invalid transaction v, r, s values")]
    InvalidSignatureValues,

    #[error("Public key recovery failed: {0}")]
    Recovery(String),
}

/// Errors raised when turning a JSON-RPC transaction object into a [`crate::Transaction`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unsupported transaction type: {0}")]
    UnsupportedType(u64),

    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

/// Type alias for signature operation results.
pub type SignatureResult<T> = std::result::Result<T, SignatureError>;

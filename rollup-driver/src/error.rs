//! Error types for the rollup driver.

use std::io;
use thiserror::Error;

use rollup_primitives::{Address, SignatureError, B256};

/// Main error type for the rollup driver.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Anchor transaction error: {0}")]
    AnchorTx(#[from] AnchorTxError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

/// Logging-related errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory: {0}")]
    DirectoryCreation(#[from] std::io::Error),

    #[error("Subscriber initialization failed: {0}")]
    SubscriberInit(String),

    #[error("Log rotation failed: {0}")]
    RotationFailed(String),
}

/// Errors raised by JSON-RPC collaborators (execution engine, chain client).
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected HTTP status: {0}")]
    HttpStatus(u16),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RpcError::Decode(err.to_string())
        } else {
            RpcError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::Decode(err.to_string())
    }
}

/// Beacon-sync tracking errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The execution engine could not report its sync progress.
    #[error("Engine poll failed: {0}")]
    EnginePoll(#[from] RpcError),
}

impl SyncError {
    /// Returns a static string representing the error category based on the variant
    pub fn category(&self) -> &'static str {
        match self {
            SyncError::EnginePoll(_) => "engine",
        }
    }
}

/// Reasons a transaction is not an acceptable anchor transaction.
#[derive(Debug, Error)]
pub enum AnchorTxError {
    #[error("invalid anchor transaction recipient: expected {expected}, got {got:?}")]
    InvalidRecipient {
        expected: Address,
        got: Option<Address>,
    },

    #[error("invalid anchor transaction sender: failed to recover signer: {0}")]
    SenderRecovery(#[from] SignatureError),

    #[error("invalid anchor transaction sender: expected {expected}, got {got}")]
    InvalidSender {
        expected: Address,
        got: Address,
    },

    #[error("invalid anchor transaction selector: expected 0x{}, got 0x{}", hex::encode(.expected), hex::encode(.got))]
    InvalidSelector {
        expected: [u8; 4],
        got: Vec<u8>,
    },

    #[error("failed to resolve the golden touch address: {0}")]
    SignerResolution(RpcError),

    #[error("anchor transaction receipt unavailable for {tx_hash}: {source}")]
    ReceiptUnavailable {
        tx_hash: B256,
        #[source]
        source: RpcError,
    },

    #[error("anchor transaction receipt mismatch: expected {expected}, got {got}")]
    ReceiptMismatch {
        expected: B256,
        got: B256,
    },

    #[error("anchor transaction {tx_hash} failed with receipt status {status:?}")]
    ReceiptStatus {
        tx_hash: B256,
        status: Option<u64>,
    },

    #[error("anchor transaction {0} emitted no events")]
    NoEvents(B256),
}

impl AnchorTxError {
    /// Returns a static string naming the check that failed
    pub fn category(&self) -> &'static str {
        match self {
            AnchorTxError::InvalidRecipient { .. } => "recipient",
            AnchorTxError::SenderRecovery(_) | AnchorTxError::InvalidSender { .. } => "sender",
            AnchorTxError::InvalidSelector { .. } => "selector",
            AnchorTxError::SignerResolution(_) => "rpc",
            AnchorTxError::ReceiptUnavailable { .. }
            | AnchorTxError::ReceiptMismatch { .. }
            | AnchorTxError::ReceiptStatus { .. }
            | AnchorTxError::NoEvents(_) => "receipt",
        }
    }

    /// Whether the transaction itself was rejected, as opposed to a lookup failing.
    pub fn is_invalid_anchor(&self) -> bool {
        matches!(self.category(), "recipient" | "sender" | "selector")
    }
}

/// Type alias for Result with DriverError.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Type alias for JSON-RPC call results.
pub type RpcResult<T> = std::result::Result<T, RpcError>;

/// Type alias for sync operation results.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Type alias for anchor transaction validation results.
pub type AnchorTxResult<T> = std::result::Result<T, AnchorTxError>;

/// Type alias for logging operation results.
pub type LoggingResult<T> = std::result::Result<T, LoggingError>;

//! Configuration for the rollup driver.

use std::path::PathBuf;
use std::time::Duration;

use tracing::level_filters::LevelFilter;

use rollup_primitives::Address;

use crate::validation::ANCHOR_METHOD_SIGNATURE;

/// Default stall timeout for beacon sync.
pub const DEFAULT_BEACON_SYNC_TIMEOUT: Duration = Duration::from_secs(120);

/// Default bound on a single JSON-RPC call.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the rollup driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// HTTP JSON-RPC endpoint of the L2 execution engine.
    pub l2_endpoint: String,

    /// System contract every anchor transaction must call.
    pub system_contract: Address,

    /// Expected L2 chain id. Resolved with `eth_chainId` when unset.
    pub chain_id: Option<u64>,

    /// How long beacon sync may make no progress before falling back.
    pub beacon_sync_timeout: Duration,

    /// Per-request timeout of the JSON-RPC client.
    pub rpc_timeout: Duration,

    /// Solidity signature of the anchor method.
    pub anchor_method_signature: String,

    /// Known golden touch address; skips the on-chain lookup when set.
    pub golden_touch_address: Option<Address>,

    /// Log level filter. If None, falls back to `RUST_LOG` or INFO.
    pub log_level: Option<LevelFilter>,

    /// Directory for log files. Console-only logging when None.
    pub log_dir: Option<PathBuf>,

    /// Maximum number of archived log files to keep.
    pub max_log_files: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            l2_endpoint: "http://127.0.0.1:8545".to_string(),
            // L2 system contract predeploy
            system_contract: Address::new([
                0x16, 0x70, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x01, 0x00, 0x01,
            ]),
            chain_id: None,
            beacon_sync_timeout: DEFAULT_BEACON_SYNC_TIMEOUT,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
            anchor_method_signature: ANCHOR_METHOD_SIGNATURE.to_string(),
            golden_touch_address: None,
            log_level: None,
            log_dir: None,
            max_log_files: 20,
        }
    }
}

impl DriverConfig {
    /// Create a configuration for the given endpoint and system contract.
    pub fn new(l2_endpoint: impl Into<String>, system_contract: Address) -> Self {
        Self {
            l2_endpoint: l2_endpoint.into(),
            system_contract,
            ..Self::default()
        }
    }

    /// Set the expected chain id.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Set the beacon sync stall timeout.
    pub fn with_beacon_sync_timeout(mut self, timeout: Duration) -> Self {
        self.beacon_sync_timeout = timeout;
        self
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    /// Expect a different anchor method.
    pub fn with_anchor_method_signature(mut self, signature: impl Into<String>) -> Self {
        self.anchor_method_signature = signature.into();
        self
    }

    pub fn with_golden_touch_address(mut self, address: Address) -> Self {
        self.golden_touch_address = Some(address);
        self
    }

    /// Set log level.
    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Write logs to files under `dir`.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.l2_endpoint.starts_with("http://") || self.l2_endpoint.starts_with("https://"))
        {
            return Err(format!("l2_endpoint must be an http(s) URL, got {:?}", self.l2_endpoint));
        }

        if self.system_contract.is_zero() {
            return Err("system_contract must not be the zero address".to_string());
        }

        if self.chain_id == Some(0) {
            return Err("chain_id must be > 0".to_string());
        }

        if self.beacon_sync_timeout.is_zero() {
            return Err("beacon_sync_timeout must be > 0".to_string());
        }

        if self.rpc_timeout.is_zero() {
            return Err("rpc_timeout must be > 0".to_string());
        }

        let signature = &self.anchor_method_signature;
        if !(signature.contains('(') && signature.ends_with(')')) || signature.contains(' ') {
            return Err(format!(
                "anchor_method_signature must be a canonical signature like {:?}, got {:?}",
                ANCHOR_METHOD_SIGNATURE, signature
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.beacon_sync_timeout, Duration::from_secs(120));
        assert_eq!(config.rpc_timeout, Duration::from_secs(30));
        assert_eq!(config.anchor_method_signature, "anchor(bytes32,bytes32,uint64,uint32)");
        assert_eq!(
            config.system_contract.to_string(),
            "0x1670000000000000000000000000000000010001"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let contract = Address::new([0x42; 20]);
        let config = DriverConfig::new("https://rpc.example.org", contract)
            .with_chain_id(167)
            .with_beacon_sync_timeout(Duration::from_secs(30))
            .with_golden_touch_address(Address::new([0x77; 20]))
            .with_log_level(LevelFilter::DEBUG)
            .with_log_dir("/tmp/rollup-driver-logs");

        assert_eq!(config.system_contract, contract);
        assert_eq!(config.chain_id, Some(167));
        assert_eq!(config.beacon_sync_timeout, Duration::from_secs(30));
        assert_eq!(config.golden_touch_address, Some(Address::new([0x77; 20])));
        assert_eq!(config.log_level, Some(LevelFilter::DEBUG));
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/rollup-driver-logs")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = DriverConfig::default();

        let config = DriverConfig {
            l2_endpoint: "ws://127.0.0.1:8546".to_string(),
            ..base.clone()
        };
        assert!(config.validate().unwrap_err().contains("l2_endpoint"));

        let config = DriverConfig {
            system_contract: Address::ZERO,
            ..base.clone()
        };
        assert!(config.validate().unwrap_err().contains("system_contract"));

        assert!(base.clone().with_chain_id(0).validate().is_err());
        assert!(base.clone().with_beacon_sync_timeout(Duration::ZERO).validate().is_err());
        assert!(base.clone().with_rpc_timeout(Duration::ZERO).validate().is_err());
        assert!(base.with_anchor_method_signature("anchor").validate().is_err());
    }
}

//! Fixed-size byte strings used on the rollup chain.
//!
//! [`Address`] is the 20-byte account identifier and [`B256`] the 32-byte word used
//! for block hashes, transaction hashes, storage keys and signature scalars. Both
//! render as `0x`-prefixed lowercase hex and (de)serialize that way in JSON-RPC.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Errors returned when parsing a fixed-size byte string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseBytesError {
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        expected: usize,
        got: usize,
    },
}

macro_rules! fixed_bytes {
    ($(#[$doc:meta])* $name:ident, $len:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Length in bytes.
            pub const LEN: usize = $len;

            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Build from a slice that must be exactly `LEN` bytes long.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseBytesError> {
                let array: [u8; $len] =
                    bytes.try_into().map_err(|_| ParseBytesError::InvalidLength {
                        expected: $len,
                        got: bytes.len(),
                    })?;
                Ok(Self(array))
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn as_slice(&self) -> &[u8] {
                &self.0
            }

            pub fn to_byte_array(self) -> [u8; $len] {
                self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::LowerHex for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if f.alternate() {
                    f.write_str("0x")?;
                }
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:#x})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = ParseBytesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
                Self::from_slice(&hex::decode(digits)?)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(D::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// A 20-byte account address.
    Address,
    20
);

fixed_bytes!(
    /// A 32-byte word: hashes, storage keys, signature scalars.
    B256,
    32
);

impl Address {
    /// Take the low-order 20 bytes of an ABI-encoded word.
    pub fn from_word(word: &B256) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word.0[12..]);
        Self(bytes)
    }
}

/// Keccak-256 digest of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> B256 {
    let digest = Keccak256::digest(data.as_ref());
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&digest);
    B256(hash)
}

/// Four-byte method selector of a canonical Solidity signature,
/// e.g. `transfer(address,uint256)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.0[..4]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            keccak256([]).to_string(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_selector_well_known() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_parse_and_display() {
        let address: Address = "0x0000777735367b36bC9B61C50022d9D0700dB4Ec".parse().unwrap();
        assert_eq!(address.to_string(), "0x0000777735367b36bc9b61c50022d9d0700db4ec");

        // Prefix is optional
        let same: Address = "0000777735367b36bc9b61c50022d9d0700db4ec".parse().unwrap();
        assert_eq!(address, same);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let result = "0x1234".parse::<Address>();
        assert_eq!(
            result,
            Err(ParseBytesError::InvalidLength {
                expected: 20,
                got: 2
            })
        );
        assert!("0xzz".parse::<B256>().is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_hex() {
        assert_eq!(
            "0xzz".parse::<B256>(),
            Err(ParseBytesError::InvalidHex(hex::FromHexError::InvalidHexCharacter {
                c: 'z',
                index: 0
            }))
        );
        assert_eq!(
            "0x123".parse::<Address>(),
            Err(ParseBytesError::InvalidHex(hex::FromHexError::OddLength))
        );
    }

    #[test]
    fn test_zero_hash() {
        assert!(B256::ZERO.is_zero());
        assert_eq!(B256::default(), B256::ZERO);
        assert_eq!(
            B256::ZERO.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_address_from_word() {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&[0x11; 20]);
        assert_eq!(Address::from_word(&B256::new(word)), Address::new([0x11; 20]));
    }

    #[test]
    fn test_serde_round_trip_json() {
        let hash = keccak256(b"rollup");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash));
        let back: B256 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}

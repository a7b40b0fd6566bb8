//! Serde adapters for the JSON-RPC encodings.
//!
//! Integers travel as hex "quantities" (`"0x1a"`, no leading zeros) and byte
//! strings as `0x`-prefixed hex ("data").

use serde::{Deserialize, Deserializer, Serializer};

use crate::hash_types::B256;

/// Unsigned integers that can be carried as a hex quantity.
pub trait Quantity: Sized + Copy {
    fn to_u128(self) -> u128;
    fn from_u128(value: u128) -> Option<Self>;
}

macro_rules! impl_quantity {
    ($($t:ty),*) => {
        $(
            impl Quantity for $t {
                fn to_u128(self) -> u128 {
                    self as u128
                }

                fn from_u128(value: u128) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }
            }
        )*
    };
}

impl_quantity!(u8, u32, u64, u128);

/// Parse a hex quantity, with or without the `0x` prefix.
pub fn parse_quantity(s: &str) -> Result<u128, String> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if digits.is_empty() {
        return Err(format!("empty quantity: {:?}", s));
    }
    u128::from_str_radix(digits, 16).map_err(|e| format!("invalid quantity {:?}: {}", s, e))
}

/// `#[serde(with = "quantity")]` for integer fields.
pub mod quantity {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<T: Quantity, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#x}", value.to_u128()))
    }

    pub fn deserialize<'de, T: Quantity, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
        let s = String::deserialize(deserializer)?;
        let value = parse_quantity(&s).map_err(D::Error::custom)?;
        T::from_u128(value).ok_or_else(|| D::Error::custom(format!("quantity {} out of range", s)))
    }
}

/// `#[serde(default, with = "opt_quantity")]` for nullable / missing integer fields.
pub mod opt_quantity {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<T: Quantity, S: Serializer>(
        value: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::quantity::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T: Quantity, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<T>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => {
                let value = parse_quantity(&s).map_err(D::Error::custom)?;
                T::from_u128(value)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("quantity {} out of range", s)))
            }
            None => Ok(None),
        }
    }
}

/// `#[serde(with = "word_quantity")]` for 256-bit scalars encoded as quantities
/// (signature `r` and `s`), which may drop leading zero nibbles.
pub mod word_quantity {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(value: &B256, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = hex::encode(value.as_bytes());
        let trimmed = encoded.trim_start_matches('0');
        serializer.serialize_str(&format!("0x{}", if trimmed.is_empty() { "0" } else { trimmed }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<B256, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(&s);
        if digits.is_empty() || digits.len() > 64 {
            return Err(D::Error::custom(format!("invalid 256-bit quantity: {:?}", s)));
        }
        let padded = format!("{:0>64}", digits);
        let bytes = hex::decode(&padded).map_err(D::Error::custom)?;
        B256::from_slice(&bytes).map_err(D::Error::custom)
    }
}

/// `#[serde(with = "hex_bytes")]` for variable-length byte strings.
pub mod hex_bytes {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(&s);
        hex::decode(digits).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "quantity")]
        number: u64,
        #[serde(default, with = "opt_quantity")]
        index: Option<u64>,
        #[serde(with = "hex_bytes")]
        data: Vec<u8>,
        #[serde(with = "word_quantity")]
        r: B256,
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0"), Ok(0));
        assert_eq!(parse_quantity("0x1a"), Ok(26));
        assert_eq!(parse_quantity("ff"), Ok(255));
        assert!(parse_quantity("0x").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_decode_rpc_fields() {
        let sample: Sample =
            serde_json::from_str(r#"{"number":"0x10","data":"0xdeadbeef","r":"0x1"}"#).unwrap();
        assert_eq!(sample.number, 16);
        assert_eq!(sample.index, None);
        assert_eq!(sample.data, vec![0xde, 0xad, 0xbe, 0xef]);

        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(sample.r, B256::new(one));
    }

    #[test]
    fn test_encode_rpc_fields() {
        let sample = Sample {
            number: 255,
            index: Some(0),
            data: vec![],
            r: B256::ZERO,
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["number"], "0xff");
        assert_eq!(json["index"], "0x0");
        assert_eq!(json["data"], "0x");
        assert_eq!(json["r"], "0x0");
    }

    #[test]
    fn test_out_of_range_quantity() {
        let result: Result<Sample, _> = serde_json::from_str(
            r#"{"number":"0x10000000000000000","data":"0x","r":"0x1"}"#,
        );
        assert!(result.is_err());
    }
}

//! Random fixtures for tests.

use rand::Rng;
use secp256k1::SecretKey;

use crate::hash_types::{Address, B256};

pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes
}

pub fn random_hash() -> B256 {
    B256::new(random_bytes())
}

pub fn random_address() -> Address {
    Address::new(random_bytes())
}

/// A random valid secp256k1 signing key.
pub fn random_secret_key() -> SecretKey {
    loop {
        if let Ok(key) = SecretKey::from_slice(&random_bytes::<32>()) {
            return key;
        }
    }
}

//! Transaction signing and sender recovery.

use lazy_static::lazy_static;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};

use super::{Transaction, TypedTransaction};
use crate::error::{SignatureError, SignatureResult};
use crate::hash_types::{keccak256, Address, B256};

lazy_static! {
    static ref SECP256K1: Secp256k1<All> = Secp256k1::new();
}

/// secp256k1 group order.
const SECP256K1_N: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Half of the group order; homestead rejects any `s` above it.
const SECP256K1_HALF_N: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// Signature values as they appear on the wire.
///
/// For legacy transactions `v` is 27/28 or the EIP-155 `chain_id * 2 + 35 + parity`;
/// for typed transactions it is the bare y-parity (0 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signature {
    pub v: u64,
    pub r: B256,
    pub s: B256,
}

impl Signature {
    /// Sign a 32-byte digest. The returned `v` is the raw recovery parity.
    pub fn sign_digest(digest: &B256, key: &SecretKey) -> Self {
        let message = Message::from_digest(digest.to_byte_array());
        let (recovery_id, compact) =
            SECP256K1.sign_ecdsa_recoverable(&message, key).serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);

        Self {
            v: i32::from(recovery_id) as u64,
            r: B256::new(r),
            s: B256::new(s),
        }
    }
}

/// Whether `r`, `s` and the recovery parity form an acceptable homestead signature.
fn validate_signature_values(parity: u64, r: &B256, s: &B256) -> bool {
    if parity > 1 || r.is_zero() || s.is_zero() {
        return false;
    }
    r.as_bytes() < &SECP256K1_N && s.as_bytes() <= &SECP256K1_HALF_N
}

/// Derive the account address of a public key.
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_word(&hash)
}

/// Recover the address that produced `(r, s)` with the given parity over `digest`.
pub fn recover_address(digest: &B256, parity: u64, r: &B256, s: &B256) -> SignatureResult<Address> {
    if !validate_signature_values(parity, r, s) {
        return Err(SignatureError::InvalidSignatureValues);
    }

    let recovery_id = RecoveryId::try_from(parity as i32)
        .map_err(|e| SignatureError::Recovery(e.to_string()))?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(r.as_slice());
    compact[32..].copy_from_slice(s.as_slice());
    let signature = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| SignatureError::Recovery(e.to_string()))?;

    let message = Message::from_digest(digest.to_byte_array());
    let public_key = SECP256K1
        .recover_ecdsa(&message, &signature)
        .map_err(|e| SignatureError::Recovery(e.to_string()))?;

    Ok(public_key_to_address(&public_key))
}

/// Chain-aware signer.
///
/// Accepts every envelope the chain knows: unprotected and EIP-155 legacy
/// transactions, EIP-2930 and EIP-1559. Protected transactions must be bound to
/// the signer's chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signer {
    chain_id: u64,
}

impl Signer {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Recover the sender of a signed transaction.
    pub fn sender(&self, tx: &Transaction) -> SignatureResult<Address> {
        let v = tx.signature.v;
        let (digest, parity) = match &tx.tx {
            TypedTransaction::Legacy(_) if !tx.is_protected() => {
                (tx.tx.signature_hash(None), v - 27)
            }
            TypedTransaction::Legacy(_) => {
                if v < 35 {
                    return Err(SignatureError::InvalidSignatureValues);
                }
                let chain_id = (v - 35) / 2;
                self.ensure_chain_id(chain_id)?;
                (tx.tx.signature_hash(Some(chain_id)), v - 35 - chain_id * 2)
            }
            typed => {
                self.ensure_chain_id(typed.chain_id().unwrap_or_default())?;
                (typed.signature_hash(None), v)
            }
        };

        recover_address(&digest, parity, &tx.signature.r, &tx.signature.s)
    }

    /// Sign a transaction body. Legacy bodies are signed with EIP-155 replay protection.
    pub fn sign(&self, tx: TypedTransaction, key: &SecretKey) -> SignatureResult<Transaction> {
        let legacy_chain_id = match &tx {
            TypedTransaction::Legacy(_) => Some(self.chain_id),
            typed => {
                self.ensure_chain_id(typed.chain_id().unwrap_or_default())?;
                None
            }
        };

        let mut signature = Signature::sign_digest(&tx.signature_hash(legacy_chain_id), key);
        if let Some(chain_id) = legacy_chain_id {
            signature.v =
                eip155_v(chain_id, signature.v).ok_or(SignatureError::InvalidChainId {
                    expected: self.chain_id,
                    got: chain_id,
                })?;
        }

        Ok(Transaction::new(tx, signature))
    }

    fn ensure_chain_id(&self, got: u64) -> SignatureResult<()> {
        if got != self.chain_id {
            return Err(SignatureError::InvalidChainId {
                expected: self.chain_id,
                got,
            });
        }
        Ok(())
    }
}

/// `v` of an EIP-155 signature; None when it does not fit in a u64.
fn eip155_v(chain_id: u64, parity: u64) -> Option<u64> {
    chain_id.checked_mul(2)?.checked_add(35)?.checked_add(parity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{AccessListItem, AccessListTx, DynamicFeeTx, LegacyTx};
    use assert_matches::assert_matches;

    fn key(byte: u8) -> SecretKey {
        SecretKey::from_slice(&[byte; 32]).unwrap()
    }

    fn address_of(key: &SecretKey) -> Address {
        public_key_to_address(&PublicKey::from_secret_key(&SECP256K1, key))
    }

    fn dynamic_fee(chain_id: u64) -> TypedTransaction {
        TypedTransaction::DynamicFee(DynamicFeeTx {
            chain_id,
            nonce: 3,
            max_priority_fee_per_gas: 1,
            max_fee_per_gas: 2_000_000_000,
            gas: 250_000,
            to: Some(Address::new([0x77; 20])),
            input: vec![0x48, 0x08, 0x0b, 0xcf, 0x00],
            ..Default::default()
        })
    }

    #[test]
    fn test_eip155_reference_sender() {
        // Reference vector from EIP-155: key 0x4646..46 signs nonce 9 on chain 1.
        let tx = Transaction::new(
            TypedTransaction::Legacy(LegacyTx {
                nonce: 9,
                gas_price: 20_000_000_000,
                gas: 21000,
                to: Some("0x3535353535353535353535353535353535353535".parse().unwrap()),
                value: 1_000_000_000_000_000_000,
                input: vec![],
            }),
            Signature {
                v: 37,
                r: "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276"
                    .parse()
                    .unwrap(),
                s: "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
                    .parse()
                    .unwrap(),
            },
        );

        let sender = Signer::new(1).sender(&tx).unwrap();
        assert_eq!(sender, address_of(&key(0x46)));
        assert_eq!(sender.to_string(), "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f");
    }

    #[test]
    fn test_sign_and_recover_dynamic_fee() {
        let signer = Signer::new(167);
        let signing_key = key(0x11);
        let tx = signer.sign(dynamic_fee(167), &signing_key).unwrap();

        assert!(tx.signature.v <= 1);
        assert_eq!(signer.sender(&tx).unwrap(), address_of(&signing_key));
    }

    #[test]
    fn test_sign_and_recover_legacy_eip155() {
        let signer = Signer::new(167);
        let signing_key = key(0x22);
        let tx = signer
            .sign(
                TypedTransaction::Legacy(LegacyTx {
                    nonce: 1,
                    gas: 21000,
                    to: Some(Address::new([0x01; 20])),
                    ..Default::default()
                }),
                &signing_key,
            )
            .unwrap();

        assert_eq!(tx.chain_id(), Some(167));
        assert_eq!(signer.sender(&tx).unwrap(), address_of(&signing_key));
    }

    #[test]
    fn test_sign_and_recover_access_list() {
        let signer = Signer::new(167);
        let signing_key = key(0x66);
        let body = TypedTransaction::AccessList(AccessListTx {
            chain_id: 167,
            nonce: 2,
            gas_price: 1_000_000_000,
            gas: 60_000,
            to: Some(Address::new([0x02; 20])),
            input: vec![0xda, 0x69, 0xd3, 0xdb],
            access_list: vec![AccessListItem {
                address: Address::new([0x02; 20]),
                storage_keys: vec![B256::new([0x03; 32])],
            }],
            ..Default::default()
        });
        let tx = signer.sign(body, &signing_key).unwrap();

        assert!(tx.signature.v <= 1);
        assert_eq!(tx.chain_id(), Some(167));
        assert_eq!(signer.sender(&tx).unwrap(), address_of(&signing_key));

        assert_matches!(
            Signer::new(1).sender(&tx),
            Err(SignatureError::InvalidChainId {
                expected: 1,
                got: 167
            })
        );
    }

    #[test]
    fn test_legacy_chain_id_overflowing_v_is_rejected() {
        let body = TypedTransaction::Legacy(LegacyTx {
            gas: 21000,
            ..Default::default()
        });

        assert_matches!(
            Signer::new(u64::MAX).sign(body.clone(), &key(0x22)),
            Err(SignatureError::InvalidChainId { .. })
        );
        assert_matches!(
            Signer::new((u64::MAX - 35) / 2 + 1).sign(body, &key(0x22)),
            Err(SignatureError::InvalidChainId { .. })
        );

        assert_eq!(eip155_v(167, 1), Some(370));
        assert_eq!(eip155_v((u64::MAX - 35) / 2, 0), Some(u64::MAX));
        assert_eq!(eip155_v((u64::MAX - 35) / 2, 1), None);
    }

    #[test]
    fn test_recover_unprotected_legacy() {
        let signing_key = key(0x33);
        let body = TypedTransaction::Legacy(LegacyTx {
            nonce: 7,
            gas: 21000,
            ..Default::default()
        });
        let mut signature = Signature::sign_digest(&body.signature_hash(None), &signing_key);
        signature.v += 27;
        let tx = Transaction::new(body, signature);

        // Any signer accepts homestead transactions.
        assert_eq!(Signer::new(5).sender(&tx).unwrap(), address_of(&signing_key));
    }

    #[test]
    fn test_wrong_chain_id_is_rejected() {
        let tx = Signer::new(1).sign(dynamic_fee(1), &key(0x11)).unwrap();
        assert_matches!(
            Signer::new(167).sender(&tx),
            Err(SignatureError::InvalidChainId {
                expected: 167,
                got: 1
            })
        );

        assert_matches!(
            Signer::new(1).sign(dynamic_fee(2), &key(0x11)),
            Err(SignatureError::InvalidChainId { .. })
        );
    }

    #[test]
    fn test_high_s_is_rejected() {
        let signer = Signer::new(167);
        let mut tx = signer.sign(dynamic_fee(167), &key(0x44)).unwrap();
        tx.signature.s = B256::new(SECP256K1_N);
        assert_eq!(signer.sender(&tx), Err(SignatureError::InvalidSignatureValues));
    }

    #[test]
    fn test_zero_signature_is_rejected() {
        let tx = Transaction::unsigned(dynamic_fee(167));
        assert_eq!(Signer::new(167).sender(&tx), Err(SignatureError::InvalidSignatureValues));
    }

    #[test]
    fn test_tampered_body_changes_sender() {
        let signer = Signer::new(167);
        let signing_key = key(0x55);
        let mut tx = signer.sign(dynamic_fee(167), &signing_key).unwrap();
        if let TypedTransaction::DynamicFee(inner) = &mut tx.tx {
            inner.nonce += 1;
        }

        match signer.sender(&tx) {
            Ok(sender) => assert_ne!(sender, address_of(&signing_key)),
            Err(e) => assert_matches!(e, SignatureError::Recovery(_)),
        }
    }
}

//! Typed transactions.
//!
//! Three envelopes are supported: legacy (optionally EIP-155 protected), EIP-2930
//! access-list and EIP-1559 dynamic-fee transactions. Each can produce the RLP
//! payload that gets signed and the canonical signed encoding whose keccak-256 is
//! the transaction hash.

mod json;
mod signature;

pub use json::RpcTransaction;
pub use signature::{public_key_to_address, recover_address, Signature, Signer};

use rlp::RlpStream;
use serde::{Deserialize, Serialize};

use crate::hash_types::{keccak256, Address, B256};

/// EIP-2718 type byte of an access-list transaction.
pub const ACCESS_LIST_TX_TYPE: u8 = 0x01;
/// EIP-2718 type byte of a dynamic-fee transaction.
pub const DYNAMIC_FEE_TX_TYPE: u8 = 0x02;

/// One entry of an EIP-2930 access list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    pub address: Address,
    pub storage_keys: Vec<B256>,
}

pub type AccessList = Vec<AccessListItem>;

/// Pre-EIP-2718 transaction. The chain id, when present, lives in the signature's `v`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LegacyTx {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas: u64,
    pub to: Option<Address>,
    pub value: u128,
    pub input: Vec<u8>,
}

/// EIP-2930 transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessListTx {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas: u64,
    pub to: Option<Address>,
    pub value: u128,
    pub input: Vec<u8>,
    pub access_list: AccessList,
}

/// EIP-1559 transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DynamicFeeTx {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas: u64,
    pub to: Option<Address>,
    pub value: u128,
    pub input: Vec<u8>,
    pub access_list: AccessList,
}

/// The unsigned body of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedTransaction {
    Legacy(LegacyTx),
    AccessList(AccessListTx),
    DynamicFee(DynamicFeeTx),
}

impl TypedTransaction {
    /// EIP-2718 type byte (0 for legacy).
    pub fn tx_type(&self) -> u8 {
        match self {
            TypedTransaction::Legacy(_) => 0,
            TypedTransaction::AccessList(_) => ACCESS_LIST_TX_TYPE,
            TypedTransaction::DynamicFee(_) => DYNAMIC_FEE_TX_TYPE,
        }
    }

    pub fn nonce(&self) -> u64 {
        match self {
            TypedTransaction::Legacy(tx) => tx.nonce,
            TypedTransaction::AccessList(tx) => tx.nonce,
            TypedTransaction::DynamicFee(tx) => tx.nonce,
        }
    }

    pub fn gas(&self) -> u64 {
        match self {
            TypedTransaction::Legacy(tx) => tx.gas,
            TypedTransaction::AccessList(tx) => tx.gas,
            TypedTransaction::DynamicFee(tx) => tx.gas,
        }
    }

    /// Recipient, `None` for contract creation.
    pub fn to(&self) -> Option<Address> {
        match self {
            TypedTransaction::Legacy(tx) => tx.to,
            TypedTransaction::AccessList(tx) => tx.to,
            TypedTransaction::DynamicFee(tx) => tx.to,
        }
    }

    pub fn value(&self) -> u128 {
        match self {
            TypedTransaction::Legacy(tx) => tx.value,
            TypedTransaction::AccessList(tx) => tx.value,
            TypedTransaction::DynamicFee(tx) => tx.value,
        }
    }

    pub fn input(&self) -> &[u8] {
        match self {
            TypedTransaction::Legacy(tx) => &tx.input,
            TypedTransaction::AccessList(tx) => &tx.input,
            TypedTransaction::DynamicFee(tx) => &tx.input,
        }
    }

    /// Chain id carried by typed envelopes. Legacy transactions return `None`.
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            TypedTransaction::Legacy(_) => None,
            TypedTransaction::AccessList(tx) => Some(tx.chain_id),
            TypedTransaction::DynamicFee(tx) => Some(tx.chain_id),
        }
    }

    /// Hash that the sender signs.
    ///
    /// `legacy_chain_id` selects the EIP-155 payload for legacy transactions
    /// (`None` gives the unprotected homestead payload); typed envelopes always
    /// sign over their own chain id.
    pub fn signature_hash(&self, legacy_chain_id: Option<u64>) -> B256 {
        keccak256(self.signing_payload(legacy_chain_id))
    }

    fn signing_payload(&self, legacy_chain_id: Option<u64>) -> Vec<u8> {
        match self {
            TypedTransaction::Legacy(tx) => {
                let mut stream = RlpStream::new_list(if legacy_chain_id.is_some() { 9 } else { 6 });
                append_legacy_fields(&mut stream, tx);
                if let Some(chain_id) = legacy_chain_id {
                    append_uint(&mut stream, u128::from(chain_id));
                    append_uint(&mut stream, 0);
                    append_uint(&mut stream, 0);
                }
                stream.out().to_vec()
            }
            TypedTransaction::AccessList(tx) => {
                let mut stream = RlpStream::new_list(8);
                append_access_list_fields(&mut stream, tx);
                typed_envelope(ACCESS_LIST_TX_TYPE, &stream.out())
            }
            TypedTransaction::DynamicFee(tx) => {
                let mut stream = RlpStream::new_list(9);
                append_dynamic_fee_fields(&mut stream, tx);
                typed_envelope(DYNAMIC_FEE_TX_TYPE, &stream.out())
            }
        }
    }

    fn encode_signed(&self, signature: &Signature) -> Vec<u8> {
        match self {
            TypedTransaction::Legacy(tx) => {
                let mut stream = RlpStream::new_list(9);
                append_legacy_fields(&mut stream, tx);
                append_signature(&mut stream, signature);
                stream.out().to_vec()
            }
            TypedTransaction::AccessList(tx) => {
                let mut stream = RlpStream::new_list(11);
                append_access_list_fields(&mut stream, tx);
                append_signature(&mut stream, signature);
                typed_envelope(ACCESS_LIST_TX_TYPE, &stream.out())
            }
            TypedTransaction::DynamicFee(tx) => {
                let mut stream = RlpStream::new_list(12);
                append_dynamic_fee_fields(&mut stream, tx);
                append_signature(&mut stream, signature);
                typed_envelope(DYNAMIC_FEE_TX_TYPE, &stream.out())
            }
        }
    }
}

/// A transaction body together with its signature.
///
/// Unsigned transactions carry an all-zero [`Signature`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub tx: TypedTransaction,
    pub signature: Signature,
}

impl Transaction {
    pub fn new(tx: TypedTransaction, signature: Signature) -> Self {
        Self {
            tx,
            signature,
        }
    }

    pub fn unsigned(tx: TypedTransaction) -> Self {
        Self::new(tx, Signature::default())
    }

    pub fn tx_type(&self) -> u8 {
        self.tx.tx_type()
    }

    pub fn nonce(&self) -> u64 {
        self.tx.nonce()
    }

    pub fn to(&self) -> Option<Address> {
        self.tx.to()
    }

    pub fn value(&self) -> u128 {
        self.tx.value()
    }

    pub fn input(&self) -> &[u8] {
        self.tx.input()
    }

    /// Leading four bytes of the call data, if there are at least four.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.input().get(..4).and_then(|bytes| bytes.try_into().ok())
    }

    /// Chain id the transaction is bound to. Unprotected legacy transactions return `None`.
    pub fn chain_id(&self) -> Option<u64> {
        match &self.tx {
            TypedTransaction::Legacy(_) => {
                if self.signature.v >= 35 {
                    Some((self.signature.v - 35) / 2)
                } else {
                    None
                }
            }
            tx => tx.chain_id(),
        }
    }

    /// Whether the signature commits to a chain id (always true for typed envelopes).
    pub fn is_protected(&self) -> bool {
        match &self.tx {
            TypedTransaction::Legacy(_) => self.signature.v != 27 && self.signature.v != 28,
            _ => true,
        }
    }

    /// Canonical signed encoding (EIP-2718 envelope for typed transactions).
    pub fn encoded(&self) -> Vec<u8> {
        self.tx.encode_signed(&self.signature)
    }

    /// Transaction hash.
    pub fn hash(&self) -> B256 {
        keccak256(self.encoded())
    }
}

fn typed_envelope(tx_type: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(tx_type);
    out.extend_from_slice(payload);
    out
}

/// Append an unsigned integer with the canonical (leading zeros stripped) encoding.
fn append_uint(stream: &mut RlpStream, value: u128) {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    stream.append(&&bytes[start..]);
}

fn append_word_uint(stream: &mut RlpStream, value: &B256) {
    let bytes = value.as_slice();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    stream.append(&&bytes[start..]);
}

fn append_to(stream: &mut RlpStream, to: Option<Address>) {
    match to {
        Some(address) => {
            stream.append(&address.as_slice());
        }
        None => {
            stream.append_empty_data();
        }
    }
}

fn append_access_list(stream: &mut RlpStream, access_list: &AccessList) {
    stream.begin_list(access_list.len());
    for item in access_list {
        stream.begin_list(2);
        stream.append(&item.address.as_slice());
        stream.begin_list(item.storage_keys.len());
        for key in &item.storage_keys {
            stream.append(&key.as_slice());
        }
    }
}

fn append_legacy_fields(stream: &mut RlpStream, tx: &LegacyTx) {
    append_uint(stream, u128::from(tx.nonce));
    append_uint(stream, tx.gas_price);
    append_uint(stream, u128::from(tx.gas));
    append_to(stream, tx.to);
    append_uint(stream, tx.value);
    stream.append(&tx.input.as_slice());
}

fn append_access_list_fields(stream: &mut RlpStream, tx: &AccessListTx) {
    append_uint(stream, u128::from(tx.chain_id));
    append_uint(stream, u128::from(tx.nonce));
    append_uint(stream, tx.gas_price);
    append_uint(stream, u128::from(tx.gas));
    append_to(stream, tx.to);
    append_uint(stream, tx.value);
    stream.append(&tx.input.as_slice());
    append_access_list(stream, &tx.access_list);
}

fn append_dynamic_fee_fields(stream: &mut RlpStream, tx: &DynamicFeeTx) {
    append_uint(stream, u128::from(tx.chain_id));
    append_uint(stream, u128::from(tx.nonce));
    append_uint(stream, tx.max_priority_fee_per_gas);
    append_uint(stream, tx.max_fee_per_gas);
    append_uint(stream, u128::from(tx.gas));
    append_to(stream, tx.to);
    append_uint(stream, tx.value);
    stream.append(&tx.input.as_slice());
    append_access_list(stream, &tx.access_list);
}

fn append_signature(stream: &mut RlpStream, signature: &Signature) {
    append_uint(stream, u128::from(signature.v));
    append_word_uint(stream, &signature.r);
    append_word_uint(stream, &signature.s);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_uint_is_canonical() {
        let mut stream = RlpStream::new_list(3);
        append_uint(&mut stream, 0);
        append_uint(&mut stream, 0x7f);
        append_uint(&mut stream, 0x0400);
        // 0 -> 0x80, 0x7f -> single byte, 0x0400 -> 0x82 0x04 0x00
        assert_eq!(stream.out().to_vec(), vec![0xc5, 0x80, 0x7f, 0x82, 0x04, 0x00]);
    }

    #[test]
    fn test_eip155_reference_signing_hash() {
        // Reference vector from EIP-155.
        let tx = TypedTransaction::Legacy(LegacyTx {
            nonce: 9,
            gas_price: 20_000_000_000,
            gas: 21000,
            to: Some("0x3535353535353535353535353535353535353535".parse().unwrap()),
            value: 1_000_000_000_000_000_000,
            input: vec![],
        });

        let expected_payload = hex::decode(
            "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080",
        )
        .unwrap();
        assert_eq!(tx.signing_payload(Some(1)), expected_payload);
        assert_eq!(
            tx.signature_hash(Some(1)).to_string(),
            "0xdaf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    fn fixed_signature(v: u64) -> Signature {
        Signature {
            v,
            r: B256::new([0x11; 32]),
            s: B256::new([0x22; 32]),
        }
    }

    #[test]
    fn test_dynamic_fee_hashes() {
        let tx = TypedTransaction::DynamicFee(DynamicFeeTx {
            chain_id: 1,
            nonce: 0,
            max_priority_fee_per_gas: 2_000_000_000,
            max_fee_per_gas: 100_000_000_000,
            gas: 21000,
            to: Some(Address::new([0x35; 20])),
            value: 1_000_000_000_000_000_000,
            input: vec![],
            access_list: vec![],
        });
        assert_eq!(
            tx.signature_hash(None).to_string(),
            "0x0b90ec27784b0b819f9413e83d1eab4c84f1eda3150059f1881f867fb010f1d1"
        );

        let signed = Transaction::new(tx, fixed_signature(1));
        assert_eq!(
            signed.hash().to_string(),
            "0x2768c07bdb554410f1f8fe6af869f3b5103e9ee11657a49893fa5a5a45275467"
        );
    }

    #[test]
    fn test_access_list_hashes() {
        let mut last_slot = [0u8; 32];
        last_slot[31] = 1;
        let tx = TypedTransaction::AccessList(AccessListTx {
            chain_id: 1,
            nonce: 1,
            gas_price: 30_000_000_000,
            gas: 50_000,
            to: Some(Address::new([0x35; 20])),
            value: 0,
            input: vec![0xde, 0xad, 0xbe, 0xef],
            access_list: vec![AccessListItem {
                address: Address::new([0x01; 20]),
                storage_keys: vec![B256::ZERO, B256::new(last_slot)],
            }],
        });
        // Legacy chain id is ignored by typed envelopes
        assert_eq!(tx.signature_hash(None), tx.signature_hash(Some(5)));
        assert_eq!(
            tx.signature_hash(None).to_string(),
            "0x83e7d3bc1f903f12b6a5d01587270dff922efbcd03706223c5b172697d93af0a"
        );

        let signed = Transaction::new(tx, fixed_signature(0));
        assert_eq!(
            signed.hash().to_string(),
            "0x6808a24b44ea61b10899fff1c04f5b5eed26695a598559c8a47a474711de4eda"
        );
    }

    #[test]
    fn test_selector_requires_four_bytes() {
        let mut legacy = LegacyTx {
            input: vec![0xde, 0xad, 0xbe],
            ..Default::default()
        };
        assert_eq!(Transaction::unsigned(TypedTransaction::Legacy(legacy.clone())).selector(), None);

        legacy.input.push(0xef);
        legacy.input.push(0x00);
        assert_eq!(
            Transaction::unsigned(TypedTransaction::Legacy(legacy)).selector(),
            Some([0xde, 0xad, 0xbe, 0xef])
        );
    }

    #[test]
    fn test_typed_envelope_prefix() {
        let tx = Transaction::unsigned(TypedTransaction::DynamicFee(DynamicFeeTx {
            chain_id: 167,
            ..Default::default()
        }));
        assert_eq!(tx.encoded()[0], DYNAMIC_FEE_TX_TYPE);
        assert_eq!(tx.chain_id(), Some(167));
        assert!(tx.is_protected());
    }

    #[test]
    fn test_legacy_chain_id_from_v() {
        let mut tx = Transaction::unsigned(TypedTransaction::Legacy(LegacyTx::default()));
        tx.signature.v = 27;
        assert_eq!(tx.chain_id(), None);
        assert!(!tx.is_protected());

        tx.signature.v = 167 * 2 + 36;
        assert_eq!(tx.chain_id(), Some(167));
        assert!(tx.is_protected());
    }

    #[test]
    fn test_contract_creation_has_no_recipient() {
        let tx = Transaction::unsigned(TypedTransaction::AccessList(AccessListTx {
            chain_id: 1,
            to: None,
            access_list: vec![AccessListItem {
                address: Address::new([0x01; 20]),
                storage_keys: vec![B256::ZERO],
            }],
            ..Default::default()
        }));
        assert_eq!(tx.to(), None);
        assert_eq!(tx.encoded()[0], ACCESS_LIST_TX_TYPE);
    }
}

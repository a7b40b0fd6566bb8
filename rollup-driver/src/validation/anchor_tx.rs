//! Anchor transaction validation.
//!
//! Every block starts with an anchor transaction: a call to the system
//! contract's `anchor` method, signed by the reserved golden-touch key.
//! [`AnchorTxValidator`] checks those three properties and the transaction's
//! receipt before a block is proven.

use tokio::sync::OnceCell;

use rollup_primitives::{selector, Address, Receipt, Signer, Transaction};

use crate::error::{AnchorTxError, AnchorTxResult, RpcError};
use crate::rpc::ChainClient;

/// Solidity signature of the system contract's anchor method.
pub const ANCHOR_METHOD_SIGNATURE: &str = "anchor(bytes32,bytes32,uint64,uint32)";

pub struct AnchorTxValidator<C> {
    system_contract: Address,
    signer: Signer,
    anchor_selector: [u8; 4],
    client: C,
    golden_touch_address: OnceCell<Address>,
}

impl<C: ChainClient> AnchorTxValidator<C> {
    /// Validator for anchor transactions sent to `system_contract` on chain `chain_id`.
    ///
    /// The golden-touch address is read from the system contract on first use.
    pub fn new(system_contract: Address, chain_id: u64, client: C) -> Self {
        Self {
            system_contract,
            signer: Signer::new(chain_id),
            anchor_selector: selector(ANCHOR_METHOD_SIGNATURE),
            client,
            golden_touch_address: OnceCell::new(),
        }
    }

    /// Use a known golden-touch address instead of resolving it on-chain.
    pub fn with_golden_touch_address(mut self, address: Address) -> Self {
        self.golden_touch_address = OnceCell::new_with(Some(address));
        self
    }

    /// Expect a different anchor method, given as a canonical Solidity signature.
    pub fn with_anchor_method(mut self, signature: &str) -> Self {
        self.anchor_selector = selector(signature);
        self
    }

    pub fn system_contract(&self) -> Address {
        self.system_contract
    }

    pub fn chain_id(&self) -> u64 {
        self.signer.chain_id()
    }

    pub fn anchor_selector(&self) -> [u8; 4] {
        self.anchor_selector
    }

    /// The reserved anchor signer, resolved at most once.
    pub async fn golden_touch_address(&self) -> AnchorTxResult<Address> {
        self.golden_touch_address
            .get_or_try_init(|| async {
                tracing::debug!(
                    "Resolving golden touch address from system contract {}",
                    self.system_contract
                );
                self.client
                    .golden_touch_address(self.system_contract)
                    .await
                    .map_err(AnchorTxError::SignerResolution)
            })
            .await
            .copied()
    }

    /// Check recipient, sender and method selector, in that order.
    pub async fn validate_anchor_tx(&self, tx: &Transaction) -> AnchorTxResult<()> {
        if tx.to() != Some(self.system_contract) {
            return Err(AnchorTxError::InvalidRecipient {
                expected: self.system_contract,
                got: tx.to(),
            });
        }

        let sender = self.signer.sender(tx)?;
        let golden_touch_address = self.golden_touch_address().await?;
        if sender != golden_touch_address {
            return Err(AnchorTxError::InvalidSender {
                expected: golden_touch_address,
                got: sender,
            });
        }

        if tx.selector() != Some(self.anchor_selector) {
            let input = tx.input();
            return Err(AnchorTxError::InvalidSelector {
                expected: self.anchor_selector,
                got: input[..input.len().min(4)].to_vec(),
            });
        }

        Ok(())
    }

    /// Fetch the receipt of an anchor transaction and check that it executed successfully.
    pub async fn get_and_validate_anchor_tx_receipt(
        &self,
        tx: &Transaction,
    ) -> AnchorTxResult<Receipt> {
        let tx_hash = tx.hash();

        let receipt = match self.client.transaction_receipt(tx_hash).await {
            Ok(Some(receipt)) => receipt,
            Ok(None) => {
                return Err(AnchorTxError::ReceiptUnavailable {
                    tx_hash,
                    source: RpcError::NotFound(format!("receipt of {}", tx_hash)),
                });
            }
            Err(source) => {
                return Err(AnchorTxError::ReceiptUnavailable {
                    tx_hash,
                    source,
                });
            }
        };

        if receipt.transaction_hash != tx_hash {
            return Err(AnchorTxError::ReceiptMismatch {
                expected: tx_hash,
                got: receipt.transaction_hash,
            });
        }

        if !receipt.is_successful() {
            return Err(AnchorTxError::ReceiptStatus {
                tx_hash,
                status: receipt.status,
            });
        }

        if receipt.logs.is_empty() {
            return Err(AnchorTxError::NoEvents(tx_hash));
        }

        Ok(receipt)
    }
}

impl<C> std::fmt::Debug for AnchorTxValidator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorTxValidator")
            .field("system_contract", &self.system_contract)
            .field("chain_id", &self.signer.chain_id())
            .field("anchor_selector", &hex::encode(self.anchor_selector))
            .field("golden_touch_address", &self.golden_touch_address.get())
            .finish()
    }
}

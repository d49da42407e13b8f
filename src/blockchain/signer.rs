//! Transaction signing and canonical hashing.

use alloy::consensus::{SignableTransaction, TxLegacy};
use alloy::primitives::{Signature, TxHash, TxKind};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::blockchain::types::{RawTransaction, SignerError};
use crate::blockchain::wallet::KeyMaterial;

/// Signs raw transactions and computes their canonical id.
pub trait TransactionSigner: Send + Sync {
    /// Sign a raw transaction.
    fn sign(&self, raw: &RawTransaction) -> Result<Signature, SignerError>;

    /// Canonical hash of `raw` signed with `signature`.
    fn hash(&self, raw: &RawTransaction, signature: &Signature) -> Result<TxHash, SignerError>;
}

/// Signs EIP-155 legacy transactions with the wallet's local key.
#[derive(Clone)]
pub struct LocalSigner {
    key: PrivateKeySigner,
    chain_id: u64,
}

impl LocalSigner {
    pub fn new(keys: &KeyMaterial) -> Self {
        Self {
            key: keys.signing_key().clone(),
            chain_id: keys.chain_id(),
        }
    }

    fn legacy(&self, raw: &RawTransaction) -> Result<TxLegacy, SignerError> {
        if raw.gas_limit == 0 {
            return Err(SignerError::InvalidTransaction(
                "gas limit must be non-zero".to_string(),
            ));
        }

        Ok(TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: raw.nonce,
            gas_price: raw.gas_price,
            gas_limit: raw.gas_limit,
            to: TxKind::Call(raw.to),
            value: raw.value,
            input: raw.input.clone(),
        })
    }
}

impl TransactionSigner for LocalSigner {
    fn sign(&self, raw: &RawTransaction) -> Result<Signature, SignerError> {
        let tx = self.legacy(raw)?;
        self.key
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| SignerError::Signing(e.to_string()))
    }

    fn hash(&self, raw: &RawTransaction, signature: &Signature) -> Result<TxHash, SignerError> {
        let signed = self.legacy(raw)?.into_signed(*signature);
        Ok(*signed.hash())
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.key.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

//! Key material derivation.
//!
//! # Security
//! - The seed phrase is consumed during derivation and never stored
//! - Private keys are never logged or serialized
//! - Only the signer reads the signing key

use alloy::primitives::Address;
use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};

use crate::blockchain::types::KeyDerivationError;
use crate::config::NetworkConfig;

/// Wallet address and signing key, fixed for the lifetime of the facade.
#[derive(Clone)]
pub struct KeyMaterial {
    /// The underlying secp256k1 key.
    signer: PrivateKeySigner,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl KeyMaterial {
    /// Create key material from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    pub fn from_private_key(
        private_key_hex: &str,
        chain_id: u64,
    ) -> Result<Self, KeyDerivationError> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| KeyDerivationError::InvalidPrivateKey(format!("{}", e)))?;

        Ok(Self::from_signer(signer, chain_id))
    }

    fn from_signer(signer: PrivateKeySigner, chain_id: u64) -> Self {
        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Key material initialized"
        );
        Self { signer, chain_id }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// EIP-55 checksummed address string.
    pub fn checksummed_address(&self) -> String {
        self.address().to_checksum(None)
    }

    /// Get the chain ID this key material is bound to.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub(crate) fn signing_key(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Derives key material from a seed phrase.
pub trait KeyDeriver: Send + Sync {
    fn derive(
        &self,
        seed_phrase: &str,
        network: &NetworkConfig,
    ) -> Result<KeyMaterial, KeyDerivationError>;
}

/// BIP-39 mnemonic with a BIP-44 path: `m/44'/{coin_type}'/{account}'/0/{index}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bip44Deriver;

impl KeyDeriver for Bip44Deriver {
    fn derive(
        &self,
        seed_phrase: &str,
        network: &NetworkConfig,
    ) -> Result<KeyMaterial, KeyDerivationError> {
        // Normalize whitespace and case before handing the phrase to BIP-39.
        let phrase = seed_phrase
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if phrase.is_empty() {
            return Err(KeyDerivationError::InvalidSeedPhrase(
                "seed phrase is empty".to_string(),
            ));
        }

        let path = network.derivation_path();
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .derivation_path(path.as_str())
            .map_err(|e| KeyDerivationError::InvalidPath {
                path: path.clone(),
                reason: e.to_string(),
            })?
            .build()
            .map_err(|e| KeyDerivationError::InvalidSeedPhrase(e.to_string()))?;

        Ok(KeyMaterial::from_signer(signer, network.chain_id))
    }
}

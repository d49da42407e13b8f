//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::storage::StoreError;
use crate::sync::{BroadcastError, SyncError};

/// Last-known, chain-confirmed state of the wallet address.
///
/// Replaced wholesale whenever the sync engine reports a fresher snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Next nonce the chain expects from this address.
    pub nonce: u64,
    /// Balance in wei.
    pub balance: U256,
    /// Height at which the sync engine observed this snapshot.
    pub block_height: u64,
}

impl AccountState {
    pub fn new(nonce: u64, balance: U256, block_height: u64) -> Self {
        Self {
            nonce,
            balance,
            block_height,
        }
    }

    /// Whether this snapshot was observed strictly before `other`.
    ///
    /// Ordered by block height, then nonce.
    pub fn is_older_than(&self, other: &AccountState) -> bool {
        (self.block_height, self.nonce) < (other.block_height, other.nonce)
    }
}

/// Unsigned transfer intent, built fresh for every send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub to: Address,
    pub value: U256,
    /// Gas price in wei.
    pub gas_price: u128,
    pub gas_limit: u64,
    pub nonce: u64,
    /// Call data. Empty for plain value transfers.
    pub input: Bytes,
}

/// Kind of transfer, selecting the fixed gas limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Native value transfer.
    Plain,
    /// Contract token transfer.
    Token,
}

/// Persisted record of a sent transaction. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Canonical transaction hash.
    pub hash: TxHash,
    pub nonce: u64,
    pub from: Address,
    pub to: Address,
    /// Amount in wei.
    pub value: U256,
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    /// Creation time (seconds since epoch).
    pub timestamp: u64,
}

impl Transaction {
    /// Whether `address` is the sender or the recipient.
    pub fn involves(&self, address: &Address) -> bool {
        self.from == *address || self.to == *address
    }
}

/// Synchronization state as reported by the sync engine. Relayed, never interpreted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    #[default]
    NotSynced,
    Syncing { progress: Option<f64> },
    Synced,
}

/// Last block header reported by the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: u64,
    pub hash: B256,
}

/// Fee priority tier used to pick a gas price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for GasPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GasPriority::Low => "low",
            GasPriority::Medium => "medium",
            GasPriority::High => "high",
        };
        f.write_str(name)
    }
}

impl FromStr for GasPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(GasPriority::Low),
            "medium" => Ok(GasPriority::Medium),
            "high" => Ok(GasPriority::High),
            other => Err(format!("unknown priority '{}' (expected low, medium or high)", other)),
        }
    }
}

/// Errors raised while deriving keys from a seed phrase.
#[derive(Debug, Error)]
pub enum KeyDerivationError {
    /// The seed phrase is not a valid BIP-39 mnemonic.
    #[error("Invalid seed phrase: {0}")]
    InvalidSeedPhrase(String),

    /// The derivation path could not be parsed.
    #[error("Invalid derivation path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A raw private key could not be parsed.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// Errors raised by the transaction signer.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The raw transaction cannot be signed as built.
    #[error("Invalid raw transaction: {0}")]
    InvalidTransaction(String),

    /// The signing key rejected the request.
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Errors surfaced by the wallet facade.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Nonce is unknown until the first account state arrives.
    #[error("No account state available yet; wait for the first sync")]
    NoAccountState,

    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    /// Broadcast failed after the transaction was persisted.
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Recipient is not a 20-byte hex address.
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    /// Amount is not a decimal integer in wei.
    #[error("Invalid amount '{0}': expected a decimal integer in wei")]
    InvalidAmount(String),

    /// Operation exists in the interface but has no implementation.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

impl WalletError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WalletError::NoAccountState => "no_account_state",
            WalletError::KeyDerivation(_) => "key_derivation",
            WalletError::Signer(_) => "signer",
            WalletError::Broadcast(_) => "broadcast",
            WalletError::Store(_) => "store",
            WalletError::Sync(_) => "sync",
            WalletError::InvalidAddress(_) => "invalid_address",
            WalletError::InvalidAmount(_) => "invalid_amount",
            WalletError::NotImplemented(_) => "not_implemented",
        }
    }
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

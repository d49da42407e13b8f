//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the wallet.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::blockchain::transaction::{
    DEFAULT_GAS_PRICE_GWEI, TOKEN_TRANSFER_GAS_LIMIT, TRANSFER_GAS_LIMIT,
};

/// Root configuration for the wallet.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    /// Chain and key derivation parameters.
    pub network: NetworkConfig,

    /// Gas price tiers and fixed gas limits.
    pub gas: GasConfig,

    /// Where the wallet state is persisted.
    pub storage: StorageConfig,

    /// Handling of sync engine notifications.
    pub sync: SyncConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain and BIP-44 derivation parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// SLIP-44 coin type (60 for Ether).
    pub coin_type: u32,

    /// BIP-44 account index.
    pub account: u32,

    /// Address index within the external chain.
    pub address_index: u32,
}

impl NetworkConfig {
    /// BIP-44 path for the configured account and address.
    pub fn derivation_path(&self) -> String {
        format!(
            "m/44'/{}'/{}'/0/{}",
            self.coin_type, self.account, self.address_index
        )
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            coin_type: 60,
            account: 0,
            address_index: 0,
        }
    }
}

/// Gas configuration.
///
/// Every tier defaults to the same medium price; there is no market estimator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    pub low_gwei: u64,
    pub medium_gwei: u64,
    pub high_gwei: u64,

    /// Gas limit for plain value transfers.
    pub transfer_gas_limit: u64,

    /// Gas limit for contract token transfers.
    pub token_transfer_gas_limit: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            low_gwei: DEFAULT_GAS_PRICE_GWEI,
            medium_gwei: DEFAULT_GAS_PRICE_GWEI,
            high_gwei: DEFAULT_GAS_PRICE_GWEI,
            transfer_gas_limit: TRANSFER_GAS_LIMIT,
            token_transfer_gas_limit: TOKEN_TRANSFER_GAS_LIMIT,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the wallet state. Memory-only when unset.
    pub path: Option<String>,
}

/// Sync notification handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Drop account states older than the cached one instead of applying them.
    pub reject_stale_account_states: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reject_stale_account_states: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

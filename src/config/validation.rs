//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (gas limits, derivation indices, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WalletConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::blockchain::transaction::TRANSFER_GAS_LIMIT;
use crate::config::schema::WalletConfig;

/// First hardened BIP-32 index; path components must stay below it.
const HARDENED_OFFSET: u32 = 1 << 31;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &WalletConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Network
    let network = &config.network;
    if network.chain_id == 0 {
        errors.push(ValidationError::new("network.chain_id", "must be non-zero"));
    }
    for (field, value) in [
        ("network.coin_type", network.coin_type),
        ("network.account", network.account),
        ("network.address_index", network.address_index),
    ] {
        if value >= HARDENED_OFFSET {
            errors.push(ValidationError::new(
                field,
                format!("must be below {}", HARDENED_OFFSET),
            ));
        }
    }

    // Gas
    let gas = &config.gas;
    if gas.low_gwei == 0 {
        errors.push(ValidationError::new("gas.low_gwei", "must be non-zero"));
    }
    if gas.low_gwei > gas.medium_gwei || gas.medium_gwei > gas.high_gwei {
        errors.push(ValidationError::new(
            "gas",
            "tiers must satisfy low_gwei <= medium_gwei <= high_gwei",
        ));
    }
    if gas.transfer_gas_limit < TRANSFER_GAS_LIMIT {
        errors.push(ValidationError::new(
            "gas.transfer_gas_limit",
            format!("must be at least {}", TRANSFER_GAS_LIMIT),
        ));
    }
    if gas.token_transfer_gas_limit < gas.transfer_gas_limit {
        errors.push(ValidationError::new(
            "gas.token_transfer_gas_limit",
            "must not be below transfer_gas_limit",
        ));
    }

    // Storage
    if let Some(path) = &config.storage.path {
        if path.trim().is_empty() {
            errors.push(ValidationError::new("storage.path", "must not be empty when set"));
        }
    }

    // Observability
    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", observability.log_level),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

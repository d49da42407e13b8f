//! Transaction building, signing, persistence and broadcast.
//!
//! # Responsibilities
//! - Pick the nonce for each send under a single lock
//! - Build, sign and hash the raw transaction
//! - Persist the record before handing it to the sync engine
//! - Resolve gas parameters from the configured priority table

use alloy::primitives::{Address, Bytes, U256};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::account::AccountStateCache;
use crate::blockchain::signer::TransactionSigner;
use crate::blockchain::types::{
    GasPriority, RawTransaction, Transaction, TransferKind, WalletError, WalletResult,
};
use crate::config::GasConfig;
use crate::events::ObserverRegistry;
use crate::observability::metrics;
use crate::storage::Store;
use crate::sync::SyncEngine;

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Gas limit of a contract token transfer.
pub const TOKEN_TRANSFER_GAS_LIMIT: u64 = 100_000;

/// Gas price every priority tier resolves to unless configured otherwise.
pub const DEFAULT_GAS_PRICE_GWEI: u64 = 10;

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Fixed gas limits plus a three-tier gas price table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPolicy {
    low_wei: u128,
    medium_wei: u128,
    high_wei: u128,
    transfer_gas_limit: u64,
    token_transfer_gas_limit: u64,
}

impl GasPolicy {
    pub fn from_config(config: &GasConfig) -> Self {
        Self {
            low_wei: config.low_gwei as u128 * WEI_PER_GWEI,
            medium_wei: config.medium_gwei as u128 * WEI_PER_GWEI,
            high_wei: config.high_gwei as u128 * WEI_PER_GWEI,
            transfer_gas_limit: config.transfer_gas_limit,
            token_transfer_gas_limit: config.token_transfer_gas_limit,
        }
    }

    /// Gas price in wei for a priority tier.
    pub fn gas_price(&self, priority: GasPriority) -> u128 {
        match priority {
            GasPriority::Low => self.low_wei,
            GasPriority::Medium => self.medium_wei,
            GasPriority::High => self.high_wei,
        }
    }

    /// Fixed gas limit for a transfer kind.
    pub fn gas_limit(&self, kind: TransferKind) -> u64 {
        match kind {
            TransferKind::Plain => self.transfer_gas_limit,
            TransferKind::Token => self.token_transfer_gas_limit,
        }
    }

    /// Maximum fee of a plain transfer, in wei.
    pub fn fee(&self, priority: GasPriority) -> U256 {
        U256::from(self.gas_price(priority)) * U256::from(self.transfer_gas_limit)
    }
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self::from_config(&GasConfig::default())
    }
}

/// Serialized read-nonce, build, sign, persist, broadcast sequence.
pub struct TransactionPipeline {
    sender: Address,
    cache: Arc<AccountStateCache>,
    signer: Arc<dyn TransactionSigner>,
    store: Arc<dyn Store>,
    engine: Arc<dyn SyncEngine>,
    observers: Arc<ObserverRegistry>,
    gas: GasPolicy,
    /// Send lock. Guards the next nonce this pipeline will hand out.
    next_nonce: Mutex<Option<u64>>,
}

impl TransactionPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sender: Address,
        cache: Arc<AccountStateCache>,
        signer: Arc<dyn TransactionSigner>,
        store: Arc<dyn Store>,
        engine: Arc<dyn SyncEngine>,
        observers: Arc<ObserverRegistry>,
        gas: GasPolicy,
    ) -> Self {
        Self {
            sender,
            cache,
            signer,
            store,
            engine,
            observers,
            gas,
            next_nonce: Mutex::new(None),
        }
    }

    /// Send a transfer of `kind`, which selects the fixed gas limit.
    ///
    /// Concurrent calls are serialized; each successful call consumes one nonce.
    pub async fn send(
        &self,
        to: Address,
        value: U256,
        gas_price: u128,
        kind: TransferKind,
    ) -> WalletResult<Transaction> {
        let mut next_nonce = self.next_nonce.lock().await;

        let result = self
            .send_locked(&mut next_nonce, to, value, gas_price, kind)
            .await;
        match &result {
            Ok(_) => metrics::record_send("ok"),
            Err(e) => metrics::record_send(e.kind()),
        }
        result
    }

    async fn send_locked(
        &self,
        next_nonce: &mut Option<u64>,
        to: Address,
        value: U256,
        gas_price: u128,
        kind: TransferKind,
    ) -> WalletResult<Transaction> {
        // 1. Nonce: the cached one, unless this pipeline already moved past it
        let cached = self.cache.nonce().ok_or(WalletError::NoAccountState)?;
        let nonce = next_nonce.map_or(cached, |local| local.max(cached));

        // 2. Build
        let gas_limit = self.gas.gas_limit(kind);
        let raw = RawTransaction {
            to,
            value,
            gas_price,
            gas_limit,
            nonce,
            input: Bytes::new(),
        };

        // 3. Sign and hash
        let signature = self.signer.sign(&raw)?;
        let hash = self.signer.hash(&raw, &signature)?;

        // 4. Record
        let transaction = Transaction {
            hash,
            nonce,
            from: self.sender,
            to,
            value,
            gas_limit,
            gas_price,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };

        // 5. Persist
        self.store
            .save_transactions(std::slice::from_ref(&transaction))?;
        self.observers
            .transactions_changed(std::slice::from_ref(&transaction));

        // 6. Broadcast. The record stays persisted if this fails.
        if let Err(e) = self.engine.send(&raw, &signature).await {
            tracing::warn!(
                tx_hash = %hash,
                nonce = nonce,
                error = %e,
                "Broadcast failed; transaction remains recorded"
            );
            return Err(e.into());
        }

        *next_nonce = Some(nonce + 1);

        tracing::info!(
            tx_hash = %hash,
            nonce = nonce,
            to = %to,
            value = %value,
            gas_price = gas_price,
            "Transaction sent"
        );

        Ok(transaction)
    }

    /// Forget locally consumed nonces, e.g. after the store was cleared.
    pub async fn reset(&self) {
        *self.next_nonce.lock().await = None;
    }

    /// Get the sender address.
    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn gas(&self) -> &GasPolicy {
        &self.gas
    }
}

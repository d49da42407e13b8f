//! Public entry point of the wallet.
//!
//! # Responsibilities
//! - Compose key material, account cache, send pipeline and sync bridge
//! - Expose queries (balance, history, sync state, block height)
//! - Expose commands (start, clear, send)
//! - Hand out observer subscriptions

use alloy::primitives::{Address, TxHash, U256};
use std::sync::Arc;

use crate::account::AccountStateCache;
use crate::blockchain::signer::{LocalSigner, TransactionSigner};
use crate::blockchain::transaction::{GasPolicy, TransactionPipeline};
use crate::blockchain::types::{
    GasPriority, SyncState, Transaction, TransferKind, WalletError, WalletResult,
};
use crate::blockchain::wallet::{Bip44Deriver, KeyDeriver, KeyMaterial};
use crate::config::WalletConfig;
use crate::events::{ObserverRegistry, Subscription, WalletObserver};
use crate::storage::Store;
use crate::sync::{SyncEngine, SyncEventBridge, SyncListener};

/// Light wallet facade over a sync engine, a store and a signer.
pub struct BlockchainFacade {
    keys: KeyMaterial,
    cache: Arc<AccountStateCache>,
    store: Arc<dyn Store>,
    engine: Arc<dyn SyncEngine>,
    pipeline: TransactionPipeline,
    bridge: Arc<SyncEventBridge>,
    observers: Arc<ObserverRegistry>,
}

impl BlockchainFacade {
    /// Derive keys from a BIP-39 seed phrase and build the facade.
    pub fn from_seed_phrase(
        seed_phrase: &str,
        config: &WalletConfig,
        engine: Arc<dyn SyncEngine>,
        store: Arc<dyn Store>,
    ) -> WalletResult<Self> {
        let keys = Bip44Deriver.derive(seed_phrase, &config.network)?;
        Self::new(keys, config, engine, store)
    }

    /// Build the facade with the local signer for `keys`.
    pub fn new(
        keys: KeyMaterial,
        config: &WalletConfig,
        engine: Arc<dyn SyncEngine>,
        store: Arc<dyn Store>,
    ) -> WalletResult<Self> {
        let signer = Arc::new(LocalSigner::new(&keys));
        Self::with_signer(keys, signer, config, engine, store)
    }

    /// Build the facade around an explicit signer.
    ///
    /// The cache is seeded from the store's persisted account state.
    pub fn with_signer(
        keys: KeyMaterial,
        signer: Arc<dyn TransactionSigner>,
        config: &WalletConfig,
        engine: Arc<dyn SyncEngine>,
        store: Arc<dyn Store>,
    ) -> WalletResult<Self> {
        let cache = Arc::new(AccountStateCache::new(
            config.sync.reject_stale_account_states,
        ));
        if let Some(state) = store.account_state()? {
            tracing::debug!(nonce = state.nonce, "Restored account state from store");
            cache.replace(state);
        }

        let observers = Arc::new(ObserverRegistry::new());
        let bridge = Arc::new(SyncEventBridge::new(
            cache.clone(),
            store.clone(),
            observers.clone(),
        ));
        let pipeline = TransactionPipeline::new(
            keys.address(),
            cache.clone(),
            signer,
            store.clone(),
            engine.clone(),
            observers.clone(),
            GasPolicy::from_config(&config.gas),
        );

        tracing::info!(
            address = %keys.checksummed_address(),
            chain_id = keys.chain_id(),
            "Wallet facade initialized"
        );

        Ok(Self {
            keys,
            cache,
            store,
            engine,
            pipeline,
            bridge,
            observers,
        })
    }

    /// Start the sync engine, wired to this wallet's bridge.
    pub async fn start(&self) -> WalletResult<()> {
        self.engine.start(self.sync_listener()).await?;
        tracing::info!("Sync engine started");
        Ok(())
    }

    /// Wipe persisted state. The balance and nonce read as absent until the next sync.
    pub async fn clear(&self) -> WalletResult<()> {
        self.bridge.clear()?;
        self.pipeline.reset().await;
        tracing::info!("Wallet state cleared");
        Ok(())
    }

    /// Wallet address.
    pub fn address(&self) -> Address {
        self.keys.address()
    }

    /// EIP-55 checksummed receive address.
    pub fn receive_address(&self) -> String {
        self.keys.checksummed_address()
    }

    /// Balance of the wallet's own address in wei, as a decimal string.
    ///
    /// Only the derived address is tracked, so there is no address argument.
    /// `None` until the first account state arrives.
    pub fn balance(&self) -> Option<String> {
        self.cache.balance()
    }

    /// Height of the last block header reported by the sync engine.
    pub fn last_block_height(&self) -> WalletResult<Option<u64>> {
        Ok(self.store.last_block_header()?.map(|header| header.height))
    }

    pub fn sync_state(&self) -> SyncState {
        self.engine.sync_state()
    }

    /// Sent transactions in send order. Each call runs a fresh query.
    ///
    /// The store resolves the page (cursor, filter, limit) when called; the
    /// iterator then walks that page and does not observe later sends. Use
    /// `limit` together with `from_hash` to page through long histories.
    ///
    /// * `from_hash` - start after this transaction
    /// * `limit` - maximum number of records
    /// * `address` - keep only transactions from or to this address
    pub fn transaction_history(
        &self,
        from_hash: Option<TxHash>,
        limit: Option<usize>,
        address: Option<Address>,
    ) -> WalletResult<impl Iterator<Item = Transaction>> {
        Ok(self
            .store
            .transaction_history(from_hash, limit, address)?
            .into_iter())
    }

    /// Send `amount` wei to `to`.
    ///
    /// # Arguments
    /// * `to` - Recipient address (hex, 0x prefix optional)
    /// * `amount` - Decimal integer amount in wei
    /// * `priority` - Gas price tier
    pub async fn send(
        &self,
        to: &str,
        amount: &str,
        priority: GasPriority,
    ) -> WalletResult<Transaction> {
        let to = parse_address(to)?;
        let value = parse_amount(amount)?;
        let gas_price = self.pipeline.gas().gas_price(priority);

        self.pipeline
            .send(to, value, gas_price, TransferKind::Plain)
            .await
    }

    /// Token transfers are not supported; always fails with `NotImplemented`.
    pub async fn send_token(
        &self,
        _contract: &str,
        _to: &str,
        _amount: &str,
        _priority: GasPriority,
    ) -> WalletResult<Transaction> {
        Err(WalletError::NotImplemented("token transfer"))
    }

    /// Maximum fee of a plain transfer at `priority`, in wei.
    pub fn fee(&self, priority: GasPriority) -> U256 {
        self.pipeline.gas().fee(priority)
    }

    /// Register an observer until the returned token is dropped or cancelled.
    pub fn subscribe(&self, observer: Arc<dyn WalletObserver>) -> Subscription {
        self.observers.subscribe(observer)
    }

    /// Listener the sync engine reports to.
    pub fn sync_listener(&self) -> Arc<dyn SyncListener> {
        self.bridge.clone()
    }
}

impl std::fmt::Debug for BlockchainFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainFacade")
            .field("address", &self.keys.address())
            .field("chain_id", &self.keys.chain_id())
            .field("account_state", &self.cache.current())
            .finish()
    }
}

fn parse_address(value: &str) -> WalletResult<Address> {
    value
        .trim()
        .parse()
        .map_err(|_| WalletError::InvalidAddress(value.to_string()))
}

fn parse_amount(value: &str) -> WalletResult<U256> {
    let digits = value.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WalletError::InvalidAmount(value.to_string()));
    }
    U256::from_str_radix(digits, 10).map_err(|_| WalletError::InvalidAmount(value.to_string()))
}

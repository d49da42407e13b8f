//! Applies sync engine notifications to the cache and store, then relays them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::account::{AccountStateCache, ReplaceOutcome};
use crate::blockchain::types::{AccountState, BlockHeader, SyncState};
use crate::events::ObserverRegistry;
use crate::observability::metrics;
use crate::storage::{Store, StoreError};
use crate::sync::engine::SyncListener;

/// Single writer of the account state cache.
///
/// Knows nothing about in-flight sends; reconciliation with sent
/// transactions happens implicitly through the nonce in the next snapshot.
///
/// Cache replacement, persistence and relay of one snapshot happen under a
/// single lock, so the store and observers always end on the same snapshot
/// as the cache.
pub struct SyncEventBridge {
    cache: Arc<AccountStateCache>,
    store: Arc<dyn Store>,
    observers: Arc<ObserverRegistry>,
    apply_lock: Mutex<()>,
}

impl SyncEventBridge {
    pub fn new(
        cache: Arc<AccountStateCache>,
        store: Arc<dyn Store>,
        observers: Arc<ObserverRegistry>,
    ) -> Self {
        Self {
            cache,
            store,
            observers,
            apply_lock: Mutex::new(()),
        }
    }

    // The guarded unit holds no data, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.apply_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wipe the store and empty the cache as one step with respect to
    /// incoming notifications.
    pub fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.store.clear()?;
        self.cache.clear();
        Ok(())
    }
}

impl SyncListener for SyncEventBridge {
    fn on_sync_state_changed(&self, state: SyncState) {
        tracing::debug!(state = ?state, "Sync state changed");
        self.observers.sync_state_changed(&state);
    }

    fn on_account_state_changed(&self, state: AccountState) {
        let balance = state.balance.to_string();
        let (nonce, block_height) = (state.nonce, state.block_height);
        let _guard = self.lock();

        // (a) cache
        if self.cache.replace(state.clone()) == ReplaceOutcome::Stale {
            tracing::warn!(
                nonce = nonce,
                block_height = block_height,
                "Dropping account state older than the cached one"
            );
            return;
        }

        // (b) store. Failures stay on this side; the engine is not told.
        if let Err(e) = self.store.save_account_state(&state) {
            tracing::error!(error = %e, "Failed to persist account state");
        }

        tracing::debug!(
            nonce = nonce,
            block_height = block_height,
            balance = %balance,
            "Account state updated"
        );

        // (c) relay
        self.observers.balance_changed(&balance);
    }

    fn on_last_block_header_changed(&self, header: BlockHeader) {
        let _guard = self.lock();
        if let Err(e) = self.store.save_last_block_header(&header) {
            tracing::error!(error = %e, height = header.height, "Failed to persist block header");
        }
        metrics::record_block_height(header.height);
        self.observers.last_block_height_changed(header.height);
    }
}

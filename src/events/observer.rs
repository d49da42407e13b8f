//! Client observers and subscription tokens.

use dashmap::DashMap;
use std::sync::{Arc, Weak};
use uuid::Uuid;

use crate::blockchain::types::{SyncState, Transaction};

/// Receives wallet events. Every method defaults to a no-op.
///
/// Callbacks run on the task that produced the event and must not block.
pub trait WalletObserver: Send + Sync {
    /// New balance in wei, as a decimal string.
    fn on_balance_changed(&self, _balance: &str) {}

    fn on_sync_state_changed(&self, _state: &SyncState) {}

    fn on_last_block_height_changed(&self, _height: u64) {}

    /// Transactions just recorded in the history.
    fn on_transactions_changed(&self, _transactions: &[Transaction]) {}
}

/// Registered observers, keyed by subscription id.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: DashMap<Uuid, Arc<dyn WalletObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer until the returned token is dropped or cancelled.
    pub fn subscribe(self: &Arc<Self>, observer: Arc<dyn WalletObserver>) -> Subscription {
        let id = Uuid::new_v4();
        self.observers.insert(id, observer);
        tracing::debug!(subscription = %id, "Observer subscribed");

        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    fn unsubscribe(&self, id: &Uuid) -> bool {
        let removed = self.observers.remove(id).is_some();
        if removed {
            tracing::debug!(subscription = %id, "Observer unsubscribed");
        }
        removed
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    // Callbacks run outside the map's shard locks so an observer may subscribe or unsubscribe.
    fn snapshot(&self) -> Vec<Arc<dyn WalletObserver>> {
        self.observers
            .iter()
            .map(|r| Arc::clone(r.value()))
            .collect()
    }

    pub fn balance_changed(&self, balance: &str) {
        for observer in self.snapshot() {
            observer.on_balance_changed(balance);
        }
    }

    pub fn sync_state_changed(&self, state: &SyncState) {
        for observer in self.snapshot() {
            observer.on_sync_state_changed(state);
        }
    }

    pub fn last_block_height_changed(&self, height: u64) {
        for observer in self.snapshot() {
            observer.on_last_block_height_changed(height);
        }
    }

    pub fn transactions_changed(&self, transactions: &[Transaction]) {
        for observer in self.snapshot() {
            observer.on_transactions_changed(transactions);
        }
    }
}

/// Cancellation token for an observer registration. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes the observer"]
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    registry: Weak<ObserverRegistry>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Unsubscribe now.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(&self.id);
        }
    }
}

//! Latest known account state.

use arc_swap::ArcSwapOption;
use std::sync::Arc;

use crate::blockchain::types::AccountState;
use crate::observability::metrics;

/// Result of offering a snapshot to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The snapshot is now the current state.
    Applied,
    /// The snapshot was older than the cached one and was dropped.
    Stale,
}

/// Holds the account state last reported by the sync engine.
///
/// Readers never observe a partially updated state: every replacement is a
/// single pointer swap.
pub struct AccountStateCache {
    current: ArcSwapOption<AccountState>,
    reject_stale: bool,
}

impl AccountStateCache {
    /// Create an empty cache.
    ///
    /// With `reject_stale` set, snapshots older than the cached one are dropped.
    pub fn new(reject_stale: bool) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            reject_stale,
        }
    }

    /// Current state, if any snapshot has arrived.
    pub fn current(&self) -> Option<AccountState> {
        self.current.load_full().map(|state| (*state).clone())
    }

    /// Swap in a new snapshot.
    pub fn replace(&self, new: AccountState) -> ReplaceOutcome {
        let new = Arc::new(new);
        let mut outcome = ReplaceOutcome::Applied;

        self.current.rcu(|current| match current {
            Some(cached) if self.reject_stale && new.is_older_than(cached) => {
                outcome = ReplaceOutcome::Stale;
                Some(Arc::clone(cached))
            }
            _ => {
                outcome = ReplaceOutcome::Applied;
                Some(Arc::clone(&new))
            }
        });

        match outcome {
            ReplaceOutcome::Applied => {
                metrics::record_account_state_update("applied");
                metrics::record_account_nonce(new.nonce);
            }
            ReplaceOutcome::Stale => {
                metrics::record_account_state_update("stale");
            }
        }
        outcome
    }

    /// Balance in wei as a decimal string.
    pub fn balance(&self) -> Option<String> {
        self.current
            .load_full()
            .map(|state| state.balance.to_string())
    }

    /// Nonce of the current state.
    pub fn nonce(&self) -> Option<u64> {
        self.current.load_full().map(|state| state.nonce)
    }

    /// Drop the current state; reads return `None` until the next snapshot.
    pub fn clear(&self) {
        self.current.store(None);
    }
}

impl Default for AccountStateCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl std::fmt::Debug for AccountStateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStateCache")
            .field("current", &self.current())
            .field("reject_stale", &self.reject_stale)
            .finish()
    }
}

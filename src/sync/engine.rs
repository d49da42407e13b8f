//! Sync engine contract.

use alloy::primitives::Signature;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::types::{AccountState, BlockHeader, RawTransaction, SyncState};

/// Errors returned when the sync engine does not accept a broadcast.
#[derive(Debug, Error)]
pub enum BroadcastError {
    /// The engine (or its peers) refused the transaction.
    #[error("Broadcast rejected: {0}")]
    Rejected(String),

    /// No peers are available to relay the transaction.
    #[error("Broadcast unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the sync engine lifecycle.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Sync engine failed to start: {0}")]
    Start(String),
}

/// Peer-sync engine. Maintains chain synchronization and relays transactions.
#[async_trait]
pub trait SyncEngine: Send + Sync {
    /// Begin syncing. The engine reports progress and snapshots to `listener`.
    async fn start(&self, listener: Arc<dyn SyncListener>) -> Result<(), SyncError>;

    /// Submit a signed transaction for broadcast.
    ///
    /// Resolves once the engine has accepted the submission; confirmation is
    /// observed later through account-state updates.
    async fn send(&self, raw: &RawTransaction, signature: &Signature) -> Result<(), BroadcastError>;

    /// Current synchronization state.
    fn sync_state(&self) -> SyncState;
}

/// Notifications the sync engine pushes, on its own schedule.
pub trait SyncListener: Send + Sync {
    fn on_sync_state_changed(&self, state: SyncState);

    fn on_account_state_changed(&self, state: AccountState);

    fn on_last_block_header_changed(&self, header: BlockHeader);
}

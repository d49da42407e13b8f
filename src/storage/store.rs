//! Storage contract consumed by the wallet.

use alloy::primitives::{Address, TxHash};
use thiserror::Error;

use crate::blockchain::types::{AccountState, BlockHeader, Transaction};

/// Errors raised by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file could not be encoded or decoded.
    #[error("Storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A writer panicked while holding the store lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Persistent wallet state: account snapshot, last header and sent transactions.
///
/// Calls are expected to be fast and bounded; the send pipeline invokes them
/// while holding the send lock.
pub trait Store: Send + Sync {
    /// Last persisted account state.
    fn account_state(&self) -> Result<Option<AccountState>, StoreError>;

    fn save_account_state(&self, state: &AccountState) -> Result<(), StoreError>;

    /// Append transactions to the history. Records already present are kept as-is.
    fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), StoreError>;

    /// Sent transactions in insertion order.
    ///
    /// * `from_hash` - start after this transaction (exclusive); unknown hashes yield nothing
    /// * `limit` - maximum number of records
    /// * `address` - keep only transactions sent from or to this address
    fn transaction_history(
        &self,
        from_hash: Option<TxHash>,
        limit: Option<usize>,
        address: Option<Address>,
    ) -> Result<Vec<Transaction>, StoreError>;

    fn last_block_header(&self) -> Result<Option<BlockHeader>, StoreError>;

    fn save_last_block_header(&self, header: &BlockHeader) -> Result<(), StoreError>;

    /// Wipe everything. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}

//! In-memory store with optional JSON file persistence.

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use crate::blockchain::types::{AccountState, BlockHeader, Transaction};
use crate::storage::store::{Store, StoreError};

/// Everything the store persists, written as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    account_state: Option<AccountState>,
    last_block_header: Option<BlockHeader>,
    transactions: Vec<Transaction>,
}

/// Store backed by memory and, when given a path, a JSON file rewritten on every change.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Snapshot>,
    persistence_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty, memory-only store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a file-backed store, loading the file if it exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let snapshot = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let snapshot: Snapshot = serde_json::from_reader(reader)?;
            tracing::info!(
                path = %path.display(),
                transactions = snapshot.transactions.len(),
                "Loaded wallet store"
            );
            snapshot
        } else {
            Snapshot::default()
        };

        Ok(Self {
            inner: RwLock::new(snapshot),
            persistence_path: Some(path.to_path_buf()),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Snapshot>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    /// Apply `f` under the write lock, then flush while still holding it.
    fn mutate<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Snapshot),
    {
        let mut guard = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        f(&mut *guard);
        self.flush(&guard)
    }

    fn flush(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };

        // Write to a sibling file and rename so a crash never leaves half a document.
        let tmp = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, snapshot)?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl Store for MemoryStore {
    fn account_state(&self) -> Result<Option<AccountState>, StoreError> {
        Ok(self.read()?.account_state.clone())
    }

    fn save_account_state(&self, state: &AccountState) -> Result<(), StoreError> {
        self.mutate(|snapshot| snapshot.account_state = Some(state.clone()))
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), StoreError> {
        self.mutate(|snapshot| {
            for tx in transactions {
                if snapshot.transactions.iter().any(|known| known.hash == tx.hash) {
                    tracing::debug!(tx_hash = %tx.hash, "Transaction already recorded");
                    continue;
                }
                snapshot.transactions.push(tx.clone());
            }
        })
    }

    fn transaction_history(
        &self,
        from_hash: Option<TxHash>,
        limit: Option<usize>,
        address: Option<Address>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let snapshot = self.read()?;
        let matching: Vec<&Transaction> = snapshot
            .transactions
            .iter()
            .filter(|tx| address.map_or(true, |address| tx.involves(&address)))
            .collect();

        let start = match from_hash {
            Some(hash) => match matching.iter().position(|tx| tx.hash == hash) {
                Some(index) => index + 1,
                None => return Ok(Vec::new()),
            },
            None => 0,
        };

        Ok(matching
            .into_iter()
            .skip(start)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn last_block_header(&self) -> Result<Option<BlockHeader>, StoreError> {
        Ok(self.read()?.last_block_header)
    }

    fn save_last_block_header(&self, header: &BlockHeader) -> Result<(), StoreError> {
        self.mutate(|snapshot| snapshot.last_block_header = Some(*header))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.mutate(|snapshot| *snapshot = Snapshot::default())
    }
}

//! Shared utilities for wallet integration tests.

use alloy::primitives::{Address, Signature, TxHash, U256};
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use light_wallet::blockchain::signer::{LocalSigner, TransactionSigner};
use light_wallet::blockchain::types::{RawTransaction, SignerError};
use light_wallet::blockchain::wallet::{Bip44Deriver, KeyDeriver, KeyMaterial};
use light_wallet::events::WalletObserver;
use light_wallet::storage::{MemoryStore, Store, StoreError};
use light_wallet::sync::{BroadcastError, SyncEngine, SyncError, SyncListener};
use light_wallet::{
    AccountState, BlockHeader, BlockchainFacade, SyncState, Transaction, WalletConfig,
};

/// Well-known development mnemonic (Anvil/Hardhat). NEVER use for real funds.
pub const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Address derived from `TEST_MNEMONIC` at index 0.
#[allow(dead_code)]
pub const SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Address derived from `TEST_MNEMONIC` at index 1.
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

/// Holds a broadcast mid-flight until released.
#[derive(Default)]
pub struct BroadcastGate {
    pub entered: Notify,
    pub release: Notify,
}

/// Sync engine double: records broadcasts and lets tests drive the listener.
#[derive(Default)]
pub struct MockSyncEngine {
    state: Mutex<SyncState>,
    listener: Mutex<Option<Arc<dyn SyncListener>>>,
    broadcasts: Mutex<Vec<(RawTransaction, Signature)>>,
    gate: Mutex<Option<Arc<BroadcastGate>>>,
    fail_broadcasts: AtomicBool,
    starts: AtomicU32,
}

#[allow(dead_code)]
impl MockSyncEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Listener handed over by the last `start` call.
    pub fn listener(&self) -> Arc<dyn SyncListener> {
        self.listener
            .lock()
            .unwrap()
            .clone()
            .expect("sync engine not started")
    }

    pub fn set_sync_state(&self, state: SyncState) {
        *self.state.lock().unwrap() = state.clone();
        self.listener().on_sync_state_changed(state);
    }

    pub fn push_account_state(&self, nonce: u64, balance: u64, block_height: u64) {
        self.listener().on_account_state_changed(AccountState::new(
            nonce,
            U256::from(balance),
            block_height,
        ));
    }

    pub fn broadcasts(&self) -> Vec<(RawTransaction, Signature)> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn broadcast_nonces(&self) -> Vec<u64> {
        self.broadcasts().iter().map(|(raw, _)| raw.nonce).collect()
    }

    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn fail_broadcasts(&self, fail: bool) {
        self.fail_broadcasts.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent broadcasts wait on the returned gate.
    pub fn install_gate(&self) -> Arc<BroadcastGate> {
        let gate = Arc::new(BroadcastGate::default());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn remove_gate(&self) {
        *self.gate.lock().unwrap() = None;
    }
}

#[async_trait]
impl SyncEngine for MockSyncEngine {
    async fn start(&self, listener: Arc<dyn SyncListener>) -> Result<(), SyncError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        *self.listener.lock().unwrap() = Some(listener);
        Ok(())
    }

    async fn send(&self, raw: &RawTransaction, signature: &Signature) -> Result<(), BroadcastError> {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.fail_broadcasts.load(Ordering::SeqCst) {
            return Err(BroadcastError::Rejected("no peers".to_string()));
        }

        self.broadcasts
            .lock()
            .unwrap()
            .push((raw.clone(), *signature));
        Ok(())
    }

    fn sync_state(&self) -> SyncState {
        self.state.lock().unwrap().clone()
    }
}

/// Observer that records every event.
#[derive(Default)]
pub struct RecordingObserver {
    pub balances: Mutex<Vec<String>>,
    pub sync_states: Mutex<Vec<SyncState>>,
    pub heights: Mutex<Vec<u64>>,
    pub transactions: Mutex<Vec<Transaction>>,
}

#[allow(dead_code)]
impl RecordingObserver {
    pub fn balances(&self) -> Vec<String> {
        self.balances.lock().unwrap().clone()
    }

    pub fn sync_states(&self) -> Vec<SyncState> {
        self.sync_states.lock().unwrap().clone()
    }

    pub fn heights(&self) -> Vec<u64> {
        self.heights.lock().unwrap().clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.lock().unwrap().clone()
    }
}

impl WalletObserver for RecordingObserver {
    fn on_balance_changed(&self, balance: &str) {
        self.balances.lock().unwrap().push(balance.to_string());
    }

    fn on_sync_state_changed(&self, state: &SyncState) {
        self.sync_states.lock().unwrap().push(state.clone());
    }

    fn on_last_block_height_changed(&self, height: u64) {
        self.heights.lock().unwrap().push(height);
    }

    fn on_transactions_changed(&self, transactions: &[Transaction]) {
        self.transactions
            .lock()
            .unwrap()
            .extend_from_slice(transactions);
    }
}

struct SlowSave {
    nonce: u64,
    delay: Duration,
    entered: mpsc::Sender<()>,
}

/// Memory store with injectable faults: failing history writes and a slow
/// account-state save for one nonce.
#[allow(dead_code)]
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    fail_transactions: AtomicBool,
    slow_save: Mutex<Option<SlowSave>>,
}

#[allow(dead_code)]
impl FaultyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_transactions(&self, fail: bool) {
        self.fail_transactions.store(fail, Ordering::SeqCst);
    }

    /// Delay saving the account state with `nonce`. The receiver fires when
    /// that save starts.
    pub fn slow_account_save(&self, nonce: u64, delay: Duration) -> mpsc::Receiver<()> {
        let (entered, rx) = mpsc::channel();
        *self.slow_save.lock().unwrap() = Some(SlowSave {
            nonce,
            delay,
            entered,
        });
        rx
    }
}

impl Store for FaultyStore {
    fn account_state(&self) -> Result<Option<AccountState>, StoreError> {
        self.inner.account_state()
    }

    fn save_account_state(&self, state: &AccountState) -> Result<(), StoreError> {
        let slow = self
            .slow_save
            .lock()
            .unwrap()
            .as_ref()
            .filter(|slow| slow.nonce == state.nonce)
            .map(|slow| (slow.delay, slow.entered.clone()));
        if let Some((delay, entered)) = slow {
            let _ = entered.send(());
            std::thread::sleep(delay);
        }
        self.inner.save_account_state(state)
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), StoreError> {
        if self.fail_transactions.load(Ordering::SeqCst) {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.inner.save_transactions(transactions)
    }

    fn transaction_history(
        &self,
        from_hash: Option<TxHash>,
        limit: Option<usize>,
        address: Option<Address>,
    ) -> Result<Vec<Transaction>, StoreError> {
        self.inner.transaction_history(from_hash, limit, address)
    }

    fn last_block_header(&self) -> Result<Option<BlockHeader>, StoreError> {
        self.inner.last_block_header()
    }

    fn save_last_block_header(&self, header: &BlockHeader) -> Result<(), StoreError> {
        self.inner.save_last_block_header(header)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear()
    }
}

/// Local signer that can be switched into failing.
#[allow(dead_code)]
pub struct FailingSigner {
    inner: LocalSigner,
    fail: AtomicBool,
}

#[allow(dead_code)]
impl FailingSigner {
    pub fn new(keys: &KeyMaterial) -> Arc<Self> {
        Arc::new(Self {
            inner: LocalSigner::new(keys),
            fail: AtomicBool::new(false),
        })
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl TransactionSigner for FailingSigner {
    fn sign(&self, raw: &RawTransaction) -> Result<Signature, SignerError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SignerError::Signing("key unavailable".to_string()));
        }
        self.inner.sign(raw)
    }

    fn hash(&self, raw: &RawTransaction, signature: &Signature) -> Result<TxHash, SignerError> {
        self.inner.hash(raw, signature)
    }
}

pub fn test_config() -> WalletConfig {
    let mut config = WalletConfig::default();
    config.network.chain_id = 31337; // Anvil default
    config
}

/// Keys derived from `TEST_MNEMONIC` with `test_config()`.
#[allow(dead_code)]
pub fn test_keys() -> KeyMaterial {
    Bip44Deriver
        .derive(TEST_MNEMONIC, &test_config().network)
        .expect("Failed to derive test keys")
}

/// Started facade over a mock engine and an in-memory store.
pub async fn started_wallet() -> (Arc<BlockchainFacade>, Arc<MockSyncEngine>) {
    let engine = MockSyncEngine::new();
    let store = Arc::new(MemoryStore::new());
    let wallet = BlockchainFacade::from_seed_phrase(TEST_MNEMONIC, &test_config(), engine.clone(), store)
        .expect("Failed to build wallet");
    wallet.start().await.expect("Failed to start wallet");
    (Arc::new(wallet), engine)
}

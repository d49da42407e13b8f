//! Sync notifications, observers and lifecycle.

use alloy::primitives::{B256, U256};
use std::sync::Arc;
use std::time::Duration;

use light_wallet::blockchain::wallet::KeyMaterial;
use light_wallet::storage::{MemoryStore, Store};
use light_wallet::{AccountState, BlockHeader, BlockchainFacade, GasPriority, SyncState, WalletError};

mod common;

#[tokio::test]
async fn test_start_hands_listener_to_engine() {
    let (wallet, engine) = common::started_wallet().await;
    assert_eq!(engine.starts(), 1);
    assert_eq!(wallet.receive_address(), common::SENDER);
    assert_eq!(wallet.sync_state(), SyncState::NotSynced);
}

#[tokio::test]
async fn test_balance_tracks_latest_account_state() {
    let (wallet, engine) = common::started_wallet().await;
    assert!(wallet.balance().is_none());

    engine.push_account_state(5, 1000, 100);
    assert_eq!(wallet.balance().as_deref(), Some("1000"));

    engine.push_account_state(6, 990, 101);
    assert_eq!(wallet.balance().as_deref(), Some("990"));
}

#[tokio::test]
async fn test_out_of_order_state_dropped() {
    let (wallet, engine) = common::started_wallet().await;
    let observer = Arc::new(common::RecordingObserver::default());
    let _subscription = wallet.subscribe(observer.clone());

    engine.push_account_state(6, 990, 101);
    engine.push_account_state(5, 1000, 100);

    assert_eq!(wallet.balance().as_deref(), Some("990"));
    assert_eq!(observer.balances(), vec!["990".to_string()]);

    let tx = wallet.send(common::RECIPIENT, "1", GasPriority::Medium).await.unwrap();
    assert_eq!(tx.nonce, 6);
}

#[tokio::test]
async fn test_out_of_order_state_applied_when_unchecked() {
    let engine = common::MockSyncEngine::new();
    let mut config = common::test_config();
    config.sync.reject_stale_account_states = false;
    let wallet = BlockchainFacade::from_seed_phrase(
        common::TEST_MNEMONIC,
        &config,
        engine.clone(),
        Arc::new(MemoryStore::new()),
    )
    .unwrap();
    wallet.start().await.unwrap();

    engine.push_account_state(6, 990, 101);
    engine.push_account_state(5, 1000, 100);
    assert_eq!(wallet.balance().as_deref(), Some("1000"));
}

#[tokio::test]
async fn test_observer_receives_relayed_events() {
    let (wallet, engine) = common::started_wallet().await;
    let observer = Arc::new(common::RecordingObserver::default());
    let _subscription = wallet.subscribe(observer.clone());

    engine.set_sync_state(SyncState::Syncing { progress: Some(0.5) });
    engine.set_sync_state(SyncState::Synced);
    engine.push_account_state(1, 42, 7);
    engine.listener().on_last_block_header_changed(BlockHeader {
        height: 7,
        hash: B256::repeat_byte(0x07),
    });

    assert_eq!(
        observer.sync_states(),
        vec![SyncState::Syncing { progress: Some(0.5) }, SyncState::Synced]
    );
    assert_eq!(observer.balances(), vec!["42".to_string()]);
    assert_eq!(observer.heights(), vec![7]);
    assert_eq!(wallet.sync_state(), SyncState::Synced);
    assert_eq!(wallet.last_block_height().unwrap(), Some(7));
}

#[tokio::test]
async fn test_dropped_subscription_stops_events() {
    let (wallet, engine) = common::started_wallet().await;
    let observer = Arc::new(common::RecordingObserver::default());

    let subscription = wallet.subscribe(observer.clone());
    engine.push_account_state(1, 10, 1);
    subscription.cancel();
    engine.push_account_state(2, 20, 2);

    assert_eq!(observer.balances(), vec!["10".to_string()]);
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let (wallet, engine) = common::started_wallet().await;
    engine.push_account_state(5, 1000, 100);
    engine.listener().on_last_block_header_changed(BlockHeader {
        height: 100,
        hash: B256::ZERO,
    });
    wallet.send(common::RECIPIENT, "10", GasPriority::Medium).await.unwrap();

    wallet.clear().await.unwrap();
    wallet.clear().await.unwrap();

    assert!(wallet.balance().is_none());
    assert_eq!(wallet.last_block_height().unwrap(), None);
    assert_eq!(wallet.transaction_history(None, None, None).unwrap().count(), 0);

    let result = wallet.send(common::RECIPIENT, "10", GasPriority::Medium).await;
    assert!(matches!(result, Err(WalletError::NoAccountState)));
}

#[tokio::test]
async fn test_clear_resets_local_nonce() {
    let (wallet, engine) = common::started_wallet().await;
    engine.push_account_state(5, 1000, 100);
    wallet.send(common::RECIPIENT, "10", GasPriority::Medium).await.unwrap();
    wallet.send(common::RECIPIENT, "10", GasPriority::Medium).await.unwrap();

    wallet.clear().await.unwrap();

    // Resynced from scratch: the chain is the only source of truth again.
    engine.push_account_state(3, 1000, 1);
    let tx = wallet.send(common::RECIPIENT, "10", GasPriority::Medium).await.unwrap();
    assert_eq!(tx.nonce, 3);
}

#[tokio::test]
async fn test_account_state_restored_from_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallet.json");

    {
        let store = MemoryStore::open(&path).unwrap();
        store
            .save_account_state(&AccountState::new(9, U256::from(77), 50))
            .unwrap();
    }

    let engine = common::MockSyncEngine::new();
    let store = Arc::new(MemoryStore::open(&path).unwrap());
    let wallet =
        BlockchainFacade::from_seed_phrase(common::TEST_MNEMONIC, &common::test_config(), engine.clone(), store)
            .unwrap();
    wallet.start().await.unwrap();

    assert_eq!(wallet.balance().as_deref(), Some("77"));
    let tx = wallet.send(common::RECIPIENT, "1", GasPriority::Medium).await.unwrap();
    assert_eq!(tx.nonce, 9);
}

#[tokio::test]
async fn test_private_key_wallet() {
    // Anvil account #0, same address as the test mnemonic.
    let keys = KeyMaterial::from_private_key(
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        31337,
    )
    .unwrap();
    let engine = common::MockSyncEngine::new();
    let wallet = BlockchainFacade::new(
        keys,
        &common::test_config(),
        engine.clone(),
        Arc::new(MemoryStore::new()),
    )
    .unwrap();

    assert_eq!(wallet.receive_address(), common::SENDER);
}

#[test]
fn test_invalid_seed_phrase() {
    let engine = common::MockSyncEngine::new();
    let result = BlockchainFacade::from_seed_phrase(
        "definitely not a mnemonic",
        &common::test_config(),
        engine,
        Arc::new(MemoryStore::new()),
    );
    assert!(matches!(result, Err(WalletError::KeyDerivation(_))));
}

#[test]
fn test_overlapping_account_states_end_on_newest() {
    let store = common::FaultyStore::new();
    let entered = store.slow_account_save(5, Duration::from_millis(200));
    let wallet = BlockchainFacade::from_seed_phrase(
        common::TEST_MNEMONIC,
        &common::test_config(),
        common::MockSyncEngine::new(),
        store.clone(),
    )
    .unwrap();
    let observer = Arc::new(common::RecordingObserver::default());
    let _subscription = wallet.subscribe(observer.clone());
    let listener = wallet.sync_listener();

    let older = {
        let listener = Arc::clone(&listener);
        std::thread::spawn(move || {
            listener.on_account_state_changed(AccountState::new(5, U256::from(1000), 100));
        })
    };

    // The older snapshot is mid-save when the newer one arrives.
    entered.recv().unwrap();
    listener.on_account_state_changed(AccountState::new(6, U256::from(990), 101));
    older.join().unwrap();

    assert_eq!(wallet.balance().as_deref(), Some("990"));
    assert_eq!(store.account_state().unwrap().map(|state| state.nonce), Some(6));
    assert_eq!(observer.balances().last().map(String::as_str), Some("990"));
}

#[tokio::test]
async fn test_clear_waits_for_account_state_in_progress() {
    let store = common::FaultyStore::new();
    let entered = store.slow_account_save(5, Duration::from_millis(200));
    let wallet = BlockchainFacade::from_seed_phrase(
        common::TEST_MNEMONIC,
        &common::test_config(),
        common::MockSyncEngine::new(),
        store.clone(),
    )
    .unwrap();
    let listener = wallet.sync_listener();

    let update = std::thread::spawn(move || {
        listener.on_account_state_changed(AccountState::new(5, U256::from(1000), 100));
    });
    entered.recv().unwrap();

    wallet.clear().await.unwrap();
    update.join().unwrap();

    // Store and cache agree: both empty.
    assert!(wallet.balance().is_none());
    assert!(store.account_state().unwrap().is_none());
}

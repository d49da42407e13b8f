//! Light wallet orchestration core.
//!
//! Bridges an external peer-sync engine, a persistent store and a local
//! transaction signer behind [`BlockchainFacade`].

pub mod account;
pub mod blockchain;
pub mod config;
pub mod events;
pub mod facade;
pub mod observability;
pub mod storage;
pub mod sync;

pub use blockchain::types::{
    AccountState, BlockHeader, GasPriority, SyncState, Transaction, WalletError, WalletResult,
};
pub use config::WalletConfig;
pub use events::{Subscription, WalletObserver};
pub use facade::BlockchainFacade;

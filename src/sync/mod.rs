//! Sync engine integration.
//!
//! # Data Flow
//! ```text
//! SyncEngine (external, own schedule)
//!     → SyncListener callbacks
//!     → bridge.rs
//!         → account::AccountStateCache (replace)
//!         → storage::Store (persist)
//!         → events::ObserverRegistry (relay)
//! ```
//!
//! # Design Decisions
//! - The bridge is the only writer of the account state cache
//! - Bridge callbacks never take the send lock, so they run while a send is in flight
//! - Sync-path failures are logged, never returned to the engine

pub mod bridge;
pub mod engine;

pub use bridge::SyncEventBridge;
pub use engine::{BroadcastError, SyncEngine, SyncError, SyncListener};

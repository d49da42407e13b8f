//! Wallet persistence.
//!
//! # Data Flow
//! ```text
//! send pipeline ──(append transaction)──┐
//!                                       ├─→ store.rs (Store trait)
//! sync bridge ──(account state, header)─┘        │
//!                                                 └─→ memory.rs (RwLock snapshot → JSON file)
//! ```
//!
//! # Design Decisions
//! - History is append-only; records are never updated
//! - File persistence rewrites the whole document atomically (tmp + rename)

pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::{Store, StoreError};

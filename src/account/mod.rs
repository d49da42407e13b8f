//! Account state tracking.
//!
//! # Data Flow
//! ```text
//! sync engine snapshot
//!     → sync::bridge (single writer)
//!     → cache.rs (atomic swap)
//!     → read by the send pipeline (nonce) and the facade (balance)
//! ```

pub mod cache;

pub use cache::{AccountStateCache, ReplaceOutcome};

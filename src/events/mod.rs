//! Client-facing event delivery.
//!
//! # Data Flow
//! ```text
//! sync bridge / send pipeline
//!     → ObserverRegistry (snapshot of subscribers)
//!     → WalletObserver callbacks
//! ```
//!
//! Observers are injected through `subscribe`; the returned `Subscription`
//! token removes the observer when cancelled or dropped.

pub mod observer;

pub use observer::{ObserverRegistry, Subscription, WalletObserver};

//! Key material, signing and the send pipeline.
//!
//! # Data Flow
//! ```text
//! Seed phrase + network parameters
//!     → wallet.rs (BIP-44 derivation → KeyMaterial)
//!     → signer.rs (EIP-155 signing, canonical hash)
//!     → transaction.rs (nonce, build, sign, persist, broadcast)
//! ```
//!
//! # Security Constraints
//! - Seed phrases and private keys are never logged
//! - Only the signer touches the signing key
//! - One send at a time per wallet; nonces are never handed out twice

pub mod signer;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use signer::{LocalSigner, TransactionSigner};
pub use transaction::{GasPolicy, TransactionPipeline};
pub use types::{
    AccountState, BlockHeader, GasPriority, KeyDerivationError, RawTransaction, SignerError,
    SyncState, Transaction, TransferKind, WalletError, WalletResult,
};
pub use wallet::{Bip44Deriver, KeyDeriver, KeyMaterial};

//! # Cardano Library
//!
//! Wallet-facing Cardano logic for the explorer: the CIP-30 provider capability,
//! address network inspection, delegation certificates, transaction assembly, and
//! the delegation pipeline (build, sign, submit, retry once, classify).
//!
//! ## Modules
//!
//! - [`provider`]: `WalletProvider` / `WalletApi` traits consumed from the browser bridge
//! - [`address`]: network detection from bech32 HRPs and Shelley header bytes
//! - [`certificate`]: stake registration, stake delegation, and vote delegation certificates
//! - [`transaction`]: transaction drafts and completion (coin selection, fee, deposit)
//! - [`classify`]: provider error classification into [`DelegationError`]
//! - [`retry`]: bounded retry-once combinator
//! - [`delegation`]: the delegation transaction builder
//! - [`notify`]: fire-and-forget delegation notifications
//! - [`sim`]: in-process simulated wallet for demos and tests

pub mod address;
pub mod certificate;
pub mod classify;
pub mod delegation;
pub mod error;
pub mod notify;
pub mod provider;
pub mod retry;
pub mod sim;
pub mod transaction;

// Re-export commonly used types from root for convenience
pub use certificate::{Certificate, DRep};
pub use delegation::{DelegationOutcome, DelegationReceipt, DelegationService, DelegationSettings};
pub use error::{BuildError, DelegationError, NotifyError, ProviderError};
pub use notify::{DelegationNotifier, HttpNotifier, NoopNotifier};
pub use provider::{WalletApi, WalletHandle, WalletProvider};
pub use transaction::{LocalCompleter, ProtocolParams, TxCompleter, TxDraft, TxOutput, UnsignedTx, Utxo};

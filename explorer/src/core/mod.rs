//! # Core Abstractions
//!
//! Error types for the explorer application layer.
//!
//! - **[`error`]**: [`ConnectError`] for explicit wallet connections, [`DelegationBusy`]
//!   when a second delegation is requested
//!
//! Lower layers bring their own: [`lib_core::AppError`] for configuration and
//! storage, [`lib_cardano::DelegationError`] for delegation outcomes.

pub mod error;

pub use error::{ConnectError, ConnectResult, DelegationBusy};

//! # Data Transfer Objects (DTOs)
//!
//! ## Module Organization
//!
//! - [`wallet`] - Wallet identity, provider types, networks
//! - [`delegation`] - Delegation requests, kinds, and the delegation info record

pub mod delegation;
pub mod wallet;

pub use delegation::*;
pub use wallet::*;

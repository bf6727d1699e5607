//! # Services
//!
//! Long-lived components that talk to the wallet provider.
//!
//! - [`connection`]: reconnection after reload, explicit connect / disconnect

pub mod connection;

pub use connection::{ConnectOutcome, ConnectionManager, ReconnectOutcome};

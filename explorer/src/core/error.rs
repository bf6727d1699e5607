//! # Connection Errors
//!
//! Failures of an explicit `connect`, and the busy signal of the delegation
//! runner. Delegation failures are reported through
//! [`lib_cardano::DelegationError`] instead; storage failures keep their
//! [`lib_core::AppError`] source.

use lib_cardano::classify::{is_user_cancelled, FailureStage};
use lib_cardano::ProviderError;
use shared::dto::wallet::Network;
use thiserror::Error;

/// Explicit connection failure.
///
/// The identity is reset to disconnected for every variant except
/// [`ConnectError::NoAddress`], which leaves the previous state untouched.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The wallet's address belongs to another network.
    #[error("Wallet is not on {0}")]
    WrongNetwork(Network),

    /// Neither used nor unused addresses were returned.
    #[error("No address found in wallet")]
    NoAddress,

    /// The provider refused or failed to enable the extension.
    #[error("Failed to enable wallet: {0}")]
    Enable(ProviderError),

    /// The enabled wallet failed to answer an address query.
    #[error("Wallet query failed: {0}")]
    Provider(ProviderError),

    /// A disconnect happened while this connect was in flight.
    #[error("Connection superseded by a disconnect")]
    Superseded,

    #[error(transparent)]
    Storage(#[from] lib_core::AppError),
}

impl ConnectError {
    /// Message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ConnectError::WrongNetwork(network) => format!("Please switch your wallet to {}", network.name()),
            ConnectError::NoAddress => "No address found in your wallet".to_string(),
            ConnectError::Enable(err) if is_user_cancelled(FailureStage::Query, err) => {
                "Wallet connection was rejected".to_string()
            }
            ConnectError::Enable(_) | ConnectError::Provider(_) => {
                "Could not connect to your wallet. Make sure the extension is installed and unlocked".to_string()
            }
            ConnectError::Superseded => "Wallet connection cancelled".to_string(),
            ConnectError::Storage(err) => err.user_message(),
        }
    }
}

/// Convenience type alias for `Result<T, ConnectError>`.
pub type ConnectResult<T> = std::result::Result<T, ConnectError>;

/// A delegation was requested while another one is still waiting on the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("A delegation is already in progress")]
pub struct DelegationBusy;

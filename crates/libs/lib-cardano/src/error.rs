//! # Wallet and Delegation Errors
//!
//! - [`ProviderError`]: raw error shape returned by a CIP-30 wallet
//!   (`{ code, info }`). Never shown to the user directly.
//! - [`DelegationError`]: the closed, user-facing taxonomy every delegation failure
//!   is converted into before it leaves [`crate::delegation`].
//! - [`BuildError`]: transaction completion failures.
//! - [`NotifyError`]: delegation notification failures (logged, never surfaced).

use serde::{Deserialize, Serialize};
use shared::dto::delegation::DelegationKind;
use thiserror::Error;

/// Error as reported by a wallet extension.
///
/// CIP-30 wallets reject with `{ code, info }` objects (`APIError`, `TxSignError`,
/// `TxSendError`); some reject with a bare string, which maps to `code: None`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{info}")]
pub struct ProviderError {
    pub code: Option<i32>,
    pub info: String,
}

impl ProviderError {
    pub fn new(info: impl Into<String>) -> Self {
        Self {
            code: None,
            info: info.into(),
        }
    }

    pub fn with_code(code: i32, info: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            info: info.into(),
        }
    }
}

/// Transaction completion errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("No inputs available to fund the transaction")]
    NoInputs,

    #[error("Insufficient funds: {required} lovelace required, {available} available")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    #[error("Failed to serialize transaction: {0}")]
    Serialize(String),
}

/// Delegation failure, classified for the user.
///
/// Every variant maps to exactly one message via [`DelegationError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelegationError {
    /// No live wallet handle.
    #[error("Wallet not connected")]
    NotConnected,

    #[error("Pool ID is missing")]
    MissingPoolId,

    #[error("DRep ID is missing")]
    MissingDRepId,

    #[error("No reward address found in wallet")]
    NoRewardAddress,

    #[error("No UTxOs found in wallet")]
    NoUtxos,

    /// Wallet network differs from the donation target or explorer network.
    #[error("Network mismatch: {0}")]
    NetworkMismatch(String),

    /// On-chain precondition failure: the stake key has no registration certificate.
    #[error("Stake key is not registered")]
    StakeKeyNotRegistered,

    #[error("Transaction cancelled by user")]
    UserCancelled,

    #[error("Hardware wallet error: {0}")]
    HardwareWallet(String),

    /// Anything else. `reason` is kept for logs only.
    #[error("{} failed: {reason}", failure_label(.kind))]
    Failed { kind: DelegationKind, reason: String },
}

fn failure_label(kind: &DelegationKind) -> &'static str {
    match kind {
        DelegationKind::Pool => "Delegation",
        DelegationKind::Drep => "DRep delegation",
    }
}

impl DelegationError {
    pub fn failed(kind: DelegationKind, reason: impl Into<String>) -> Self {
        DelegationError::Failed {
            kind,
            reason: reason.into(),
        }
    }

    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            DelegationError::NotConnected => "Please connect your wallet first".to_string(),
            DelegationError::MissingPoolId => "Pool ID is missing".to_string(),
            DelegationError::MissingDRepId => "DRep ID is missing".to_string(),
            DelegationError::NoRewardAddress => "No reward address found in your wallet".to_string(),
            DelegationError::NoUtxos => {
                "No UTxOs found in your wallet. You need ADA to pay the deposit and transaction fees"
                    .to_string()
            }
            DelegationError::NetworkMismatch(detail) => detail.clone(),
            DelegationError::StakeKeyNotRegistered => {
                "Your stake key is not registered yet".to_string()
            }
            DelegationError::UserCancelled => "Transaction cancelled".to_string(),
            DelegationError::HardwareWallet(_) => {
                "Hardware wallet error. Check that your device is connected and unlocked, then try again"
                    .to_string()
            }
            DelegationError::Failed { kind, .. } => format!("{} failed", failure_label(kind)),
        }
    }

    /// True for failures caused by the user rather than by the wallet or chain.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, DelegationError::UserCancelled)
    }
}

/// Delegation notification errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notification endpoint returned status {0}")]
    Status(u16),

    #[error("Notification rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_failure_message_is_kind_specific() {
        assert_eq!(
            DelegationError::failed(DelegationKind::Pool, "boom").user_message(),
            "Delegation failed"
        );
        assert_eq!(
            DelegationError::failed(DelegationKind::Drep, "boom").user_message(),
            "DRep delegation failed"
        );
        assert_eq!(
            DelegationError::failed(DelegationKind::Drep, "boom").to_string(),
            "DRep delegation failed: boom"
        );
    }

    #[test]
    fn test_hardware_message_points_at_device() {
        let message = DelegationError::HardwareWallet("transport error".to_string()).user_message();
        assert!(message.contains("device"));
        assert!(!message.contains("transport error"));
    }

    #[test]
    fn test_provider_error_displays_info() {
        let err = ProviderError::with_code(2, "user declined sign tx");
        assert_eq!(err.to_string(), "user declined sign tx");
    }
}

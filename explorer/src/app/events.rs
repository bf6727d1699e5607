//! # Application Events
//!
//! Event types sent from background tasks to the UI side over an
//! `async_channel`. Each event is rendered at most once: a toast, a modal, or a
//! navigation.

use crate::app::pending_action::DelegationTarget;
use lib_cardano::DelegationOutcome;
use shared::dto::wallet::ProviderType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Async task results sent to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Short user-facing message
    Toast { level: ToastLevel, message: String },
    /// A wallet was connected explicitly
    WalletConnected { provider: ProviderType, address: String },
    /// Identity and handle were cleared
    WalletDisconnected,
    /// No auth token exists for the connected address; open the sign-in modal
    OpenAuthorization { address: String },
    /// Delegation intent found but the wallet is not ready
    PromptConnectWallet { target: Option<DelegationTarget> },
    /// Delegation intent found and the wallet is ready
    PromptConfirmDelegation { target: Option<DelegationTarget> },
    /// A delegation attempt finished; carries its single outcome message
    DelegationFinished(DelegationOutcome),
}

impl AppEvent {
    pub fn toast(level: ToastLevel, message: impl Into<String>) -> Self {
        AppEvent::Toast {
            level,
            message: message.into(),
        }
    }
}

//! # Provider Error Classification
//!
//! Wallets report failures as free-form `{ code, info }` objects whose wording
//! differs per extension and per hardware device. Everything that inspects that
//! wording lives here, so a change in one wallet's messages touches one file.

use crate::error::{DelegationError, ProviderError};
use shared::dto::delegation::DelegationKind;

/// Ledger rule name reported when a delegation certificate references an
/// unregistered stake credential.
pub const STAKE_KEY_NOT_REGISTERED_MARKER: &str = "StakeKeyNotRegisteredDELEG";

/// CIP-30 `TxSignError.UserDeclined`.
const SIGN_USER_DECLINED: i32 = 2;
/// CIP-30 `APIError.Refused`.
const API_REFUSED: i32 = -3;

const CANCEL_MARKERS: &[&str] = &[
    "user declined",
    "user rejected",
    "user denied",
    "user cancel",
    "rejected by user",
    "declined by user",
    "cancelled by user",
    "canceled by user",
    "user abort",
    "0x6985",
];

const HARDWARE_MARKERS: &[&str] = &[
    "ledger",
    "trezor",
    "keystone",
    "hardware",
    "device",
    "transport",
    "webusb",
    "webhid",
    "0x6e01",
    "0x6e00",
];

/// Wallet call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Reading addresses or UTxOs.
    Query,
    Sign,
    Submit,
}

pub fn is_stake_key_unregistered(err: &ProviderError) -> bool {
    let info = err.info.to_ascii_lowercase();
    err.info.contains(STAKE_KEY_NOT_REGISTERED_MARKER)
        || info.contains("stake key not registered")
        || info.contains("stakekeynotregistered")
}

pub fn is_user_cancelled(stage: FailureStage, err: &ProviderError) -> bool {
    match err.code {
        Some(API_REFUSED) => return true,
        Some(SIGN_USER_DECLINED) if stage == FailureStage::Sign => return true,
        _ => {}
    }
    let info = err.info.to_ascii_lowercase();
    CANCEL_MARKERS.iter().any(|m| info.contains(m))
}

pub fn is_hardware_wallet_issue(err: &ProviderError) -> bool {
    let info = err.info.to_ascii_lowercase();
    HARDWARE_MARKERS.iter().any(|m| info.contains(m))
}

/// Classify a wallet failure into the user-facing taxonomy.
///
/// Checked in order: stake key not registered (submit only), user cancellation,
/// hardware device issue, then a generic failure for `kind`.
pub fn classify(kind: DelegationKind, stage: FailureStage, err: &ProviderError) -> DelegationError {
    if stage == FailureStage::Submit && is_stake_key_unregistered(err) {
        DelegationError::StakeKeyNotRegistered
    } else if is_user_cancelled(stage, err) {
        DelegationError::UserCancelled
    } else if is_hardware_wallet_issue(err) {
        DelegationError::HardwareWallet(err.info.clone())
    } else {
        DelegationError::failed(kind, err.info.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stake_key_marker_only_on_submit() {
        let err = ProviderError::new(
            "ApplyTxError [ConwayCertsFailure (CertFailure (DelegFailure (StakeKeyNotRegisteredDELEG ...)))]",
        );
        assert_eq!(
            classify(DelegationKind::Pool, FailureStage::Submit, &err),
            DelegationError::StakeKeyNotRegistered
        );
        assert!(matches!(
            classify(DelegationKind::Pool, FailureStage::Sign, &err),
            DelegationError::Failed { .. }
        ));
    }

    #[test]
    fn test_cancellation_by_code_and_text() {
        let declined = ProviderError::with_code(2, "sign failed");
        assert_eq!(classify(DelegationKind::Pool, FailureStage::Sign, &declined), DelegationError::UserCancelled);

        let refused = ProviderError::with_code(-3, "refused");
        assert_eq!(classify(DelegationKind::Drep, FailureStage::Submit, &refused), DelegationError::UserCancelled);

        let text = ProviderError::new("User declined to sign the transaction");
        assert_eq!(classify(DelegationKind::Pool, FailureStage::Sign, &text), DelegationError::UserCancelled);

        let ledger_denied = ProviderError::new("Ledger device: Condition of use not satisfied (denied by the user?) (0x6985)");
        assert_eq!(
            classify(DelegationKind::Pool, FailureStage::Sign, &ledger_denied),
            DelegationError::UserCancelled
        );
    }

    #[test]
    fn test_hardware_wallet_issue() {
        let err = ProviderError::new("TransportStatusError: Ledger device is locked");
        assert!(matches!(
            classify(DelegationKind::Pool, FailureStage::Sign, &err),
            DelegationError::HardwareWallet(_)
        ));
    }

    #[test]
    fn test_generic_failure_carries_kind() {
        let err = ProviderError::with_code(-2, "Internal error");
        let classified = classify(DelegationKind::Drep, FailureStage::Submit, &err);
        assert_eq!(classified.user_message(), "DRep delegation failed");
    }
}

//! # Delegation Transaction Builder
//!
//! Turns a [`DelegationRequest`] and a live wallet handle into a submitted
//! transaction, or exactly one classified [`DelegationError`].
//!
//! ## Pipeline
//!
//! 1. Preconditions, each short-circuiting in this order: wallet handle present,
//!    identifier non-empty, reward address, at least one UTxO, donation network.
//! 2. Draft: delegation certificate (stake or vote), optional donation output,
//!    wallet UTxOs as inputs, wallet change address.
//! 3. Complete, sign, submit.
//! 4. If submit reports an unregistered stake key, the draft is rebuilt with a
//!    stake registration certificate in front and step 3 runs once more.
//! 5. On success the [`DelegationInfo`] record goes to the notifier on a
//!    detached task.
//!
//! No timeouts are applied; wallet prompts may take as long as the user needs.

use crate::address::ensure_same_network;
use crate::certificate::Certificate;
use crate::classify::{classify, FailureStage};
use crate::error::{BuildError, DelegationError};
use crate::notify::{dispatch, DelegationNotifier};
use crate::provider::{primary_address, reward_address, WalletHandle};
use crate::retry::{Attempt, AttemptError, RetryOnce};
use crate::transaction::{TxCompleter, TxDraft};
use lib_core::config::{Config, LOVELACE_PER_ADA};
use shared::dto::delegation::{DelegationInfo, DelegationKind, DelegationRequest};
use shared::dto::wallet::Network;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// region: --- Settings

/// Configuration the builder needs.
#[derive(Debug, Clone)]
pub struct DelegationSettings {
    pub network: Network,
    pub donation_address: String,
    pub lovelace_per_ada: u64,
}

impl DelegationSettings {
    pub fn new(network: Network, donation_address: impl Into<String>) -> Self {
        Self {
            network,
            donation_address: donation_address.into(),
            lovelace_per_ada: LOVELACE_PER_ADA,
        }
    }

    /// Whole ADA to lovelace, rounded to the nearest unit.
    ///
    /// `None` when the amount is negative, not finite, or does not fit in a `u64`.
    pub fn to_lovelace(&self, ada: f64) -> Option<u64> {
        let lovelace = (ada * self.lovelace_per_ada as f64).round();
        if !lovelace.is_finite() || lovelace < 0.0 || lovelace >= u64::MAX as f64 {
            return None;
        }
        Some(lovelace as u64)
    }
}

impl From<&Config> for DelegationSettings {
    fn from(config: &Config) -> Self {
        Self {
            network: config.network,
            donation_address: config.donation_address.clone(),
            lovelace_per_ada: config.lovelace_per_ada,
        }
    }
}

// endregion: --- Settings

// region: --- Outcome

/// Successful delegation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationReceipt {
    pub tx_hash: String,
    pub fee: u64,
    /// True when the submitted transaction also registered the stake key.
    pub registered_stake_key: bool,
}

/// Final result of one delegation attempt, as reported to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegationOutcome {
    Success { tx_hash: String },
    Failure(DelegationError),
}

impl DelegationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DelegationOutcome::Success { .. })
    }

    /// The one message shown for this outcome.
    pub fn user_message(&self) -> String {
        match self {
            DelegationOutcome::Success { tx_hash } => {
                format!("Delegation submitted. Transaction: {}", shared::truncate_address(tx_hash))
            }
            DelegationOutcome::Failure(err) => err.user_message(),
        }
    }
}

// endregion: --- Outcome

struct Submitted {
    tx_hash: String,
    fee: u64,
    registered_stake_key: bool,
}

/// Delegation transaction builder.
///
/// Holds no per-delegation state; callers serialize attempts per wallet.
#[derive(Clone)]
pub struct DelegationService {
    settings: DelegationSettings,
    completer: Arc<dyn TxCompleter>,
    notifier: Arc<dyn DelegationNotifier>,
}

impl DelegationService {
    pub fn new(
        settings: DelegationSettings,
        completer: Arc<dyn TxCompleter>,
        notifier: Arc<dyn DelegationNotifier>,
    ) -> Self {
        Self {
            settings,
            completer,
            notifier,
        }
    }

    pub fn settings(&self) -> &DelegationSettings {
        &self.settings
    }

    /// Run the delegation and fold the result into a [`DelegationOutcome`].
    pub async fn execute(&self, wallet: Option<&WalletHandle>, request: &DelegationRequest) -> DelegationOutcome {
        match self.delegate(wallet, request).await {
            Ok(receipt) => DelegationOutcome::Success {
                tx_hash: receipt.tx_hash,
            },
            Err(err) => {
                if err.is_cancellation() {
                    info!(kind = %request.kind, "Delegation cancelled by user");
                } else {
                    warn!(kind = %request.kind, error = %err, "Delegation failed");
                }
                DelegationOutcome::Failure(err)
            }
        }
    }

    /// Build, sign, and submit a delegation transaction.
    ///
    /// # Arguments
    ///
    /// * `wallet` - Live wallet handle; `None` always yields [`DelegationError::NotConnected`]
    /// * `request` - Delegation target and optional donation
    ///
    /// # Errors
    ///
    /// Every failure is already classified; no raw provider error is returned.
    #[instrument(skip_all, fields(kind = %request.kind, ident = %request.ident))]
    pub async fn delegate(
        &self,
        wallet: Option<&WalletHandle>,
        request: &DelegationRequest,
    ) -> Result<DelegationReceipt, DelegationError> {
        let wallet = wallet.ok_or(DelegationError::NotConnected)?;
        let kind = request.kind;

        if request.ident.trim().is_empty() {
            return Err(match kind {
                DelegationKind::Pool => DelegationError::MissingPoolId,
                DelegationKind::Drep => DelegationError::MissingDRepId,
            });
        }

        let reward = reward_address(wallet.as_ref())
            .await
            .map_err(|e| {
                debug!(error = %e, "Reward address query failed");
                DelegationError::NoRewardAddress
            })?
            .ok_or(DelegationError::NoRewardAddress)?;

        let utxos = wallet.get_utxos().await.map_err(|e| {
            debug!(error = %e, "UTxO query failed");
            DelegationError::NoUtxos
        })?;
        if utxos.is_empty() {
            return Err(DelegationError::NoUtxos);
        }

        let donation = request.donation();
        if donation.is_some() {
            ensure_same_network(&self.settings.donation_address, &reward)
                .map_err(DelegationError::NetworkMismatch)?;
        }

        let change_address = self.change_address(wallet, kind).await?;

        let mut base = TxDraft::new(change_address)
            .add_certificate(Certificate::for_request(request, &reward))
            .with_inputs(utxos);
        if let Some(ada) = donation {
            let lovelace = self
                .settings
                .to_lovelace(ada)
                .ok_or_else(|| DelegationError::failed(kind, format!("donation of {ada} ADA is out of range")))?;
            debug!(lovelace, "Adding donation output");
            base = base.pay_to(self.settings.donation_address.clone(), lovelace);
        }

        let base = &base;
        let reward = reward.as_str();
        let retry = RetryOnce::new(|e: &DelegationError| matches!(e, DelegationError::StakeKeyNotRegistered));
        let submitted = retry
            .run(move |attempt| self.submit_attempt(wallet, base, reward, kind, attempt))
            .await;

        let submitted = match submitted {
            Ok(submitted) => submitted,
            Err(AttemptError {
                attempt: Attempt::Retry,
                error,
            }) => return Err(demote_repeat(kind, error)),
            Err(AttemptError { error, .. }) => return Err(error),
        };

        info!(tx_hash = %submitted.tx_hash, fee = submitted.fee, "Delegation submitted");
        dispatch(self.notifier.clone(), DelegationInfo::new(&submitted.tx_hash, request));

        Ok(DelegationReceipt {
            tx_hash: submitted.tx_hash,
            fee: submitted.fee,
            registered_stake_key: submitted.registered_stake_key,
        })
    }

    async fn change_address(&self, wallet: &WalletHandle, kind: DelegationKind) -> Result<String, DelegationError> {
        match wallet.get_change_address().await {
            Ok(address) if !address.trim().is_empty() => Ok(address),
            Ok(_) | Err(_) => primary_address(wallet.as_ref())
                .await
                .map_err(|e| classify(kind, FailureStage::Query, &e))?
                .ok_or_else(|| DelegationError::failed(kind, "wallet returned no change address")),
        }
    }

    async fn submit_attempt(
        &self,
        wallet: &WalletHandle,
        base: &TxDraft,
        reward: &str,
        kind: DelegationKind,
        attempt: Attempt,
    ) -> Result<Submitted, DelegationError> {
        let draft = match attempt {
            Attempt::Initial => base.clone(),
            Attempt::Retry => {
                info!("Stake key not registered, retrying with a registration certificate");
                base.clone().prepend_certificate(Certificate::registration(reward))
            }
        };

        let registered_stake_key = draft.registers_stake_key();
        let tx = self
            .completer
            .complete(draft)
            .await
            .map_err(|e| build_failure(kind, e))?;

        let signed = wallet
            .sign_tx(&tx.body_hex)
            .await
            .map_err(|e| classify(kind, FailureStage::Sign, &e))?;

        let tx_hash = wallet
            .submit_tx(&signed)
            .await
            .map_err(|e| classify(kind, FailureStage::Submit, &e))?;

        Ok(Submitted {
            tx_hash,
            fee: tx.fee,
            registered_stake_key,
        })
    }
}

fn build_failure(kind: DelegationKind, err: BuildError) -> DelegationError {
    DelegationError::failed(kind, err.to_string())
}

/// A retry that hits the same rejection again is a plain failure.
fn demote_repeat(kind: DelegationKind, err: DelegationError) -> DelegationError {
    match err {
        DelegationError::StakeKeyNotRegistered => {
            DelegationError::failed(kind, "stake key still not registered after registration retry")
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::sim::{sample_address, AddressRole, RecordingNotifier, SimulatedWallet};
    use crate::transaction::{LocalCompleter, TxBody};
    use crate::DRep;
    use shared::dto::delegation::DREP_ALWAYS_ABSTAIN;

    const STAKE_KEY_ERROR: &str =
        "ApplyTxError [ConwayCertsFailure (CertFailure (DelegFailure (StakeKeyNotRegisteredDELEG (KeyHashObj ...))))]";

    fn service(notifier: RecordingNotifier) -> DelegationService {
        DelegationService::new(
            DelegationSettings::new(Network::Mainnet, sample_address(Network::Mainnet, AddressRole::Donation)),
            Arc::new(LocalCompleter::default()),
            Arc::new(notifier),
        )
    }

    fn handle(wallet: &Arc<SimulatedWallet>) -> WalletHandle {
        wallet.clone()
    }

    #[tokio::test]
    async fn test_missing_handle_is_not_connected() {
        let (notifier, _rx) = RecordingNotifier::new();
        let service = service(notifier);
        for request in [DelegationRequest::pool("pool1abc123"), DelegationRequest::drep("")] {
            assert_eq!(service.delegate(None, &request).await, Err(DelegationError::NotConnected));
        }
    }

    #[tokio::test]
    async fn test_preconditions_in_order() {
        let (notifier, _rx) = RecordingNotifier::new();
        let service = service(notifier);

        let funded = Arc::new(SimulatedWallet::funded(Network::Mainnet));
        assert_eq!(
            service.delegate(Some(&handle(&funded)), &DelegationRequest::pool(" ")).await,
            Err(DelegationError::MissingPoolId)
        );
        assert_eq!(
            service.delegate(Some(&handle(&funded)), &DelegationRequest::drep("")).await,
            Err(DelegationError::MissingDRepId)
        );

        let no_reward = Arc::new(SimulatedWallet::funded(Network::Mainnet).with_reward_addresses(vec![]));
        assert_eq!(
            service.delegate(Some(&handle(&no_reward)), &DelegationRequest::pool("pool1abc123")).await,
            Err(DelegationError::NoRewardAddress)
        );

        let no_utxos = Arc::new(SimulatedWallet::funded(Network::Mainnet).with_utxos(vec![]));
        let err = service
            .delegate(Some(&handle(&no_utxos)), &DelegationRequest::pool("pool1abc123"))
            .await
            .unwrap_err();
        assert_eq!(err, DelegationError::NoUtxos);
        assert!(err.user_message().contains("deposit"));
        assert_eq!(no_utxos.sign_calls(), 0);
    }

    #[tokio::test]
    async fn test_donation_network_mismatch() {
        let (notifier, _rx) = RecordingNotifier::new();
        let service = service(notifier);
        let testnet = Arc::new(SimulatedWallet::funded(Network::Preprod));

        let err = service
            .delegate(
                Some(&handle(&testnet)),
                &DelegationRequest::pool("pool1abc123").with_donation(5.0),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DelegationError::NetworkMismatch(_)));
        assert_eq!(testnet.sign_calls(), 0);

        // Without a donation the network is not consulted.
        assert!(service
            .delegate(Some(&handle(&testnet)), &DelegationRequest::pool("pool1abc123"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_pool_delegation_with_donation() {
        let (notifier, mut rx) = RecordingNotifier::new();
        let service = service(notifier);
        let wallet = Arc::new(SimulatedWallet::funded(Network::Mainnet));

        let request = DelegationRequest::pool("pool1abc123").with_donation(5.0);
        let receipt = service.delegate(Some(&handle(&wallet)), &request).await.unwrap();

        let body = TxBody::from_hex(&wallet.signed_txs()[0]).unwrap();
        assert!(body.outputs.iter().any(|o| {
            o.address == service.settings().donation_address && o.lovelace == 5_000_000
        }));
        assert!(matches!(
            &body.certificates[..],
            [Certificate::StakeDelegation { pool_id, .. }] if pool_id == "pool1abc123"
        ));

        let info = rx.recv().await.unwrap();
        assert_eq!(info.tx_hash, receipt.tx_hash);
        assert_eq!(info.ident, "pool1abc123");
        assert_eq!(info.kind, DelegationKind::Pool);
        assert_eq!(info.action, "delegation");
        assert_eq!(info.donation_amount, 5.0);
    }

    #[tokio::test]
    async fn test_drep_sentinel_certificate() {
        let (notifier, _rx) = RecordingNotifier::new();
        let wallet = Arc::new(SimulatedWallet::funded(Network::Mainnet));
        service(notifier)
            .delegate(Some(&handle(&wallet)), &DelegationRequest::drep(DREP_ALWAYS_ABSTAIN))
            .await
            .unwrap();

        let body = TxBody::from_hex(&wallet.signed_txs()[0]).unwrap();
        assert!(matches!(
            &body.certificates[..],
            [Certificate::VoteDelegation { drep: DRep::AlwaysAbstain, .. }]
        ));
    }

    #[tokio::test]
    async fn test_unregistered_stake_key_retries_once_with_registration() {
        let (notifier, mut rx) = RecordingNotifier::new();
        let wallet = Arc::new(SimulatedWallet::funded(Network::Mainnet));
        wallet.fail_next_submit(ProviderError::new(STAKE_KEY_ERROR));

        let receipt = service(notifier)
            .delegate(Some(&handle(&wallet)), &DelegationRequest::drep("drep1xyz"))
            .await
            .unwrap();
        assert!(receipt.registered_stake_key);

        assert_eq!(wallet.sign_calls(), 2);
        assert_eq!(wallet.submit_calls(), 2);

        let retried = TxBody::from_hex(&wallet.signed_txs()[1]).unwrap();
        assert!(retried.certificates[0].is_registration());
        assert!(matches!(retried.certificates[1], Certificate::VoteDelegation { .. }));
        assert_eq!(retried.deposit, 2_000_000);

        assert_eq!(rx.recv().await.unwrap().tx_hash, receipt.tx_hash);
    }

    #[tokio::test]
    async fn test_second_stake_key_failure_is_generic() {
        let (notifier, _rx) = RecordingNotifier::new();
        let wallet = Arc::new(SimulatedWallet::funded(Network::Mainnet));
        wallet.fail_next_submit(ProviderError::new(STAKE_KEY_ERROR));
        wallet.fail_next_submit(ProviderError::new(STAKE_KEY_ERROR));

        let err = service(notifier)
            .delegate(Some(&handle(&wallet)), &DelegationRequest::pool("pool1abc123"))
            .await
            .unwrap_err();

        assert!(matches!(err, DelegationError::Failed { kind: DelegationKind::Pool, .. }));
        assert_eq!(err.user_message(), "Delegation failed");
        assert_eq!(wallet.sign_calls(), 2);
        assert_eq!(wallet.submit_calls(), 2);
    }

    #[tokio::test]
    async fn test_sign_rejection_is_cancellation_without_retry() {
        let (notifier, _rx) = RecordingNotifier::new();
        let wallet = Arc::new(SimulatedWallet::funded(Network::Mainnet));
        wallet.fail_next_sign(ProviderError::with_code(2, "user declined sign tx"));

        let outcome = service(notifier)
            .execute(Some(&handle(&wallet)), &DelegationRequest::pool("pool1abc123"))
            .await;

        assert_eq!(outcome, DelegationOutcome::Failure(DelegationError::UserCancelled));
        assert_eq!(outcome.user_message(), "Transaction cancelled");
        assert_eq!(wallet.submit_calls(), 0);
    }

    #[test]
    fn test_to_lovelace_bounds() {
        let settings = DelegationSettings::new(Network::Mainnet, "addr1donation");
        assert_eq!(settings.to_lovelace(5.0), Some(5_000_000));
        assert_eq!(settings.to_lovelace(0.000001), Some(1));
        assert_eq!(settings.to_lovelace(1.0e14), None);
        assert_eq!(settings.to_lovelace(f64::INFINITY), None);
        assert_eq!(settings.to_lovelace(f64::NAN), None);
        assert_eq!(settings.to_lovelace(-1.0), None);
    }

    #[tokio::test]
    async fn test_oversized_donation_fails_without_panicking() {
        let (notifier, _rx) = RecordingNotifier::new();
        let service = service(notifier);
        let wallet = Arc::new(SimulatedWallet::funded(Network::Mainnet));

        for ada in [1.0e14, 1.8e13] {
            let request = DelegationRequest::pool("pool1abc123").with_donation(ada);
            let task = {
                let service = service.clone();
                let wallet = handle(&wallet);
                tokio::spawn(async move { service.execute(Some(&wallet), &request).await })
            };
            let outcome = task.await.expect("delegation task must not panic");
            match outcome {
                DelegationOutcome::Failure(err) => {
                    assert!(matches!(err, DelegationError::Failed { kind: DelegationKind::Pool, .. }));
                    assert_eq!(err.user_message(), "Delegation failed");
                }
                other => panic!("expected failure, got {other:?}"),
            }
        }
        assert_eq!(wallet.sign_calls(), 0);
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_affect_outcome() {
        let (notifier, mut rx) = RecordingNotifier::failing();
        let wallet = Arc::new(SimulatedWallet::funded(Network::Mainnet));

        let outcome = service(notifier)
            .execute(Some(&handle(&wallet)), &DelegationRequest::pool("pool1abc123"))
            .await;

        assert!(outcome.is_success());
        assert!(rx.recv().await.is_some());
    }
}

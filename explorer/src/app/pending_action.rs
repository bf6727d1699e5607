//! # Pending Action Resolver
//!
//! A detail page opened with `?action=delegate` carries a delegation intent. The
//! resolver turns that intent into exactly one of two prompts:
//!
//! - **connect wallet**, when the wallet is not ready
//! - **confirm delegation**, when address, provider, live handle, and an auth
//!   token for that address are all present
//!
//! The intent is one-shot: as soon as either prompt is emitted the `action`
//! parameter is removed from the URL, so later re-evaluations fall back to
//! [`PendingActionState::Idle`].
//!
//! Evaluation runs after a short settle delay and each trigger supersedes the
//! previous one. During a page reload the connection manager is briefly in a
//! "remembered but not yet live" state; the delay keeps that intermediate state
//! from being mistaken for a disconnected wallet.

use crate::app::events::AppEvent;
use crate::app::state::{UrlState, WalletStore};
use crate::app::tasks::latest::LatestOnly;
use async_channel::Sender;
use lib_core::AuthTokenStore;
use lib_utils::url::{has_query_param, location_path, remove_query_param};
use parking_lot::Mutex;
use shared::dto::delegation::DelegationKind;
use shared::dto::wallet::WalletIdentity;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Query parameter carrying the intent.
pub const ACTION_PARAM: &str = "action";
pub const DELEGATE_ACTION: &str = "delegate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingActionState {
    #[default]
    Idle,
    AwaitingWallet,
    AwaitingConfirmation,
}

/// Pool or DRep the current detail page is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationTarget {
    pub kind: DelegationKind,
    pub ident: String,
}

impl DelegationTarget {
    /// Parse `/pool/<id>` or `/drep/<id>` (optionally under a locale prefix).
    pub fn from_location(location: &str) -> Option<Self> {
        let segments: Vec<&str> = location_path(location).split('/').filter(|s| !s.is_empty()).collect();
        segments.windows(2).find_map(|pair| {
            let kind = match pair[0] {
                "pool" => DelegationKind::Pool,
                "drep" => DelegationKind::Drep,
                _ => return None,
            };
            Some(Self {
                kind,
                ident: pair[1].to_string(),
            })
        })
    }
}

/// Decide the prompt for one observation of the world.
///
/// # Arguments
///
/// * `requested` - The URL carries `action=delegate`
/// * `identity` - Remembered identity
/// * `has_live_handle` - A live wallet handle exists
/// * `has_token` - An auth token exists for `identity.address`
pub fn resolve(requested: bool, identity: &WalletIdentity, has_live_handle: bool, has_token: bool) -> PendingActionState {
    if !requested {
        return PendingActionState::Idle;
    }
    let ready = identity.address.is_some() && identity.provider_type.is_some() && has_live_handle && has_token;
    if ready {
        PendingActionState::AwaitingConfirmation
    } else {
        PendingActionState::AwaitingWallet
    }
}

/// Debounced resolver bound to the live stores.
pub struct PendingActionResolver {
    url: UrlState,
    store: WalletStore,
    tokens: AuthTokenStore,
    events: Sender<AppEvent>,
    settle: Duration,
    debounce: LatestOnly,
    state: Mutex<PendingActionState>,
}

impl PendingActionResolver {
    pub fn new(
        url: UrlState,
        store: WalletStore,
        tokens: AuthTokenStore,
        events: Sender<AppEvent>,
        settle: Duration,
    ) -> Self {
        Self {
            url,
            store,
            tokens,
            events,
            settle,
            debounce: LatestOnly::new(),
            state: Mutex::new(PendingActionState::Idle),
        }
    }

    pub fn state(&self) -> PendingActionState {
        *self.state.lock()
    }

    /// Evaluate immediately against the current stores.
    pub fn evaluate_now(&self) -> PendingActionState {
        let location = self.url.current();
        let requested = has_query_param(&location, ACTION_PARAM, DELEGATE_ACTION);
        let snapshot = self.store.snapshot();
        let has_token = snapshot
            .identity
            .address
            .as_deref()
            .is_some_and(|address| self.tokens.has_token(address));

        let next = resolve(requested, &snapshot.identity, snapshot.is_live(), has_token);
        let previous = std::mem::replace(&mut *self.state.lock(), next);
        if previous != next {
            debug!(?previous, ?next, "Pending action state changed");
        }

        if next != PendingActionState::Idle {
            let target = DelegationTarget::from_location(&location);
            self.url.replace(remove_query_param(&location, ACTION_PARAM));

            let event = match next {
                PendingActionState::AwaitingConfirmation => AppEvent::PromptConfirmDelegation { target },
                _ => AppEvent::PromptConnectWallet { target },
            };
            info!(state = ?next, "Delegation intent consumed");
            let _ = self.events.try_send(event);
        }
        next
    }

    /// Evaluate after the settle delay, superseding any pending evaluation.
    pub fn schedule(self: &Arc<Self>) {
        let resolver = Arc::clone(self);
        self.debounce.spawn(tokio::time::sleep(self.settle), move |_| {
            resolver.evaluate_now();
        });
    }

    /// Re-schedule on every change of URL, wallet state, or auth tokens.
    pub fn spawn_watcher(self: Arc<Self>) -> JoinHandle<()> {
        let mut url_rx = self.url.subscribe();
        let mut wallet_rx = self.store.subscribe();
        let mut token_rx = self.tokens.subscribe();

        tokio::spawn(async move {
            self.schedule();
            loop {
                tokio::select! {
                    changed = url_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = wallet_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = token_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                self.schedule();
            }
            debug!("Pending action watcher stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::dto::wallet::ProviderType;

    fn remembered() -> WalletIdentity {
        WalletIdentity::connected("addr1qx".to_string(), None, ProviderType::Eternl)
    }

    #[test]
    fn test_no_intent_is_idle() {
        assert_eq!(resolve(false, &remembered(), true, true), PendingActionState::Idle);
    }

    #[test]
    fn test_remembered_identity_without_handle_never_confirms() {
        assert_eq!(resolve(true, &remembered(), false, true), PendingActionState::AwaitingWallet);
    }

    #[test]
    fn test_each_missing_precondition_prompts_connect() {
        let mut no_provider = remembered();
        no_provider.provider_type = None;
        let mut no_address = remembered();
        no_address.address = None;

        assert_eq!(resolve(true, &no_provider, true, true), PendingActionState::AwaitingWallet);
        assert_eq!(resolve(true, &no_address, true, true), PendingActionState::AwaitingWallet);
        assert_eq!(resolve(true, &remembered(), true, false), PendingActionState::AwaitingWallet);
        assert_eq!(resolve(true, &remembered(), true, true), PendingActionState::AwaitingConfirmation);
    }

    #[test]
    fn test_target_from_location() {
        assert_eq!(
            DelegationTarget::from_location("/pool/pool1abc123?action=delegate"),
            Some(DelegationTarget {
                kind: DelegationKind::Pool,
                ident: "pool1abc123".to_string()
            })
        );
        assert_eq!(
            DelegationTarget::from_location("/en/drep/drep1xyz#votes").map(|t| t.kind),
            Some(DelegationKind::Drep)
        );
        assert_eq!(DelegationTarget::from_location("/epoch/512"), None);
        assert_eq!(DelegationTarget::from_location("/pool"), None);
    }
}

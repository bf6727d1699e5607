//! # Connection Manager
//!
//! Keeps the live wallet handle consistent with the remembered identity and
//! implements the explicit `connect` / `disconnect` operations.
//!
//! ## Reconnection
//!
//! After a reload the store remembers `providerType` but has no handle. The
//! manager calls `enable(providerType)` once per such observation:
//!
//! - success attaches the handle, identity untouched
//! - failure resets the identity to fully disconnected, which also stops any
//!   further attempt against an unavailable extension
//!
//! ## Ordering
//!
//! `connect` holds the connection gate for its whole duration. A reconnection
//! pass only starts when the gate is free and never waits for it, and its late
//! result is dropped if a `connect` or `disconnect` changed the store meanwhile.

use crate::app::events::{AppEvent, ToastLevel};
use crate::app::state::WalletStore;
use crate::core::error::{ConnectError, ConnectResult};
use async_channel::Sender;
use lib_cardano::address::matches_network;
use lib_cardano::provider::{primary_address, reward_address};
use lib_cardano::WalletProvider;
use lib_core::AuthTokenStore;
use shared::dto::wallet::{Network, ProviderType, WalletIdentity};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Result of a successful `connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOutcome {
    pub identity: WalletIdentity,
    /// No auth token exists for the connected address yet.
    pub needs_authorization: bool,
}

/// What a reconnection pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectOutcome {
    /// Nothing to do, or another connection attempt is running.
    Skipped,
    Reconnected,
    /// `enable` succeeded but the store changed meanwhile; the handle was dropped.
    Superseded,
    /// `enable` failed; the identity was reset.
    Failed,
}

pub struct ConnectionManager {
    provider: Arc<dyn WalletProvider>,
    store: WalletStore,
    tokens: AuthTokenStore,
    network: Network,
    events: Option<Sender<AppEvent>>,
    gate: Mutex<()>,
    reconnecting: AtomicBool,
}

impl ConnectionManager {
    pub fn new(provider: Arc<dyn WalletProvider>, store: WalletStore, tokens: AuthTokenStore, network: Network) -> Self {
        Self {
            provider,
            store,
            tokens,
            network,
            events: None,
            gate: Mutex::new(()),
            reconnecting: AtomicBool::new(false),
        }
    }

    pub fn with_events(mut self, events: Sender<AppEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn store(&self) -> &WalletStore {
        &self.store
    }

    /// Re-acquire the live handle for a remembered provider.
    #[instrument(skip(self))]
    pub async fn reconnect_if_needed(&self) -> ReconnectOutcome {
        let before = {
            let Ok(_gate) = self.gate.try_lock() else {
                debug!("Connect in progress, skipping reconnection");
                return ReconnectOutcome::Skipped;
            };
            let snapshot = self.store.snapshot();
            if !snapshot.needs_reconnect() {
                return ReconnectOutcome::Skipped;
            }
            if self.reconnecting.swap(true, Ordering::SeqCst) {
                return ReconnectOutcome::Skipped;
            }
            snapshot.identity
        };
        let _reconnecting = ReconnectingGuard(&self.reconnecting);

        let Some(provider_type) = before.provider_type else {
            return ReconnectOutcome::Skipped;
        };
        info!(provider = %provider_type, "Reconnecting remembered wallet");

        let result = self.provider.enable(provider_type).await;
        let _gate = self.gate.lock().await;
        let current = self.store.snapshot();
        let unchanged = current.identity == before && current.handle.is_none();

        match result {
            Ok(handle) => {
                if unchanged && self.store.attach_handle(provider_type, handle) {
                    info!(provider = %provider_type, "Wallet reconnected");
                    ReconnectOutcome::Reconnected
                } else {
                    debug!(provider = %provider_type, "Dropping late reconnection handle");
                    ReconnectOutcome::Superseded
                }
            }
            Err(err) => {
                if !unchanged {
                    debug!(error = %err, "Reconnection failed after the store changed; ignoring");
                    return ReconnectOutcome::Superseded;
                }
                warn!(provider = %provider_type, error = %err, "Reconnection failed, forgetting wallet");
                if let Err(e) = self.store.reset() {
                    error!(error = %e, "Failed to persist disconnected identity");
                }
                ReconnectOutcome::Failed
            }
        }
    }

    /// Run a reconnection pass now and after every change of the wallet store.
    pub fn spawn_reconnect_watcher(self: Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.store.subscribe();
        tokio::spawn(async move {
            loop {
                self.reconnect_if_needed().await;
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Connect the wallet of type `provider_type`.
    ///
    /// # Errors
    ///
    /// - [`ConnectError::NoAddress`]: the wallet reported no address; identity untouched
    /// - [`ConnectError::WrongNetwork`]: the address is on another network; identity reset
    /// - [`ConnectError::Enable`] / [`ConnectError::Provider`]: provider failure; identity reset
    /// - [`ConnectError::Superseded`]: `disconnect` was called while connecting
    #[instrument(skip_all, fields(provider = %provider_type))]
    pub async fn connect(&self, provider_type: ProviderType) -> ConnectResult<ConnectOutcome> {
        let result = self.connect_inner(provider_type).await;
        match &result {
            Ok(outcome) => {
                if let Some(address) = &outcome.identity.address {
                    self.emit(AppEvent::WalletConnected {
                        provider: provider_type,
                        address: address.clone(),
                    });
                    if outcome.needs_authorization {
                        self.emit(AppEvent::OpenAuthorization {
                            address: address.clone(),
                        });
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "Wallet connection failed");
                self.emit(AppEvent::toast(ToastLevel::Error, err.user_message()));
            }
        }
        result
    }

    async fn connect_inner(&self, provider_type: ProviderType) -> ConnectResult<ConnectOutcome> {
        let _gate = self.gate.lock().await;
        let epoch = self.store.epoch();

        let handle = match self.provider.enable(provider_type).await {
            Ok(handle) => handle,
            Err(err) => return Err(self.reset_with(epoch, ConnectError::Enable(err))),
        };

        let address = match primary_address(handle.as_ref()).await {
            Ok(Some(address)) => address,
            Ok(None) => return Err(ConnectError::NoAddress),
            Err(err) => return Err(self.reset_with(epoch, ConnectError::Provider(err))),
        };

        if !matches_network(&address, self.network) {
            return Err(self.reset_with(epoch, ConnectError::WrongNetwork(self.network)));
        }

        let stake_key = reward_address(handle.as_ref()).await.unwrap_or_else(|err| {
            warn!(error = %err, "Reward address query failed during connect");
            None
        });

        let identity = WalletIdentity::connected(address.clone(), stake_key, provider_type);
        if !self.store.commit_if_epoch(epoch, identity.clone(), Some(handle))? {
            return Err(ConnectError::Superseded);
        }

        let needs_authorization = !self.tokens.has_token(&address);
        info!(address = %shared::truncate_address(&address), needs_authorization, "Wallet connected");
        Ok(ConnectOutcome {
            identity,
            needs_authorization,
        })
    }

    /// Clear identity and handle and remove the persisted blob. Idempotent.
    pub fn disconnect(&self) -> lib_core::Result<()> {
        self.store.clear()?;
        self.emit(AppEvent::WalletDisconnected);
        Ok(())
    }

    /// Mark the extension as disabled (or enabled again) by the user.
    pub fn set_disabled_ext(&self, disabled: bool) -> lib_core::Result<()> {
        self.store.update_identity(|identity| identity.disabled_ext = disabled)
    }

    /// Reset to disconnected unless a disconnect already did, and pass `err` on.
    fn reset_with(&self, epoch: u64, err: ConnectError) -> ConnectError {
        match self.store.commit_if_epoch(epoch, WalletIdentity::disconnected(), None) {
            Ok(_) => err,
            Err(storage) => {
                error!(error = %storage, "Failed to persist disconnected identity");
                err
            }
        }
    }

    fn emit(&self, event: AppEvent) {
        if let Some(events) = &self.events {
            let _ = events.try_send(event);
        }
    }
}

struct ReconnectingGuard<'a>(&'a AtomicBool);

impl Drop for ReconnectingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

//! # Application Orchestrator
//!
//! [`ExplorerApp`] wires the stores, the connection manager, the pending action
//! resolver, and the delegation runner around one event channel.
//!
//! ## Architecture
//!
//! ```text
//!   UrlState ──┐
//!   WalletStore┼──▶ PendingActionResolver ──┐
//!   AuthTokens ┘        (debounced)          │
//!        ▲                                   │  async_channel
//!        │                                   ├──────────────▶ UI (toasts, modals)
//!   ConnectionManager ───────────────────────┤
//!   (reconnect / connect / disconnect)       │
//!                                            │
//!   DelegationRunner ──▶ DelegationService ──┘
//!   (single in-flight)   (lib-cardano)
//! ```
//!
//! Every background component reads the stores and writes only through its
//! own entry points. The UI side drains [`AppEvent`]s with
//! [`ExplorerApp::try_next_event`] or [`ExplorerApp::next_event`].

pub mod events;
pub mod pending_action;
pub mod state;
pub mod tasks;


pub use events::{AppEvent, ToastLevel};
pub use pending_action::{DelegationTarget, PendingActionResolver, PendingActionState};
pub use state::{UrlState, WalletSnapshot, WalletStore};

use crate::core::error::{ConnectResult, DelegationBusy};
use crate::services::connection::{ConnectOutcome, ConnectionManager};
use async_channel::{Receiver, Sender};
use lib_cardano::{
    DelegationNotifier, DelegationOutcome, DelegationService, DelegationSettings, HttpNotifier, LocalCompleter,
    NoopNotifier, ProtocolParams, WalletProvider,
};
use lib_core::{AuthTokenStore, Config, SharedStorage};
use parking_lot::Mutex;
use shared::dto::delegation::DelegationRequest;
use shared::dto::wallet::ProviderType;
use std::sync::Arc;
use tasks::delegation::DelegationRunner;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Main application.
pub struct ExplorerApp {
    config: Config,
    url: UrlState,
    wallet: WalletStore,
    tokens: AuthTokenStore,
    connection: Arc<ConnectionManager>,
    resolver: Arc<PendingActionResolver>,
    delegations: DelegationRunner,
    event_rx: Receiver<AppEvent>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl ExplorerApp {
    /// Build the application on top of `storage`.
    ///
    /// Loads the remembered identity and auth tokens; nothing runs until
    /// [`ExplorerApp::start`].
    ///
    /// # Arguments
    ///
    /// * `config` - Network, donation address, and settle delay
    /// * `storage` - Backend for identity and tokens
    /// * `provider` - Wallet extension bridge
    /// * `notifier` - Receives delegation records after success
    /// * `location` - Initial page location (path and query)
    pub fn new(
        config: Config,
        storage: SharedStorage,
        provider: Arc<dyn WalletProvider>,
        notifier: Arc<dyn DelegationNotifier>,
        location: impl Into<String>,
    ) -> lib_core::Result<Self> {
        let (event_tx, event_rx): (Sender<AppEvent>, Receiver<AppEvent>) = async_channel::unbounded();

        let url = UrlState::new(location);
        let wallet = WalletStore::load(storage.clone())?;
        let tokens = AuthTokenStore::load(storage)?;

        let connection = Arc::new(
            ConnectionManager::new(provider, wallet.clone(), tokens.clone(), config.network)
                .with_events(event_tx.clone()),
        );
        let resolver = Arc::new(PendingActionResolver::new(
            url.clone(),
            wallet.clone(),
            tokens.clone(),
            event_tx.clone(),
            config.settle_delay(),
        ));

        let service = DelegationService::new(
            DelegationSettings::from(&config),
            Arc::new(LocalCompleter::new(ProtocolParams::default())),
            notifier,
        );
        let delegations = DelegationRunner::new(service, wallet.clone(), event_tx);

        Ok(Self {
            config,
            url,
            wallet,
            tokens,
            connection,
            resolver,
            delegations,
            event_rx,
            background: Mutex::new(Vec::new()),
        })
    }

    /// Notifier for `config`: HTTP when a notify URL is set, otherwise none.
    pub fn notifier_for(config: &Config) -> Arc<dyn DelegationNotifier> {
        match &config.notify_url {
            Some(url) => Arc::new(HttpNotifier::new(url.clone())),
            None => Arc::new(NoopNotifier),
        }
    }

    /// Start the reconnection and pending action watchers. Calling twice is a no-op.
    pub fn start(&self) {
        let mut background = self.background.lock();
        if !background.is_empty() {
            return;
        }
        background.push(Arc::clone(&self.connection).spawn_reconnect_watcher());
        background.push(Arc::clone(&self.resolver).spawn_watcher());
        info!(network = %self.config.network, "Explorer started");
    }

    /// Abort background watchers. Running delegations finish on their own.
    pub fn shutdown(&self) {
        let tasks: Vec<_> = self.background.lock().drain(..).collect();
        if tasks.is_empty() {
            return;
        }
        for task in tasks {
            task.abort();
        }
        debug!("Explorer background tasks stopped");
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn url(&self) -> &UrlState {
        &self.url
    }

    pub fn wallet(&self) -> &WalletStore {
        &self.wallet
    }

    pub fn tokens(&self) -> &AuthTokenStore {
        &self.tokens
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    pub fn resolver(&self) -> &Arc<PendingActionResolver> {
        &self.resolver
    }

    pub fn delegations(&self) -> &DelegationRunner {
        &self.delegations
    }

    /// Move to another page.
    pub fn navigate(&self, location: impl Into<String>) {
        self.url.navigate(location);
    }

    pub async fn connect(&self, provider: ProviderType) -> ConnectResult<ConnectOutcome> {
        self.connection.connect(provider).await
    }

    pub fn disconnect(&self) -> lib_core::Result<()> {
        self.connection.disconnect()
    }

    /// Start a delegation with the current wallet handle.
    pub fn delegate(&self, request: DelegationRequest) -> Result<JoinHandle<DelegationOutcome>, DelegationBusy> {
        self.delegations.submit(request)
    }

    pub fn try_next_event(&self) -> Option<AppEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait for the next event. `None` once every sender is gone.
    pub async fn next_event(&self) -> Option<AppEvent> {
        self.event_rx.recv().await.ok()
    }
}

impl Drop for ExplorerApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}

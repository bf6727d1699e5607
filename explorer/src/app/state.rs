//! # Application State Types
//!
//! Process-wide state shared between the connection manager, the pending action
//! resolver, and the delegation runner:
//!
//! - [`WalletStore`]: the remembered [`WalletIdentity`] (persisted) together with
//!   the live [`WalletHandle`] (never persisted)
//! - [`UrlState`]: the current location, including the query string
//!
//! Both publish through a `tokio::sync::watch` channel. A write replaces the whole
//! value at once, so a reader never observes an identity without the handle that
//! was committed with it.

use lib_cardano::WalletHandle;
use lib_core::error::Result;
use lib_core::model::store::{load_persisted, save_persisted, SharedStorage, WALLET_IDENTITY_KEY};
use parking_lot::Mutex;
use shared::dto::wallet::{ProviderType, WalletIdentity};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const WALLET_IDENTITY_VERSION: u32 = 1;

// region: --- WalletSnapshot

/// Identity plus live handle, as observed at one instant.
#[derive(Clone, Default)]
pub struct WalletSnapshot {
    pub identity: WalletIdentity,
    pub handle: Option<WalletHandle>,
}

impl WalletSnapshot {
    /// A live handle exists.
    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }

    /// The identity is remembered but the handle has not been re-acquired yet.
    pub fn needs_reconnect(&self) -> bool {
        self.identity.provider_type.is_some() && self.handle.is_none()
    }
}

impl fmt::Debug for WalletSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSnapshot")
            .field("identity", &self.identity)
            .field("live", &self.handle.is_some())
            .finish()
    }
}

// endregion: --- WalletSnapshot

// region: --- WalletStore

struct StoreInner {
    storage: SharedStorage,
    tx: watch::Sender<WalletSnapshot>,
    /// Serializes persist + publish so storage and channel agree.
    write: Mutex<()>,
    /// Bumped by every [`WalletStore::clear`].
    epoch: AtomicU64,
}

/// Wallet state container. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct WalletStore {
    inner: Arc<StoreInner>,
}

impl WalletStore {
    /// Load the remembered identity from `storage`. The handle always starts empty.
    ///
    /// An inconsistent blob (address without provider or the reverse) loads as
    /// disconnected.
    pub fn load(storage: SharedStorage) -> Result<Self> {
        let identity: WalletIdentity =
            load_persisted(storage.as_ref(), WALLET_IDENTITY_KEY, WALLET_IDENTITY_VERSION)?.unwrap_or_default();

        let identity = if identity.is_consistent() {
            identity
        } else {
            warn!(?identity, "Ignoring inconsistent persisted wallet identity");
            WalletIdentity::disconnected()
        };
        debug!(remembered = identity.is_remembered(), "Loaded wallet identity");

        let (tx, _) = watch::channel(WalletSnapshot {
            identity,
            handle: None,
        });
        Ok(Self {
            inner: Arc::new(StoreInner {
                storage,
                tx,
                write: Mutex::new(()),
                epoch: AtomicU64::new(0),
            }),
        })
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        self.inner.tx.borrow().clone()
    }

    pub fn identity(&self) -> WalletIdentity {
        self.inner.tx.borrow().identity.clone()
    }

    pub fn handle(&self) -> Option<WalletHandle> {
        self.inner.tx.borrow().handle.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Current disconnect epoch. Compare with [`WalletStore::commit_if_epoch`].
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// Persist `identity` and publish it together with `handle` in one write.
    pub fn commit(&self, identity: WalletIdentity, handle: Option<WalletHandle>) -> Result<()> {
        let _write = self.inner.write.lock();
        self.persist(&identity)?;
        self.inner.tx.send_replace(WalletSnapshot { identity, handle });
        Ok(())
    }

    /// Like [`WalletStore::commit`], unless a [`WalletStore::clear`] happened since
    /// `epoch` was read. Returns whether the write was applied.
    pub fn commit_if_epoch(&self, epoch: u64, identity: WalletIdentity, handle: Option<WalletHandle>) -> Result<bool> {
        let _write = self.inner.write.lock();
        if self.epoch() != epoch {
            return Ok(false);
        }
        self.persist(&identity)?;
        self.inner.tx.send_replace(WalletSnapshot { identity, handle });
        Ok(true)
    }

    /// Attach a re-acquired handle, leaving the identity untouched.
    ///
    /// Applied only while the store still remembers `provider` without a handle;
    /// otherwise the handle is stale and dropped. Returns whether it was attached.
    pub fn attach_handle(&self, provider: ProviderType, handle: WalletHandle) -> bool {
        let _write = self.inner.write.lock();
        self.inner.tx.send_if_modified(|snapshot| {
            if snapshot.handle.is_none() && snapshot.identity.provider_type == Some(provider) {
                snapshot.handle = Some(handle);
                true
            } else {
                false
            }
        })
    }

    /// Reset to the fully disconnected identity, persisting that shape.
    pub fn reset(&self) -> Result<()> {
        self.commit(WalletIdentity::disconnected(), None)
    }

    /// Reset to disconnected and remove the persisted blob entirely.
    pub fn clear(&self) -> Result<()> {
        let _write = self.inner.write.lock();
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.tx.send_replace(WalletSnapshot::default());
        self.inner.storage.remove_item(WALLET_IDENTITY_KEY)?;
        info!("Wallet state cleared");
        Ok(())
    }

    /// Apply `update` to the identity, keeping the handle.
    pub fn update_identity(&self, update: impl FnOnce(&mut WalletIdentity)) -> Result<()> {
        let _write = self.inner.write.lock();
        let mut snapshot = self.snapshot();
        update(&mut snapshot.identity);
        self.persist(&snapshot.identity)?;
        self.inner.tx.send_replace(snapshot);
        Ok(())
    }

    fn persist(&self, identity: &WalletIdentity) -> Result<()> {
        save_persisted(
            self.inner.storage.as_ref(),
            WALLET_IDENTITY_KEY,
            WALLET_IDENTITY_VERSION,
            identity,
        )
    }
}

// endregion: --- WalletStore

// region: --- UrlState

/// Current location (`/path?query#fragment`).
#[derive(Clone)]
pub struct UrlState {
    tx: Arc<watch::Sender<String>>,
}

impl UrlState {
    pub fn new(location: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(location.into());
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Move to `location`. Subscribers are woken even if it is unchanged.
    pub fn navigate(&self, location: impl Into<String>) {
        self.tx.send_replace(location.into());
    }

    /// Rewrite the location in place, e.g. to drop a consumed query parameter.
    pub fn replace(&self, location: impl Into<String>) {
        let location = location.into();
        self.tx.send_if_modified(|current| {
            if *current == location {
                false
            } else {
                *current = location;
                true
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

// endregion: --- UrlState

//! # Auth Token Store
//!
//! Persisted mapping from wallet address to the authorization token obtained
//! through the out-of-band sign-in flow. The wallet pipeline only reads it; the
//! sign-in flow writes through [`AuthTokenStore::set_token`].
//!
//! A token only counts for the address it was issued to. Callers always look up
//! by the *current* wallet address, so entries left behind by a previously
//! connected wallet never satisfy a readiness check.

use super::persisted::{load_persisted, save_persisted};
use super::storage::SharedStorage;
use super::AUTH_TOKENS_KEY;
use crate::error::{AppError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

const AUTH_TOKENS_VERSION: u32 = 1;

struct Inner {
    storage: SharedStorage,
    tokens: RwLock<HashMap<String, String>>,
    revision: watch::Sender<u64>,
}

/// Address-to-token store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AuthTokenStore {
    inner: Arc<Inner>,
}

impl AuthTokenStore {
    /// Load the store from `storage`. A missing or unreadable blob starts empty.
    pub fn load(storage: SharedStorage) -> Result<Self> {
        let tokens: HashMap<String, String> =
            load_persisted(storage.as_ref(), AUTH_TOKENS_KEY, AUTH_TOKENS_VERSION)?.unwrap_or_default();
        debug!(count = tokens.len(), "Loaded auth tokens");

        let (revision, _) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(Inner {
                storage,
                tokens: RwLock::new(tokens),
                revision,
            }),
        })
    }

    /// Token issued for `address`, if any.
    pub fn token_for(&self, address: &str) -> Option<String> {
        self.inner.tokens.read().get(address).cloned()
    }

    pub fn has_token(&self, address: &str) -> bool {
        self.inner.tokens.read().contains_key(address)
    }

    /// Record the token issued for `address` and persist the map.
    pub fn set_token(&self, address: &str, token: &str) -> Result<()> {
        if address.trim().is_empty() || token.trim().is_empty() {
            return Err(AppError::InvalidInput("Address and token must not be empty".to_string()));
        }
        self.mutate(|tokens| {
            tokens.insert(address.to_string(), token.to_string());
        })?;
        info!(address = %shared::truncate_address(address), "Stored auth token");
        Ok(())
    }

    pub fn remove_token(&self, address: &str) -> Result<()> {
        self.mutate(|tokens| {
            tokens.remove(address);
        })
    }

    /// Watch for changes; the value is a revision counter bumped on every write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Apply `apply` to a copy, persist it, then publish it. A failed save leaves the map unchanged.
    fn mutate(&self, apply: impl FnOnce(&mut HashMap<String, String>)) -> Result<()> {
        {
            let mut tokens = self.inner.tokens.write();
            let mut next = tokens.clone();
            apply(&mut next);
            save_persisted(self.inner.storage.as_ref(), AUTH_TOKENS_KEY, AUTH_TOKENS_VERSION, &next)?;
            *tokens = next;
        }
        self.inner.revision.send_modify(|rev| *rev += 1);
        Ok(())
    }
}

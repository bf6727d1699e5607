//! # Persisted Values
//!
//! Typed values stored under a key, wrapped in an [`Envelope`]:
//!
//! ```json
//! { "version": 1, "savedAt": "2026-10-16T09:30:00Z", "state": { ... } }
//! ```
//!
//! A blob that fails to decode or carries another version reads as absent.

use super::storage::KeyValueStorage;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Versioned wrapper around a persisted value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub state: T,
}

/// Load the value stored under `key`.
///
/// Returns `Ok(None)` when nothing is stored, when the blob is corrupt, or when it
/// was written with a different `version`. Only storage access failures are errors.
pub fn load_persisted<T: DeserializeOwned>(
    storage: &dyn KeyValueStorage,
    key: &str,
    version: u32,
) -> Result<Option<T>> {
    let Some(raw) = storage.get_item(key)? else {
        return Ok(None);
    };

    match serde_json::from_str::<Envelope<T>>(&raw) {
        Ok(envelope) if envelope.version == version => Ok(Some(envelope.state)),
        Ok(envelope) => {
            warn!(key, stored = envelope.version, expected = version, "Ignoring persisted state with unknown version");
            Ok(None)
        }
        Err(e) => {
            warn!(key, error = %e, "Ignoring corrupt persisted state");
            Ok(None)
        }
    }
}

/// Store `state` under `key`.
pub fn save_persisted<T: Serialize>(
    storage: &dyn KeyValueStorage,
    key: &str,
    version: u32,
    state: &T,
) -> Result<()> {
    let envelope = Envelope {
        version,
        saved_at: Utc::now(),
        state,
    };
    let raw = serde_json::to_string(&envelope).map_err(|e| AppError::Encoding(e.to_string()))?;
    storage.set_item(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::MemoryStorage;
    use std::collections::HashMap;

    #[test]
    fn test_save_then_load() {
        let storage = MemoryStorage::new();
        let mut tokens = HashMap::new();
        tokens.insert("addr1q".to_string(), "jwt".to_string());

        save_persisted(&storage, "auth-tokens", 1, &tokens).unwrap();
        let loaded: Option<HashMap<String, String>> = load_persisted(&storage, "auth-tokens", 1).unwrap();
        assert_eq!(loaded, Some(tokens));
    }

    #[test]
    fn test_version_mismatch_reads_as_absent() {
        let storage = MemoryStorage::new();
        save_persisted(&storage, "k", 1, &42u32).unwrap();
        let loaded: Option<u32> = load_persisted(&storage, "k", 2).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_corrupt_blob_reads_as_absent() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "not json").unwrap();
        let loaded: Option<u32> = load_persisted(&storage, "k", 1).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_envelope_wire_shape() {
        let storage = MemoryStorage::new();
        save_persisted(&storage, "k", 3, &"hello").unwrap();
        let raw: serde_json::Value = serde_json::from_str(&storage.get_item("k").unwrap().unwrap()).unwrap();
        assert_eq!(raw["version"], 3);
        assert_eq!(raw["state"], "hello");
        assert!(raw["savedAt"].is_string());
    }
}

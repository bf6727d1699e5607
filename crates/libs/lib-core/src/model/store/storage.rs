//! # Key/Value Storage
//!
//! [`KeyValueStorage`] is the persistence seam. Two implementations ship:
//!
//! - [`JsonFileStorage`]: one JSON object file on disk, rewritten atomically
//!   (temp file + rename) on every change
//! - [`MemoryStorage`]: process-local map, used in tests and when no storage path
//!   is configured
//!
//! ```rust
//! use lib_core::model::store::{KeyValueStorage, MemoryStorage};
//!
//! let storage = MemoryStorage::new();
//! storage.set_item("wallet-identity", "{}").unwrap();
//! assert_eq!(storage.get_item("wallet-identity").unwrap().as_deref(), Some("{}"));
//! storage.remove_item("wallet-identity").unwrap();
//! assert!(storage.get_item("wallet-identity").unwrap().is_none());
//! ```

use crate::error::{AppError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Synchronous string key/value storage, in the manner of browser local storage.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_item(key)?.is_some())
    }
}

/// Shared handle to a storage backend.
pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStorage {
        Arc::new(Self::new())
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object file.
///
/// The whole file is read and rewritten on each mutation; the data held here is
/// a handful of small blobs. A missing file reads as empty.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStorage {
    /// Open storage at `path`, creating parent directories as needed.
    ///
    /// The file itself is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        debug!(path = %path.display(), "Opened JSON file storage");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn shared(path: impl AsRef<Path>) -> Result<SharedStorage> {
        Ok(Arc::new(Self::open(path)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                AppError::Decoding(format!("{} is not a JSON object of strings: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(AppError::Storage(format!("Failed to read {}: {}", self.path.display(), e))),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let tmp_path = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(items)
            .map_err(|e| AppError::Encoding(e.to_string()))?;
        fs::write(&tmp_path, contents)
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", tmp_path.display(), e)))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| AppError::Storage(format!("Failed to replace {}: {}", self.path.display(), e)))?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut items = self.read_all()?;
        if apply(&mut items) {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.update(|items| items.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_basic_ops() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        storage.set_item("a", "1").unwrap();
        storage.set_item("a", "2").unwrap();
        assert_eq!(storage.get_item("a").unwrap(), Some("2".to_string()));
        assert_eq!(storage.len(), 1);
        storage.remove_item("a").unwrap();
        storage.remove_item("a").unwrap();
        assert!(!storage.contains_key("a").unwrap());
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        {
            let storage = JsonFileStorage::open(&path).unwrap();
            storage.set_item("wallet-identity", r#"{"v":1}"#).unwrap();
            storage.set_item("auth-tokens", "{}").unwrap();
        }

        let reopened = JsonFileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get_item("wallet-identity").unwrap(),
            Some(r#"{"v":1}"#.to_string())
        );
        reopened.remove_item("wallet-identity").unwrap();
        assert!(reopened.get_item("wallet-identity").unwrap().is_none());
        assert!(reopened.contains_key("auth-tokens").unwrap());
    }

    #[test]
    fn test_file_storage_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::open(dir.path().join("absent.json")).unwrap();
        assert!(storage.get_item("anything").unwrap().is_none());
        storage.remove_item("anything").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let storage = JsonFileStorage::open(&path).unwrap();
        assert!(matches!(storage.get_item("k"), Err(AppError::Decoding(_))));
    }
}

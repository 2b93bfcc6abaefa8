//! Durable local storage for client state.
//!
//! The token, cart, wishlist and pending return location survive restarts.
//! Each key maps to one plain-text value; structured values are stored as
//! JSON.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Storage keys for persisted client state.
pub mod keys {
    /// Bearer token of the signed-in account.
    pub const TOKEN: &str = "token";

    /// Serialized cart lines.
    pub const CART: &str = "cart";

    /// Product ids on the wishlist.
    pub const WISHLIST: &str = "wishlist";

    /// Location a guard redirected away from, restored after login.
    pub const RETURN_TO: &str = "return_to";
}

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    /// A stored value could not be encoded or decoded.
    #[error("Serialization error on {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters that cannot name a file.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// A string key-value store.
pub trait Storage: Send + Sync + Debug {
    /// Read the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl dyn Storage {
    /// Read and decode a JSON value.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be read or is not valid JSON for `T`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.get(key)?
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|source| StorageError::Serialization {
                    key: key.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Encode and write a JSON value.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be encoded or written.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
            key: key.to_owned(),
            source,
        })?;
        self.set(key, &raw)
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// One file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored values.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(key))
    }
}

fn io_error(key: &str) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_owned(),
        source,
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key)(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(io_error(key))?;

        // Write then rename; readers never see a partial value
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value).map_err(io_error(key))?;
        fs::rename(&tmp, &path).map_err(io_error(key))?;

        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "Removed value");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key)(e)),
        }
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-memory storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_file_storage_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
        storage.set(keys::TOKEN, "abc.def").unwrap();
        assert_eq!(storage.get(keys::TOKEN).unwrap().as_deref(), Some("abc.def"));

        storage.remove(keys::TOKEN).unwrap();
        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
        // Removing twice is fine
        storage.remove(keys::TOKEN).unwrap();
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_json_helpers() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set_json(keys::WISHLIST, &[3_i64, 1, 2]).unwrap();
        let ids: Vec<i64> = storage.get_json(keys::WISHLIST).unwrap().unwrap();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_get_json_reports_corrupt_value() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set(keys::CART, "{not json").unwrap();
        let result: Result<Option<Vec<i64>>, _> = storage.get_json(keys::CART);
        assert!(matches!(result, Err(StorageError::Serialization { .. })));
    }
}

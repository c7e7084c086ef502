//! Durable key-value storage for client state.
//!
//! The cart only needs `get`/`set` on string keys, the same surface a browser's
//! local storage offers. Two backends are provided:
//!
//! - [`FileStorage`] - a JSON object file, rewritten atomically on every `set`
//! - [`MemoryStorage`] - a mutex-guarded map for tests and ephemeral sessions

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings.
    #[error("Storage file is corrupt: {0}")]
    Parse(#[from] serde_json::Error),

    /// A previous writer panicked while holding the storage lock.
    #[error("Storage lock poisoned")]
    Lock,

    /// The backend refuses writes.
    #[error("Storage is read-only")]
    ReadOnly,
}

/// Synchronous string key-value storage.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write does not complete.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// Storage persisted as one JSON object file (`{"key": "value", ...}`).
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage backed by the file at `path`; the file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Parse(e)) => {
                warn!(path = %self.path.display(), error = %e, "Replacing corrupt storage file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)?;
        debug!(path = %self.path.display(), key, "Storage entry written");
        Ok(())
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// Storage held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    read_only: AtomicBool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut entries) = storage.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        storage
    }

    /// Reject every subsequent `set` with [`StorageError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Lock)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::ReadOnly);
        }
        let mut entries = self.entries.lock().map_err(|_| StorageError::Lock)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

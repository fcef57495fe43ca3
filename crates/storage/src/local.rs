//! Device-local key-value storage.
//!
//! Values here never leave the machine. Lesson completion flags live here
//! under `lesson_<id>` keys with the literal values `"true"` or `"false"`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Synchronous string store. Reads and writes are expected to be cheap.
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Every key starting with `prefix`, in key order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

fn poisoned<T>(e: &std::sync::PoisonError<T>) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Process-lifetime store, used in tests and when no file is configured.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|e| poisoned(&e))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|e| poisoned(&e))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.lock().map_err(|e| poisoned(&e))?;
        let mut keys: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalFile {
    version: u32,
    entries: BTreeMap<String, String>,
}

const LOCAL_FILE_VERSION: u32 = 1;

/// A JSON document on disk, rewritten in full on every `set`.
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<LocalFile>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the file exists but cannot be
    /// read, and `StorageError::Serialization` if it is not a valid store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<LocalFile>(&raw)
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => LocalFile {
                version: LOCAL_FILE_VERSION,
                entries: BTreeMap::new(),
            },
            Err(e) => return Err(StorageError::Connection(e.to_string())),
        };
        tracing::debug!(path = %path.display(), entries = state.entries.len(), "opened local store");
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, LocalFile>, StorageError> {
        self.state.lock().map_err(|e| poisoned(&e))
    }

    fn flush(&self, state: &LocalFile) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(state)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::Connection(e.to_string()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| StorageError::Connection(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StorageError::Connection(e.to_string()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let previous = state.entries.insert(key.to_string(), value.to_string());
        state.version = LOCAL_FILE_VERSION;
        if let Err(err) = self.flush(&state) {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(old) => state.entries.insert(key.to_string(), old),
                None => state.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .lock()?
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

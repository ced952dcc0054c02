//! Durable key-value storage
//!
//! The raffle keeps one record under one key, so the store contract is the
//! smallest one that covers it: get, set, remove of string values.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};

/// Durable string storage keyed by name
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a value; absent keys are not an error
    fn remove(&self, key: &str) -> StoreResult<()>;
}

// ============ Memory Store ============

/// Process-local store (tests, `--memory` sessions)
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

// ============ File Store ============

/// One JSON file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the platform data directory
    pub fn in_default_dir() -> Self {
        Self::new(default_data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a key
    ///
    /// Keys are restricted to `[A-Za-z0-9_.-]` and may not start with a dot,
    /// so a key can never name a path outside the data directory.
    pub fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write-then-rename keeps the previous record intact if the write fails
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Platform data directory for raffle state
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ReelRaffle")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("slot_machine_state_v3").unwrap(), None);
        store.set("slot_machine_state_v3", "{\"a\":1}").unwrap();
        assert_eq!(
            store.get("slot_machine_state_v3").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(dir.path().join("nested/slot_machine_state_v3.json").exists());

        store.remove("slot_machine_state_v3").unwrap();
        assert_eq!(store.get("slot_machine_state_v3").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        for key in ["", "../escape", ".hidden", "a/b", "a\\b"] {
            assert!(
                matches!(store.set(key, "x"), Err(StoreError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }
}

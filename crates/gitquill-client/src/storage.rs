//! Durable key-value storage for client state.
//!
//! The store is the source of truth across restarts; the in-memory
//! [`Session`](crate::session::Session) is a mirror hydrated from it at
//! `init()` and written through on every mutation.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Key holding the access token.
pub const TOKEN_KEY: &str = "github_token";

/// Key holding the single-use OAuth state nonce.
pub const STATE_KEY: &str = "oauth_state";

/// Default state file name within the data directory.
pub const STATE_FILE: &str = "client-state.json";

// ============================================================================
// KeyValueStore Trait
// ============================================================================

/// String key-value persistence.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read a key. Absent keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a key.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Shared store for use across clones of the client.
pub type SharedStore = Arc<dyn KeyValueStore>;

// ============================================================================
// FileStore
// ============================================================================

/// JSON-file backed store.
///
/// The whole map is rewritten on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store in `data_dir` using the default file name.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_path(data_dir.join(STATE_FILE))
    }

    /// Create a store at an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Storage(format!("Failed to read state file: {}", e)))?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| Error::Storage(format!("Failed to parse state file: {}", e)))
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create state directory: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(map)
            .map_err(|e| Error::Storage(format!("Failed to serialize state: {}", e)))?;

        std::fs::write(&self.path, json)
            .map_err(|e| Error::Storage(format!("Failed to write state file: {}", e)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)?;
        tracing::debug!(key, path = %self.path.display(), "Persisted client state");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

// ============================================================================
// NullStore
// ============================================================================

/// Store for contexts with no durable storage: reads are always empty and
/// writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_starts_empty() {
        let temp = tempdir().unwrap();
        let store = FileStore::new(temp.path());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(STATE_KEY).unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_set_get_remove() {
        let temp = tempdir().unwrap();
        let store = FileStore::new(temp.path());

        store.set(TOKEN_KEY, "gho_token").unwrap();
        store.set(STATE_KEY, "nonce").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("gho_token"));

        store.remove(STATE_KEY).unwrap();
        assert_eq!(store.get(STATE_KEY).unwrap(), None);
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("gho_token"));

        store.remove("never-set").unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp = tempdir().unwrap();
        FileStore::new(temp.path())
            .set(TOKEN_KEY, "persisted")
            .unwrap();

        let reopened = FileStore::new(temp.path());
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_file_store_creates_nested_directories() {
        let temp = tempdir().unwrap();
        let store = FileStore::with_path(temp.path().join("a").join("b").join("state.json"));
        store.set(TOKEN_KEY, "t").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_file_store_corrupt_file_is_storage_error() {
        let temp = tempdir().unwrap();
        let store = FileStore::new(temp.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.get(TOKEN_KEY), Err(Error::Storage(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::with_entries([(TOKEN_KEY, "seeded")]);
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("seeded"));
        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_null_store_drops_writes() {
        let store = NullStore;
        store.set(TOKEN_KEY, "ignored").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }
}

//! Key-value persistence capability.
//!
//! The local cart persists through an injected [`KeyValueStore`] rather than
//! a hard-wired storage medium, so it can run against a real on-disk store
//! in production and an in-memory fake in tests.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Generic get/set/remove persistence scoped to the client instance.
///
/// Implementations are synchronous; values are opaque strings (the callers
/// own the encoding). A store shared by concurrent client instances has
/// last-write-wins semantics - there is no cross-instance locking.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the storage medium is unavailable.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails (quota, permissions).
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the value stored under `key`. Removing an absent key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the storage medium is unavailable.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and for the degraded mode when real storage is
/// unavailable.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON document per key under a directory.
///
/// Survives process restarts, which gives the anonymous cart its
/// cross-session persistence.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("cart").expect("get"), None);

        store.set("cart", "[]").expect("set");
        assert_eq!(store.get("cart").expect("get").as_deref(), Some("[]"));

        store.remove("cart").expect("remove");
        assert_eq!(store.get("cart").expect("get"), None);
    }

    #[test]
    fn test_memory_store_remove_absent_key_is_ok() {
        let mut store = MemoryStore::new();
        store.remove("missing").expect("remove absent");
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("clementine-kv-{}", std::process::id()));
        let mut store = FileStore::open(&dir).expect("open");

        store.set("cart", r#"[{"productId":"p1","quantity":2}]"#).expect("set");
        let value = store.get("cart").expect("get").expect("present");
        assert!(value.contains("p1"));

        store.remove("cart").expect("remove");
        assert_eq!(store.get("cart").expect("get"), None);

        std::fs::remove_dir_all(&dir).ok();
    }
}

//! Durable key-value stores that hold snapshots.
//!
//! `DirStore` keeps one JSON file per key inside a directory and is what the
//! application uses. `MemoryStore` keeps everything in a shared map with an
//! optional byte quota, for tests and throwaway sessions.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::StorageError;


/// A durable string store addressed by fixed keys.
pub trait KeyValueStore {
    /// Read the text stored under `key`, or `None` if nothing is stored.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `text` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, text: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.read(key)?.is_some())
    }
}


// ---------------------------------------------------------------------------
// DirStore
// ---------------------------------------------------------------------------

/// One file per key (`<dir>/<key>.json`), written via temp file + rename.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file backing `key`.
    pub fn file_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StorageError::Unavailable(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key '{}'", key),
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for DirStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let file = self.file_for(key)?;
        match fs::read_to_string(&file) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Unavailable(e)),
        }
    }

    fn write(&mut self, key: &str, text: &str) -> Result<(), StorageError> {
        let file = self.file_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = file.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        if let Err(e) = fs::rename(&tmp, &file) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let file = self.file_for(key)?;
        match fs::remove_file(&file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Unavailable(e)),
        }
    }
}


// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store. Clones share the same contents, so a second store
/// opened on a clone sees what the first one saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses writes once the total stored bytes would exceed `quota`.
    pub fn with_quota(quota: usize) -> Self {
        MemoryStore {
            entries: Arc::default(),
            quota: Some(quota),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&mut self, key: &str, text: &str) -> Result<(), StorageError> {
        let quota = self.quota;
        let mut entries = self.lock();
        if let Some(quota) = quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + text.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        entries.insert(key.to_string(), text.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_store_write_read_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(tmp.path().join("data"));
        assert_eq!(store.read("dashboardData").unwrap(), None);

        store.write("dashboardData", "{\"a\":1}").unwrap();
        assert_eq!(store.read("dashboardData").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(store.contains("dashboardData").unwrap());
        assert!(tmp.path().join("data").join("dashboardData.json").exists());

        store.remove("dashboardData").unwrap();
        assert!(!store.contains("dashboardData").unwrap());
    }

    #[test]
    fn dir_store_remove_absent_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(tmp.path());
        assert!(store.remove("nothing-here").is_ok());
    }

    #[test]
    fn dir_store_overwrite_leaves_no_temp_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(tmp.path());
        store.write("k", "one").unwrap();
        store.write("k", "two").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("two"));
        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["k.json".to_string()]);
    }

    #[test]
    fn dir_store_failed_rename_removes_temp_file() {
        let tmp = tempfile::tempdir().unwrap();
        // A non-empty directory where the key's file should go.
        fs::create_dir_all(tmp.path().join("k.json").join("inner")).unwrap();
        let mut store = DirStore::new(tmp.path());

        assert!(matches!(store.write("k", "one"), Err(StorageError::Unavailable(_))));
        assert!(!tmp.path().join("k.json.tmp").exists());
    }

    #[test]
    fn dir_store_rejects_path_like_keys() {
        let store = DirStore::new("/tmp");
        assert!(store.file_for("../escape").is_err());
        assert!(store.file_for("a/b").is_err());
        assert!(store.file_for("").is_err());
    }

    #[test]
    fn memory_store_clones_share_contents() {
        let mut a = MemoryStore::new();
        let b = a.clone();
        a.write("k", "v").unwrap();
        assert_eq!(b.read("k").unwrap().as_deref(), Some("v"));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn memory_store_enforces_quota() {
        let mut store = MemoryStore::with_quota(10);
        store.write("k", "12345").unwrap();
        match store.write("k2", "123456789") {
            Err(StorageError::QuotaExceeded { quota, .. }) => assert_eq!(quota, 10),
            other => panic!("expected QuotaExceeded, got {:?}", other),
        }
        // Replacing an existing key only counts the new value.
        store.write("k", "1234567").unwrap();
    }
}

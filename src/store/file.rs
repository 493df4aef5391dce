//! JSON file key-value store
//!
//! Every access re-reads the file, and every mutation is a read-modify-write
//! of the key it touches, so writes from another process to other keys are
//! kept. The map is then serialized to a sibling `.tmp` file and renamed over
//! the original so a crash mid-write never leaves a truncated store behind.

use super::{KeyValueStore, StoreError, StoreResult};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key-value store persisted as a JSON object of strings
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open a store file, treating a missing or empty file as an empty store
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = read_entries(&path)?;

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened file store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_through(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(entries)?;
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn mutate<F>(&self, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        *entries = read_entries(&self.path)?;

        if f(&mut entries) {
            self.write_through(&entries)?;
        }
        Ok(())
    }
}

fn read_entries(path: &Path) -> StoreResult<BTreeMap<String, String>> {
    match std::fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(content) => serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        *entries = read_entries(&self.path)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.mutate(|entries| {
            let previous = entries.insert(key.to_string(), value.to_string());
            previous.as_deref() != Some(value)
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.mutate(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        assert_eq!(store.get("timeIn").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set("isTracking", "true").unwrap();
            store.set("elapsedTime", "00:05:00").unwrap();
            store.set("accessToken", "abc").unwrap();
            store.remove("accessToken").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("isTracking").unwrap().as_deref(), Some("true"));
        assert_eq!(reopened.get("elapsedTime").unwrap().as_deref(), Some("00:05:00"));
        assert_eq!(reopened.get("accessToken").unwrap(), None);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_writes_keep_keys_set_by_another_handle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let watcher = FileStore::open(&path).unwrap();
        watcher.set("isTracking", "true").unwrap();

        let other = FileStore::open(&path).unwrap();
        other.set("accessToken", "fresh").unwrap();
        assert_eq!(watcher.get("accessToken").unwrap().as_deref(), Some("fresh"));

        watcher.set("elapsedTime", "00:00:01").unwrap();
        other.remove("isTracking").unwrap();
        watcher.set("elapsedTime", "00:00:02").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("accessToken").unwrap().as_deref(), Some("fresh"));
        assert_eq!(reopened.get("isTracking").unwrap(), None);
        assert_eq!(reopened.get("elapsedTime").unwrap().as_deref(), Some("00:00:02"));
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_empty_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "\n").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("isTracking").unwrap(), None);
    }
}

//! In-memory key-value store

use super::{KeyValueStore, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Key-value store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("isTracking", "true").unwrap();
        assert_eq!(store.get("isTracking").unwrap().as_deref(), Some("true"));

        store.set("isTracking", "false").unwrap();
        assert_eq!(store.get("isTracking").unwrap().as_deref(), Some("false"));
        assert_eq!(store.len(), 1);

        store.remove("isTracking").unwrap();
        assert_eq!(store.get("isTracking").unwrap(), None);

        // Removing twice is fine
        store.remove("isTracking").unwrap();
    }
}

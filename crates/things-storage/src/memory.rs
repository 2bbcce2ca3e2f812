use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::error::{StorageError, StorageResult};
use crate::path::KeyPath;
use crate::traits::KeyValueStore;

/// In-memory, HashMap-based key-value store.
///
/// Intended for tests and embedding. Documents are held behind a `RwLock`
/// and cloned on read/write.
pub struct InMemoryStore {
    entries: RwLock<HashMap<KeyPath, Json>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Return a sorted list of all stored keys.
    pub fn keys(&self) -> Vec<KeyPath> {
        let map = self.entries.read().expect("lock poisoned");
        let mut keys: Vec<KeyPath> = map.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &KeyPath) -> StorageResult<Option<Json>> {
        ensure_not_empty(key)?;
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &KeyPath, value: &Json) -> StorageResult<()> {
        ensure_not_empty(key)?;
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(key.clone(), value.clone());
        Ok(())
    }
}

fn ensure_not_empty(key: &KeyPath) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_segment("", "key must have at least one segment"));
    }
    Ok(())
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("key_count", &self.len())
            .finish()
    }
}

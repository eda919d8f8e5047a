//! In-memory store backend

use super::{KvStore, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-local store, the default for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let map = self
            .map
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut map = self
            .map
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut map = self
            .map
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        map.remove(key);
        Ok(())
    }
}

// In-memory cache store.
// HashMap behind an async RwLock, for embedding and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheEntry, CacheStore};
use crate::error::Result;

/// Cache store backed by a process-local map. Entries do not survive restarts.
pub struct MemoryStore<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> CacheStore<T> for MemoryStore<T> {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry<T>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, entry: CacheEntry<T>) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set("user/1", CacheEntry::new(42)).await.unwrap();

        let entry = store.get("user/1").await.unwrap();
        assert_eq!(entry.map(|e| e.data), Some(42));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_absent_key() {
        let store: MemoryStore<i32> = MemoryStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_replaces_previous_entry() {
        let store = MemoryStore::new();
        store.set("k", CacheEntry::new(1)).await.unwrap();
        store.set("k", CacheEntry::new(2)).await.unwrap();

        let entry = store.get("k").await.unwrap();
        assert_eq!(entry.map(|e| e.data), Some(2));
        assert_eq!(store.len().await, 1);
    }
}

//! In-memory key-value store

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::KvStore;
use crate::error::{ClientError, ClientResult};

/// Process-local store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| ClientError::persistence(key, e))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ClientError::persistence(key, e))?;
        entries.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ClientError::persistence(key, e))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let kv = MemoryKvStore::new();
        assert_eq!(kv.get("a").await.unwrap(), None);

        kv.set("a", "1").await.unwrap();
        kv.set("a", "2").await.unwrap();
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("2"));
        assert_eq!(kv.write_count(), 2);

        kv.remove("a").await.unwrap();
        kv.remove("a").await.unwrap();
        assert!(!kv.contains("a"));
    }
}

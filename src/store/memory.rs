use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use super::{KvStore, StoreResult};

/// An in-memory store behind a `RwLock`. Cheaply cloneable, clones share the same data.
///
/// Nothing is persisted, everything is lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut data = self.data.write().await;
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    // Check and insert happen under the same write lock.
    async fn put_if_absent(&self, key: &str, value: &str) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        if data.contains_key(key) {
            return Ok(false);
        }
        data.insert(key.to_owned(), value.to_owned());
        Ok(true)
    }
}

//! Key-value storage used to persist subscriber records.
//!
//! The service only ever needs to address one key per request, so the interface is kept
//! to the bare minimum: `get`, `put` and an optional conditional `put_if_absent`.
//!
//! Two backends are provided:
//! - [`MemoryStore`]: process-local, used for local development and the test suite
//! - [`RedisStore`]: a pooled Redis connection, survives restarts

mod error;
mod memory;
mod redis;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use redis::RedisStore;

use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};

/// A minimal async key-value store holding string values.
///
/// Implementations must be safe to share across tasks.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Returns `Ok(None)` if the key does not exist.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores the value, overwriting anything already stored under `key`.
    async fn put(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Stores the value only if `key` is vacant. Returns `true` if the value was written.
    ///
    /// The default implementation is a plain `get` followed by a `put` and is **not** atomic.
    /// Backends that offer a conditional write primitive should override it.
    async fn put_if_absent(&self, key: &str, value: &str) -> StoreResult<bool> {
        if self.get(key).await?.is_some() {
            return Ok(false);
        }
        self.put(key, value).await?;
        Ok(true)
    }
}

/// Builds the backend selected in the configuration.
pub async fn init_store(config: &StoreConfig) -> StoreResult<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Redis => Arc::new(RedisStore::init(config).await?),
    };
    Ok(store)
}

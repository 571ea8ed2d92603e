use fred::{
    prelude::{ClientLike, Config, KeysInterface, Pool},
    types::{Builder, SetOptions},
};
use secrecy::ExposeSecret;
use tracing::info;

use super::{KvStore, StoreError, StoreResult};
use crate::config::StoreConfig;

/// Contains a redis connection pool that is cheaply cloneable
#[derive(Clone, Debug)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    pub async fn init(store_config: &StoreConfig) -> StoreResult<Self> {
        info!("{:<20} - Initializing the REDIS client", "init_redis_store");
        let conf = Config::from_url(store_config.redis_uri.expose_secret())
            .map_err(|er| StoreError::Connect(er.to_string()))?;

        let timeout = store_config.connection_timeout();
        let pool = Builder::from_config(conf)
            .with_connection_config(|config| config.connection_timeout = timeout)
            .build_pool(store_config.pool_size)
            .map_err(|er| StoreError::Connect(er.to_string()))?;

        pool.init()
            .await
            .map_err(|er| StoreError::Connect(er.to_string()))?;
        info!("connected to REDIS");

        Ok(RedisStore { pool })
    }
}

#[async_trait::async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.pool
            .get::<Option<String>, _>(key)
            .await
            .map_err(|er| StoreError::Read {
                key: key.to_string(),
                reason: er.to_string(),
            })
    }

    async fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        self.pool
            .set::<(), _, _>(key, value, None, None, false)
            .await
            .map_err(|er| StoreError::Write {
                key: key.to_string(),
                reason: er.to_string(),
            })
    }

    // SET NX replies with nil when the key already exists.
    async fn put_if_absent(&self, key: &str, value: &str) -> StoreResult<bool> {
        let reply = self
            .pool
            .set::<Option<String>, _, _>(key, value, None, Some(SetOptions::NX), false)
            .await
            .map_err(|er| StoreError::Write {
                key: key.to_string(),
                reason: er.to_string(),
            })?;

        Ok(reply.is_some())
    }
}

mod subscriber;

pub use subscriber::{storage_key, SubscriberRecord, STORAGE_KEY_PREFIX};

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::{
    config::InsertMode,
    store::{KvStore, StoreError},
    web::types::ValidEmail,
};

/// Whether a submission created a new record or hit an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::AsRefStr)]
pub enum RecordOutcome {
    Created,
    AlreadySubscribed,
}

/// Owns the key-value store handle. Cheaply cloneable.
#[derive(Clone)]
pub struct ModelManager {
    store: Arc<dyn KvStore>,
    insert_mode: InsertMode,
}

impl ModelManager {
    pub fn new(store: Arc<dyn KvStore>, insert_mode: InsertMode) -> Self {
        Self { store, insert_mode }
    }

    /// Persists a subscriber record under `email:<address>` unless one already exists.
    /// An existing record is never touched, the first write wins.
    pub async fn record_subscriber(
        &self,
        email: &ValidEmail,
        user_agent_hint: String,
    ) -> Result<RecordOutcome> {
        let key = storage_key(email);
        let record = SubscriberRecord::new(email, user_agent_hint, Utc::now());

        let created = match self.insert_mode {
            InsertMode::CheckThenPut => {
                if self.store.get(&key).await?.is_some() {
                    false
                } else {
                    self.store.put(&key, &serde_json::to_string(&record)?).await?;
                    true
                }
            }
            InsertMode::PutIfAbsent => {
                self.store
                    .put_if_absent(&key, &serde_json::to_string(&record)?)
                    .await?
            }
        };

        let outcome = if created {
            RecordOutcome::Created
        } else {
            RecordOutcome::AlreadySubscribed
        };
        debug!(%key, ?outcome, "record_subscriber");

        Ok(outcome)
    }

    /// Fetches and decodes the record stored for `email`, if any.
    pub async fn get_subscriber(&self, email: &ValidEmail) -> Result<Option<SubscriberRecord>> {
        let key = storage_key(email);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }
}

impl std::fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("insert_mode", &self.insert_mode)
            .finish_non_exhaustive()
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("subscriber record (de)serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

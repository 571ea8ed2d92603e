use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{Arc, OnceLock},
};

use anyhow::Result;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use signup_intake::{
    config::InsertMode,
    init_dbg_tracing,
    model::{ModelManager, SubscriberRecord},
    store::{KvStore, MemoryStore, StoreError, StoreResult},
    web::types::ValidEmail,
    App, AppState,
};
use tokio::net::TcpListener;
use tracing::info;

/// Trying to bind port 0 will trigger an OS scan for an available port
/// which will then be bound to the application.
const TEST_SOCK_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 0);

/// Set `TEST_LOG` to see the server logs while running the tests.
fn init_test_subscriber() {
    static SUBSCRIBER: OnceLock<()> = OnceLock::new();
    SUBSCRIBER.get_or_init(|| {
        if std::env::var("TEST_LOG").is_ok() {
            init_dbg_tracing();
        }
    });
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub http_client: reqwest::Client,
    pub store: MemoryStore,
    pub mm: ModelManager,
}

impl TestApp {
    /// Spawns the app on a random port, backed by a fresh `MemoryStore`.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(InsertMode::CheckThenPut).await
    }

    pub async fn spawn_with(insert_mode: InsertMode) -> Result<Self> {
        let store = MemoryStore::new();
        Self::spawn_on(Arc::new(store.clone()), store, insert_mode).await
    }

    /// Spawns the app on a store that fails every operation.
    /// `TestApp::store` is left empty and unused.
    pub async fn spawn_with_failing_store() -> Result<Self> {
        Self::spawn_on(
            Arc::new(FailingStore),
            MemoryStore::new(),
            InsertMode::CheckThenPut,
        )
        .await
    }

    async fn spawn_on(
        backend: Arc<dyn KvStore>,
        store: MemoryStore,
        insert_mode: InsertMode,
    ) -> Result<Self> {
        init_test_subscriber();

        let mm = ModelManager::new(backend, insert_mode);
        let app_state = AppState::new(mm.clone());

        let listener = TcpListener::bind(TEST_SOCK_ADDR).await?;
        let addr = listener.local_addr()?;
        info!("Listening on {addr}");

        tokio::spawn(signup_intake::serve(App::new(app_state, listener)));

        Ok(TestApp {
            addr,
            http_client: reqwest::Client::new(),
            store,
            mm,
        })
    }

    pub fn subscribe_url(&self) -> String {
        format!("http://{}/api/subscribe", self.addr)
    }

    pub async fn post_json(&self, body: &Value) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(self.subscribe_url())
            .json(body)
            .send()
            .await?;
        Ok(res)
    }

    /// Sends `body` as is, with the given content type (or none at all).
    pub async fn post_raw(
        &self,
        body: &'static str,
        content_type: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut req = self.http_client.post(self.subscribe_url()).body(body);
        if let Some(content_type) = content_type {
            req = req.header(CONTENT_TYPE, content_type);
        }
        Ok(req.send().await?)
    }

    pub async fn post_json_with_user_agent(
        &self,
        body: &Value,
        user_agent: &str,
    ) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(self.subscribe_url())
            .header(USER_AGENT, user_agent)
            .json(body)
            .send()
            .await?;
        Ok(res)
    }

    pub async fn stored_record(&self, email: &str) -> Result<Option<SubscriberRecord>> {
        let email = ValidEmail::parse(email).map_err(signup_intake::web::Error::from)?;
        Ok(self.mm.get_subscriber(&email).await?)
    }
}

/// A backend whose connection is gone.
struct FailingStore;

#[async_trait::async_trait]
impl KvStore for FailingStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Read {
            key: key.to_string(),
            reason: "connection refused".to_string(),
        })
    }

    async fn put(&self, key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Write {
            key: key.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

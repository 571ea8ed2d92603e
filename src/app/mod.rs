use std::sync::Arc;

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{config::AppConfig, model::ModelManager, store, Result};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Connects the configured store and binds the listener.
    pub async fn build_from_config(config: &AppConfig) -> Result<Self> {
        let store_config = &config.store_config;
        let store = store::init_store(store_config).await?;
        let model_mgr = ModelManager::new(store, store_config.insert_mode);
        let app_state = AppState::new(model_mgr);

        let listener = TcpListener::bind(config.net_config.socket_addr()).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        Ok(App::new(app_state, listener))
    }
}

pub struct InternalState {
    pub model_mgr: ModelManager,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(model_mgr: ModelManager) -> Self {
        AppState(Arc::new(InternalState { model_mgr }))
    }
}

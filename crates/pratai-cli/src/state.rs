//! Application state wiring configuration, storage, and the backend together.

use std::path::PathBuf;

use pratai_core::delivery::DeliveryStrategy;
use pratai_core::store::ConversationStore;
use pratai_infra::config::load_client_config;
use pratai_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use pratai_infra::http::HttpBackend;
use pratai_infra::sqlite::kv::SqliteKvStore;
use pratai_infra::sqlite::pool::DatabasePool;
use pratai_types::config::ClientConfig;
use pratai_types::delivery::DeliveryMode;

/// Conversation store pinned to the concrete infra implementations.
pub type ConcreteStore = ConversationStore<HttpBackend, SqliteKvStore>;

pub struct AppState {
    pub config: ClientConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Load configuration and open the local database.
    ///
    /// `api_url` comes from the command line and beats both the config file
    /// and the environment.
    pub async fn init(api_url: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir).await?;

        let mut config = load_client_config(&data_dir).await;
        if let Some(url) = api_url {
            config.api_base_url = url;
        }
        tracing::debug!(
            api = %config.api_base_url,
            mode = %config.delivery_mode,
            data_dir = %data_dir.display(),
            "Configuration loaded"
        );

        let db_pool = DatabasePool::open_in(&data_dir).await?;

        Ok(Self {
            config,
            data_dir,
            db_pool,
        })
    }

    pub fn backend(&self) -> anyhow::Result<HttpBackend> {
        Ok(HttpBackend::from_config(&self.config)?)
    }

    pub fn kv(&self) -> SqliteKvStore {
        SqliteKvStore::new(self.db_pool.clone())
    }

    /// Open the conversation store without touching the network.
    pub async fn open_store(&self, mode: Option<DeliveryMode>) -> anyhow::Result<ConcreteStore> {
        let mut strategy = DeliveryStrategy::from_config(&self.config);
        if let Some(mode) = mode {
            strategy.mode = mode;
        }
        let store = ConversationStore::open(self.backend()?, self.kv(), strategy)
            .await
            .with_history_limit(self.config.history_limit);
        Ok(store)
    }
}

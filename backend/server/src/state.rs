use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use super::{
    config::{Config, StoreKind},
    database::RedisStore,
    memory::MemoryStore,
    store::DocumentStore,
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Arc<Self>> {
        let config = Config::load()?;

        let store: Arc<dyn DocumentStore> = match config.store {
            StoreKind::Redis => Arc::new(
                RedisStore::connect(&config.redis_url, config.transaction_attempts)
                    .await
                    .context("Failed to connect to Redis")?,
            ),
            StoreKind::Memory => {
                warn!("Using the in-memory store, complaints will not survive a restart");
                Arc::new(MemoryStore::new(Some(0)).with_max_attempts(config.transaction_attempts))
            }
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}

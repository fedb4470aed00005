use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::realtime::Broadcaster;

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub broadcaster: Arc<Broadcaster>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let broadcaster = Broadcaster::new(
            store.clone(),
            Duration::from_secs(config.realtime.broadcast_interval_seconds),
            config.realtime.feed_buffer_size,
        );

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            broadcaster,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}

use crate::config::AppConfig;
use crate::storage::{LocalStorage, StorageClient};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let local = LocalStorage::new(&config.media.dir).await?;
        tracing::info!(dir = %local.root().display(), "media storage ready");
        let storage = Arc::new(local) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(db, config, storage))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>, storage: Arc<dyn StorageClient>) -> Self {
        Self {
            db,
            config,
            storage,
        }
    }
}

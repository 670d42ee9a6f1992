//! CLI command implementations.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::embeddings::OpenAiEmbeddingClient;
use crate::adapters::sqlite::{create_pool, SqliteFoodSource, SqliteVectorStore};
use crate::domain::models::Config;

pub mod embed;
pub mod init;
pub mod search;
pub mod stats;

/// Shared wiring for commands: the three adapters over one pool.
pub(crate) struct AppContext {
    pub records: Arc<SqliteFoodSource>,
    pub index: Arc<SqliteVectorStore>,
    pub provider: Arc<OpenAiEmbeddingClient>,
}

impl AppContext {
    pub async fn build(config: &Config) -> Result<Self> {
        let pool = create_pool(&config.database.path, config.database.max_connections)
            .await
            .with_context(|| format!("Failed to open database at {}", config.database.path))?;

        let records = Arc::new(SqliteFoodSource::new(pool.clone()));
        let index = Arc::new(SqliteVectorStore::new(pool.clone()).await);
        let provider = Arc::new(
            OpenAiEmbeddingClient::new(config.embedding.clone(), &config.retry)
                .context("Failed to build embedding client")?,
        );

        Ok(Self {
            records,
            index,
            provider,
        })
    }
}

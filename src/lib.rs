//! fooddb - USDA food database with semantic vector search
//!
//! fooddb stores food records in SQLite, generates vector embeddings for
//! their descriptions through the OpenAI embeddings API, persists them in
//! a sqlite-vec index, and answers nearest-neighbor queries over them.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, port traits, and error taxonomy
//! - **Service Layer** (`services`): The batch embedding pipeline and the
//!   similarity search service
//! - **Adapters** (`adapters`): SQLite storage and the OpenAI client
//! - **Infrastructure** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use fooddb::adapters::sqlite::{create_pool, SqliteFoodSource, SqliteVectorStore};
//! use fooddb::services::EmbeddingPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = create_pool("fooddb.sqlite", 5).await?;
//!     let store = Arc::new(SqliteVectorStore::new(pool.clone()).await);
//!     // wire a provider and run the pipeline
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, DatabaseConfig, EmbeddingConfig, FoodRecord, LoggingConfig, PipelineConfig,
    PipelineProgress, PipelineReport, RecordEmbedding, RetryConfig, SearchHit,
};
pub use domain::ports::{EmbeddingProvider, RecordSource, VectorIndex};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{EmbeddingPipeline, SearchService};

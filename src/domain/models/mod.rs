pub mod config;
pub mod embedding;
pub mod food;
pub mod pipeline;

pub use config::{
    Config, DatabaseConfig, EmbeddingConfig, LoggingConfig, PipelineConfig, RetryConfig,
};
pub use embedding::{RecordEmbedding, SearchHit};
pub use food::FoodRecord;
pub use pipeline::{PipelineProgress, PipelineReport};

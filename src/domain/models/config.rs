use serde::{Deserialize, Serialize};

/// Main configuration structure for fooddb
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Batch pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            embedding: EmbeddingConfig::default(),
            pipeline: PipelineConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    "fooddb.sqlite".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingConfig {
    /// API key. Falls back to the `OPENAI_API_KEY` env var when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the embeddings API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Embedding model identifier, stored alongside each vector
    #[serde(default = "default_model")]
    pub model: String,

    /// Vector dimension produced by the model
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum texts the service accepts per request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

const fn default_dimension() -> usize {
    1536
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_batch_size() -> usize {
    2048
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            dimension: default_dimension(),
            timeout_secs: default_request_timeout_secs(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

/// Batch pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Records pulled from the store per round
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Records per embedding API call; must not exceed the client's
    /// declared maximum
    #[serde(default = "default_api_batch_size")]
    pub api_batch_size: usize,

    /// Concurrent workers processing sub-batches
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Wall-clock budget for one run, in seconds
    #[serde(default = "default_pipeline_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_batch_size() -> u32 {
    1000
}

const fn default_api_batch_size() -> usize {
    100
}

const fn default_parallelism() -> usize {
    1
}

const fn default_pipeline_timeout_secs() -> u64 {
    600
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            api_batch_size: default_api_batch_size(),
            parallelism: default_parallelism(),
            timeout_secs: default_pipeline_timeout_secs(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    60_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database.path, "fooddb.sqlite");
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.embedding.dimension, 1536);
        assert_eq!(config.pipeline.batch_size, 1000);
        assert_eq!(config.pipeline.api_batch_size, 100);
        assert_eq!(config.pipeline.parallelism, 1);
        assert_eq!(config.pipeline.timeout_secs, 600);
        assert_eq!(config.retry.max_retries, 3);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r"
pipeline:
  parallelism: 4
embedding:
  model: text-embedding-3-large
  dimension: 3072
";
        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");
        assert_eq!(config.pipeline.parallelism, 4);
        assert_eq!(config.pipeline.batch_size, 1000);
        assert_eq!(config.embedding.model, "text-embedding-3-large");
        assert_eq!(config.embedding.dimension, 3072);
        assert_eq!(config.embedding.base_url, "https://api.openai.com/v1");
    }
}

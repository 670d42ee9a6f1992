use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid embedding dimension: {0}. Must be at least 1")]
    InvalidDimension(usize),

    #[error("Embedding model cannot be empty")]
    EmptyModel,

    #[error("Invalid batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(u32),

    #[error("Invalid api_batch_size: {got}. Must be between 1 and max_batch_size ({max})")]
    InvalidApiBatchSize { got: usize, max: usize },

    #[error("Invalid parallelism: {0}. Must be at least 1")]
    InvalidParallelism(usize),

    #[error("Invalid timeout: {0}. Must be at least 1 second")]
    InvalidTimeout(u64),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .fooddb/config.yaml (project config)
    /// 3. .fooddb/local.yaml (local overrides, optional)
    /// 4. Environment variables (`FOODDB_*` prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".fooddb/config.yaml"))
            .merge(Yaml::file(".fooddb/local.yaml"))
            .merge(Env::prefixed("FOODDB_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("FOODDB_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.embedding.dimension == 0 {
            return Err(ConfigError::InvalidDimension(config.embedding.dimension));
        }
        if config.embedding.model.is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        if config.pipeline.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(config.pipeline.batch_size));
        }
        if config.pipeline.api_batch_size == 0
            || config.pipeline.api_batch_size > config.embedding.max_batch_size
        {
            return Err(ConfigError::InvalidApiBatchSize {
                got: config.pipeline.api_batch_size,
                max: config.embedding.max_batch_size,
            });
        }
        if config.pipeline.parallelism == 0 {
            return Err(ConfigError::InvalidParallelism(config.pipeline.parallelism));
        }
        if config.pipeline.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.pipeline.timeout_secs));
        }

        if config.retry.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.retry.max_retries));
        }
        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}

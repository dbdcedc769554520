//! Configuration management (§10.3)
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use docflow::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("API listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `DOCFLOW__<section>__<key>`
//!
//! Examples:
//! - `DOCFLOW__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `DOCFLOW__ADAPTERS__LLM_BASE_URL=http://llm-prod:8103/v1`
//! - `DOCFLOW__WORKER__WORKER_CONCURRENCY=16`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/docflow.toml`.
//! This can be overridden using the `DOCFLOW_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{AdaptersConfig, Config, RetentionConfig, ServerConfig, TelemetryConfig, WorkerRuntimeConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path. Useful for testing with
    /// custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        fs::write(&config_path, "").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.worker.worker_concurrency, 8);
    }

    #[test]
    fn test_validation_catches_invalid_backoff() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[worker]
retry_backoff_base_ms = 999999
retry_backoff_cap_ms = 1000
        "#;
        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::BackoffBaseExceedsCap { .. })
        ));
    }

    #[test]
    fn test_full_config_example() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "0.0.0.0:8080"
ledger_path = "data/ledger"
queue_path = "data/queue"
max_upload_bytes = "25MB"

[adapters]
ocr_base_url = "http://ocr:8101"
llm_base_url = "http://llm:8103/v1"
llm_model = "prod-instruct"
vector_dimension = 768

[worker]
worker_concurrency = 8
max_retries = 3
retry_backoff_base_ms = 1000
retry_backoff_cap_ms = 60000
job_deadline_seconds = 900

[retention]
job_ttl_days = 30
logs_ttl_days = 30
idempotency_ttl_days = 14
ledger_max_bytes = "50GB"

[telemetry]
metrics_addr = "0.0.0.0:9090"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.adapters.llm_model, "prod-instruct");
        assert_eq!(config.worker.max_retries, 3);
        assert_eq!(config.retention.job_ttl_days, 30);
        assert!(config.telemetry.otlp_endpoint.is_none());
    }
}

use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "DOCFLOW_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/docflow.toml";
const ENV_PREFIX: &str = "DOCFLOW";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config);
    Ok(config)
}

/// Load secrets from environment variables into config. Secrets are never
/// stored in TOML files, only in environment (§10.3).
fn load_secrets(config: &mut Config) {
    if let Ok(key) = env::var("DOCFLOW_LLM_API_KEY") {
        config.adapters.llm_api_key = Some(key);
    }
    if let Ok(key) = env::var("DOCFLOW_LEXICAL_ADMIN_KEY") {
        config.adapters.lexical_admin_key = Some(key);
    }
}

/// Load configuration from a specific path and environment. Useful for
/// testing with custom config files.
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // DOCFLOW__SERVER__BIND_ADDR -> server.bind_addr
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.worker.max_retries, 3);
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:9000"

[adapters]
llm_model = "custom-instruct"
vector_dimension = 1536

[worker]
worker_concurrency = 16
max_retries = 5
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.adapters.llm_model, "custom-instruct");
        assert_eq!(config.adapters.vector_dimension, 1536);
        assert_eq!(config.worker.worker_concurrency, 16);
        assert_eq!(config.worker.max_retries, 5);
    }
}

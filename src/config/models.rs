use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration (§6, §10.3).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub adapters: AdaptersConfig,
    #[serde(default)]
    pub worker: WorkerRuntimeConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Ingress server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
    #[serde(default = "default_queue_path")]
    pub queue_path: PathBuf,
    #[serde(default = "default_blob_dir")]
    pub blob_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: ByteSize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            ledger_path: default_ledger_path(),
            queue_path: default_queue_path(),
            blob_dir: default_blob_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("data/ledger")
}

fn default_queue_path() -> PathBuf {
    PathBuf::from("data/queue")
}

fn default_blob_dir() -> PathBuf {
    PathBuf::from("data/blobs")
}

fn default_max_upload_bytes() -> ByteSize {
    ByteSize(25 * 1024 * 1024)
}

/// Backend adapter endpoints (§4.1, §6). Secrets (`llm_api_key`,
/// `lexical_admin_key`) are never read from the TOML file, only from
/// environment variables, via `sources::load_secrets` (§10.3).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdaptersConfig {
    #[serde(default = "default_ocr_base_url")]
    pub ocr_base_url: String,
    #[serde(default = "default_adapter_timeout_secs")]
    pub ocr_timeout_seconds: u64,

    #[serde(default = "default_classifier_base_url")]
    pub classifier_base_url: String,
    #[serde(default = "default_adapter_timeout_secs")]
    pub classifier_timeout_seconds: u64,
    #[serde(default)]
    pub classifier_demo_mode: bool,
    #[serde(default = "default_classifier_confidence_threshold")]
    pub classifier_confidence_threshold: f32,

    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_seconds: u64,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_adapter_timeout_secs")]
    pub embed_timeout_seconds: u64,
    #[serde(default = "default_vector_dimension")]
    pub vector_dimension: usize,
    #[serde(skip)]
    pub llm_api_key: Option<String>,

    #[serde(default = "default_lexical_url")]
    pub lexical_url: String,
    #[serde(default = "default_lexical_index_name")]
    pub lexical_index_name: String,
    #[serde(skip)]
    pub lexical_admin_key: Option<String>,
    #[serde(default = "default_adapter_timeout_secs")]
    pub lexical_timeout_seconds: u64,

    #[serde(default = "default_vector_host")]
    pub vector_host: String,
    #[serde(default = "default_vector_port")]
    pub vector_port: u16,
    #[serde(default = "default_vector_collection")]
    pub vector_collection: String,
    #[serde(default = "default_adapter_timeout_secs")]
    pub vector_timeout_seconds: u64,
}

impl AdaptersConfig {
    pub fn vector_base_url(&self) -> String {
        format!("http://{}:{}", self.vector_host, self.vector_port)
    }
}

impl Default for AdaptersConfig {
    fn default() -> Self {
        Self {
            ocr_base_url: default_ocr_base_url(),
            ocr_timeout_seconds: default_adapter_timeout_secs(),
            classifier_base_url: default_classifier_base_url(),
            classifier_timeout_seconds: default_adapter_timeout_secs(),
            classifier_demo_mode: false,
            classifier_confidence_threshold: default_classifier_confidence_threshold(),
            llm_base_url: default_llm_base_url(),
            llm_model: default_llm_model(),
            llm_timeout_seconds: default_llm_timeout_secs(),
            embedding_model: default_embedding_model(),
            embed_timeout_seconds: default_adapter_timeout_secs(),
            vector_dimension: default_vector_dimension(),
            llm_api_key: None,
            lexical_url: default_lexical_url(),
            lexical_index_name: default_lexical_index_name(),
            lexical_admin_key: None,
            lexical_timeout_seconds: default_adapter_timeout_secs(),
            vector_host: default_vector_host(),
            vector_port: default_vector_port(),
            vector_collection: default_vector_collection(),
            vector_timeout_seconds: default_adapter_timeout_secs(),
        }
    }
}

fn default_ocr_base_url() -> String {
    "http://localhost:8101".to_string()
}
fn default_classifier_base_url() -> String {
    "http://localhost:8102".to_string()
}
fn default_classifier_confidence_threshold() -> f32 {
    0.65
}
fn default_llm_base_url() -> String {
    "http://localhost:8103/v1".to_string()
}
fn default_llm_model() -> String {
    "local-instruct".to_string()
}
fn default_embedding_model() -> String {
    "local-embeddings".to_string()
}
fn default_vector_dimension() -> usize {
    768
}
fn default_lexical_url() -> String {
    "http://localhost:7700".to_string()
}
fn default_lexical_index_name() -> String {
    "documents".to_string()
}
fn default_vector_host() -> String {
    "localhost".to_string()
}
fn default_vector_port() -> u16 {
    6333
}
fn default_vector_collection() -> String {
    "documents".to_string()
}
fn default_adapter_timeout_secs() -> u64 {
    30
}
fn default_llm_timeout_secs() -> u64 {
    60
}

/// Work queue runtime tuning (§4.6).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerRuntimeConfig {
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_base_ms")]
    pub retry_backoff_base_ms: u64,
    #[serde(default = "default_retry_backoff_cap_ms")]
    pub retry_backoff_cap_ms: u64,
    #[serde(default = "default_job_deadline_seconds")]
    pub job_deadline_seconds: u64,
    #[serde(default = "default_visibility_timeout_seconds")]
    pub visibility_timeout_seconds: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_shutdown_grace_seconds")]
    pub shutdown_grace_seconds: u64,
}

impl Default for WorkerRuntimeConfig {
    fn default() -> Self {
        Self {
            worker_concurrency: default_worker_concurrency(),
            max_retries: default_max_retries(),
            retry_backoff_base_ms: default_retry_backoff_base_ms(),
            retry_backoff_cap_ms: default_retry_backoff_cap_ms(),
            job_deadline_seconds: default_job_deadline_seconds(),
            visibility_timeout_seconds: default_visibility_timeout_seconds(),
            poll_interval_ms: default_poll_interval_ms(),
            shutdown_grace_seconds: default_shutdown_grace_seconds(),
        }
    }
}

fn default_worker_concurrency() -> usize {
    8
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_backoff_base_ms() -> u64 {
    1_000
}
fn default_retry_backoff_cap_ms() -> u64 {
    60_000
}
fn default_job_deadline_seconds() -> u64 {
    15 * 60
}
fn default_visibility_timeout_seconds() -> u64 {
    15 * 60
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_shutdown_grace_seconds() -> u64 {
    30
}

/// Retention configuration (§11), mirrors the teacher's `ledger/pruning.rs`
/// constants but as configurable defaults rather than compiled-in `const`s.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetentionConfig {
    #[serde(default = "default_job_ttl_days")]
    pub job_ttl_days: u32,
    #[serde(default = "default_logs_ttl_days")]
    pub logs_ttl_days: u32,
    #[serde(default = "default_idempotency_ttl_days")]
    pub idempotency_ttl_days: u32,
    #[serde(default = "default_ledger_max_bytes")]
    pub ledger_max_bytes: ByteSize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            job_ttl_days: default_job_ttl_days(),
            logs_ttl_days: default_logs_ttl_days(),
            idempotency_ttl_days: default_idempotency_ttl_days(),
            ledger_max_bytes: default_ledger_max_bytes(),
        }
    }
}

fn default_job_ttl_days() -> u32 {
    30
}
fn default_logs_ttl_days() -> u32 {
    30
}
fn default_idempotency_ttl_days() -> u32 {
    14
}
fn default_ledger_max_bytes() -> ByteSize {
    ByteSize(50 * 1024 * 1024 * 1024)
}

/// Telemetry configuration, carried regardless of feature Non-goals (§10.5).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: SocketAddr,
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_addr: default_metrics_addr(),
            otlp_endpoint: None,
        }
    }
}

fn default_metrics_addr() -> SocketAddr {
    "0.0.0.0:9090".parse().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config {
            server: ServerConfig::default(),
            adapters: AdaptersConfig::default(),
            worker: WorkerRuntimeConfig::default(),
            retention: RetentionConfig::default(),
            telemetry: TelemetryConfig::default(),
        };

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.worker.max_retries, 3);
        assert_eq!(config.worker.retry_backoff_cap_ms, 60_000);
        assert_eq!(config.adapters.vector_base_url(), "http://localhost:6333");
    }
}

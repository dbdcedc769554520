use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("vector_dimension must be positive")]
    InvalidVectorDimension,

    #[error("classifier_confidence_threshold must be in [0.0, 1.0], got {0}")]
    InvalidClassifierConfidenceThreshold(f32),

    #[error("max_retries must be positive")]
    InvalidMaxRetries,

    #[error("retry_backoff_base_ms ({base}) must not exceed retry_backoff_cap_ms ({cap})")]
    BackoffBaseExceedsCap { base: u64, cap: u64 },

    #[error("job_deadline_seconds must be positive")]
    InvalidJobDeadline,

    #[error("visibility_timeout_seconds must be positive")]
    InvalidVisibilityTimeout,

    #[error("shutdown_grace_seconds must be positive")]
    InvalidShutdownGrace,

    #[error("Retention TTL must be positive: {field} = {value}")]
    InvalidRetentionTTL { field: String, value: u32 },

    #[error("Ledger max bytes must be positive")]
    InvalidLedgerMaxBytes,
}

/// Validate the entire configuration (§10.3): adapter dimension sanity,
/// positive retry/backoff numbers, positive retention TTLs — following the
/// teacher's `config/validation.rs` checked-at-startup convention.
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_adapters(config)?;
    validate_worker(config)?;
    validate_retention(config)?;
    Ok(())
}

fn validate_adapters(config: &Config) -> Result<(), ValidationError> {
    if config.adapters.vector_dimension == 0 {
        return Err(ValidationError::InvalidVectorDimension);
    }
    let threshold = config.adapters.classifier_confidence_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ValidationError::InvalidClassifierConfidenceThreshold(threshold));
    }
    Ok(())
}

fn validate_worker(config: &Config) -> Result<(), ValidationError> {
    let worker = &config.worker;
    if worker.max_retries == 0 {
        return Err(ValidationError::InvalidMaxRetries);
    }
    if worker.retry_backoff_base_ms > worker.retry_backoff_cap_ms {
        return Err(ValidationError::BackoffBaseExceedsCap {
            base: worker.retry_backoff_base_ms,
            cap: worker.retry_backoff_cap_ms,
        });
    }
    if worker.job_deadline_seconds == 0 {
        return Err(ValidationError::InvalidJobDeadline);
    }
    if worker.visibility_timeout_seconds == 0 {
        return Err(ValidationError::InvalidVisibilityTimeout);
    }
    if worker.shutdown_grace_seconds == 0 {
        return Err(ValidationError::InvalidShutdownGrace);
    }
    Ok(())
}

fn validate_retention(config: &Config) -> Result<(), ValidationError> {
    if config.retention.job_ttl_days == 0 {
        return Err(ValidationError::InvalidRetentionTTL {
            field: "job_ttl_days".to_string(),
            value: 0,
        });
    }
    if config.retention.logs_ttl_days == 0 {
        return Err(ValidationError::InvalidRetentionTTL {
            field: "logs_ttl_days".to_string(),
            value: 0,
        });
    }
    if config.retention.idempotency_ttl_days == 0 {
        return Err(ValidationError::InvalidRetentionTTL {
            field: "idempotency_ttl_days".to_string(),
            value: 0,
        });
    }
    if config.retention.ledger_max_bytes.as_u64() == 0 {
        return Err(ValidationError::InvalidLedgerMaxBytes);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::models::*;
    use super::*;

    fn test_config() -> Config {
        Config {
            server: ServerConfig::default(),
            adapters: AdaptersConfig::default(),
            worker: WorkerRuntimeConfig::default(),
            retention: RetentionConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&test_config()).is_ok());
    }

    #[test]
    fn test_zero_vector_dimension() {
        let mut config = test_config();
        config.adapters.vector_dimension = 0;
        assert!(matches!(validate(&config), Err(ValidationError::InvalidVectorDimension)));
    }

    #[test]
    fn test_zero_max_retries() {
        let mut config = test_config();
        config.worker.max_retries = 0;
        assert!(matches!(validate(&config), Err(ValidationError::InvalidMaxRetries)));
    }

    #[test]
    fn test_zero_visibility_timeout() {
        let mut config = test_config();
        config.worker.visibility_timeout_seconds = 0;
        assert!(matches!(validate(&config), Err(ValidationError::InvalidVisibilityTimeout)));
    }

    #[test]
    fn test_backoff_base_exceeds_cap() {
        let mut config = test_config();
        config.worker.retry_backoff_base_ms = 120_000;
        config.worker.retry_backoff_cap_ms = 60_000;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::BackoffBaseExceedsCap { .. })
        ));
    }

    #[test]
    fn test_out_of_range_classifier_confidence_threshold() {
        let mut config = test_config();
        config.adapters.classifier_confidence_threshold = 1.5;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidClassifierConfidenceThreshold(_))
        ));
    }

    #[test]
    fn test_zero_shutdown_grace() {
        let mut config = test_config();
        config.worker.shutdown_grace_seconds = 0;
        assert!(matches!(validate(&config), Err(ValidationError::InvalidShutdownGrace)));
    }

    #[test]
    fn test_zero_retention_ttl() {
        let mut config = test_config();
        config.retention.job_ttl_days = 0;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidRetentionTTL { .. })
        ));
    }
}

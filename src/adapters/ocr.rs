use super::{clamp_timeout, AdapterError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// OCR adapter contract (§4.1). Empty text is a valid, non-error result —
/// the orchestrator treats it as the "degraded success" short-circuit in
/// §4.5, not as a failure the adapter should raise.
#[async_trait]
pub trait OcrAdapter: Send + Sync {
    async fn extract(&self, file_path: &str) -> Result<(String, f32), AdapterError>;
}

pub struct HttpOcrAdapter {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct OcrResponse {
    text: String,
    #[serde(default)]
    confidence: f32,
}

impl HttpOcrAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout: clamp_timeout(timeout),
        }
    }
}

#[async_trait]
impl OcrAdapter for HttpOcrAdapter {
    async fn extract(&self, file_path: &str) -> Result<(String, f32), AdapterError> {
        let url = format!("{}/extract", self.base_url);
        let send = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "file_path": file_path }))
            .send();

        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| AdapterError::Timeout {
                backend: "ocr",
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| map_reqwest_err("ocr", e))?;

        if response.status() == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            return Err(AdapterError::Invalid {
                backend: "ocr",
                message: "unreadable or unsupported input file".to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(AdapterError::Request {
                backend: "ocr",
                message: format!("http {}", response.status()),
            });
        }

        let body: OcrResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Request { backend: "ocr", message: e.to_string() })?;

        Ok((body.text, body.confidence))
    }
}

fn map_reqwest_err(backend: &'static str, e: reqwest::Error) -> AdapterError {
    if e.is_timeout() {
        AdapterError::Timeout { backend, timeout_secs: 0 }
    } else {
        AdapterError::Request { backend, message: e.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_clamps_timeout_below_floor() {
        let adapter = HttpOcrAdapter::new(
            reqwest::Client::new(),
            "http://ocr.local",
            Duration::from_millis(100),
        );
        assert_eq!(adapter.timeout, super::super::TIMEOUT_FLOOR);
    }
}

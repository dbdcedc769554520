use super::{clamp_timeout, AdapterError};
use crate::domain::DocType;
use async_trait::async_trait;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Classifier adapter contract (§4.1). `doc_type` is always drawn from the
/// closed set. Whether a missing model surfaces as a demo-mode filename
/// guess or as `NotAvailable` is a startup-time choice, never a per-call one.
#[async_trait]
pub trait ClassifierAdapter: Send + Sync {
    async fn classify(&self, text: &str, file_name: &str) -> Result<(DocType, f32), AdapterError>;
}

/// HTTP-backed classifier. When no model has been loaded on the remote
/// service, operators run it in demo mode (filename-substring matching,
/// grounded in the original classifier's fallback) rather than failing
/// every job; `NotAvailable` is reserved for when demo mode itself is
/// disabled and the service is genuinely absent.
pub struct HttpClassifierAdapter {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    demo_mode: bool,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    doc_type: String,
    confidence: f32,
}

impl HttpClassifierAdapter {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        timeout: Duration,
        demo_mode: bool,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout: clamp_timeout(timeout),
            demo_mode,
        }
    }

    /// Filename-substring demo classification, grounded in the original
    /// classifier's `is_model_loaded == false` fallback path.
    fn classify_by_filename(file_name: &str) -> (DocType, f32) {
        let lower = file_name.to_lowercase();
        for doc_type in DocType::EXTRACTABLE {
            if lower.contains(doc_type.as_str()) {
                return (doc_type, 0.6);
            }
        }
        (DocType::Unknown, 0.1)
    }
}

#[async_trait]
impl ClassifierAdapter for HttpClassifierAdapter {
    async fn classify(&self, text: &str, file_name: &str) -> Result<(DocType, f32), AdapterError> {
        if self.demo_mode {
            return Ok(Self::classify_by_filename(file_name));
        }

        let url = format!("{}/classify", self.base_url);
        let send = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "text": text, "file_name": file_name }))
            .send();

        let response = tokio::time::timeout(self.timeout, send).await.map_err(|_| {
            AdapterError::Timeout { backend: "classifier", timeout_secs: self.timeout.as_secs() }
        })?;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_connect() => {
                return Err(AdapterError::NotAvailable {
                    backend: "classifier",
                    message: "classifier service unreachable".to_string(),
                })
            }
            Err(e) => {
                return Err(AdapterError::Request { backend: "classifier", message: e.to_string() })
            }
        };

        if response.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(AdapterError::NotAvailable {
                backend: "classifier",
                message: "no model loaded".to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(AdapterError::Request {
                backend: "classifier",
                message: format!("http {}", response.status()),
            });
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Request { backend: "classifier", message: e.to_string() })?;

        let doc_type = DocType::from_str(&body.doc_type).unwrap_or(DocType::Unknown);
        Ok((doc_type, body.confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_mode_matches_filename_substrings() {
        assert_eq!(
            HttpClassifierAdapter::classify_by_filename("invoice_001.pdf"),
            (DocType::Invoice, 0.6)
        );
        assert_eq!(
            HttpClassifierAdapter::classify_by_filename("random_scan.png"),
            (DocType::Unknown, 0.1)
        );
    }
}

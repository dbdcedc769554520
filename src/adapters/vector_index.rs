use super::{clamp_timeout, AdapterError};
use async_trait::async_trait;
use std::time::Duration;

/// Vector index adapter contract (§4.1, §6). Fixed-dimension cosine
/// collection; on a dimension mismatch at startup the collection is
/// dropped and recreated, not patched in place.
#[async_trait]
pub trait VectorIndexAdapter: Send + Sync {
    async fn ensure_collection(&self, dimension: usize) -> Result<(), AdapterError>;

    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        payload: serde_json::Value,
    ) -> Result<(), AdapterError>;
}

pub struct HttpVectorIndexAdapter {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    timeout: Duration,
}

impl HttpVectorIndexAdapter {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        collection: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self { client, base_url: base_url.into(), collection: collection.into(), timeout: clamp_timeout(timeout) }
    }
}

#[async_trait]
impl VectorIndexAdapter for HttpVectorIndexAdapter {
    async fn ensure_collection(&self, dimension: usize) -> Result<(), AdapterError> {
        let check_url = format!("{}/collections/{}", self.base_url, self.collection);
        let check = tokio::time::timeout(self.timeout, self.client.get(&check_url).send())
            .await
            .map_err(|_| AdapterError::Timeout { backend: "vector_index", timeout_secs: self.timeout.as_secs() })?
            .map_err(|e| map_err(e))?;

        let needs_recreate = match check.status() {
            reqwest::StatusCode::OK => {
                let info: serde_json::Value = check
                    .json()
                    .await
                    .map_err(|e| AdapterError::Request { backend: "vector_index", message: e.to_string() })?;
                info["config"]["params"]["vectors"]["size"].as_u64() != Some(dimension as u64)
            }
            reqwest::StatusCode::NOT_FOUND => true,
            status => {
                return Err(AdapterError::Request {
                    backend: "vector_index",
                    message: format!("http {}", status),
                })
            }
        };

        if needs_recreate {
            let put = self
                .client
                .put(&check_url)
                .json(&serde_json::json!({
                    "vectors": { "size": dimension, "distance": "Cosine" }
                }))
                .send();
            let response = tokio::time::timeout(self.timeout, put)
                .await
                .map_err(|_| AdapterError::Timeout { backend: "vector_index", timeout_secs: self.timeout.as_secs() })?
                .map_err(|e| map_err(e))?;
            if !response.status().is_success() {
                return Err(AdapterError::Request {
                    backend: "vector_index",
                    message: format!("http {}", response.status()),
                });
            }
        }

        Ok(())
    }

    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        payload: serde_json::Value,
    ) -> Result<(), AdapterError> {
        let url = format!("{}/collections/{}/points", self.base_url, self.collection);
        let send = self
            .client
            .put(&url)
            .json(&serde_json::json!({
                "points": [{ "id": id, "vector": vector, "payload": payload }]
            }))
            .send();

        let response = tokio::time::timeout(self.timeout, send).await.map_err(|_| {
            AdapterError::Timeout { backend: "vector_index", timeout_secs: self.timeout.as_secs() }
        })?;
        let response = response.map_err(|e| map_err(e))?;

        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Err(AdapterError::Invalid {
                backend: "vector_index",
                message: "vector dimension or payload rejected".to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(AdapterError::Request {
                backend: "vector_index",
                message: format!("http {}", response.status()),
            });
        }
        Ok(())
    }
}

fn map_err(e: reqwest::Error) -> AdapterError {
    if e.is_timeout() {
        AdapterError::Timeout { backend: "vector_index", timeout_secs: 0 }
    } else {
        AdapterError::Request { backend: "vector_index", message: e.to_string() }
    }
}

use super::{clamp_timeout, AdapterError};
use async_trait::async_trait;
use std::time::Duration;

/// Lexical (full-text) index adapter contract (§4.1, §6). Upserts MUST be
/// idempotent on `id`; ensure-index is a separate, startup-only call.
#[async_trait]
pub trait SearchIndexAdapter: Send + Sync {
    async fn ensure_index(&self) -> Result<(), AdapterError>;

    async fn upsert(&self, id: &str, payload: serde_json::Value) -> Result<(), AdapterError>;
}

pub struct HttpSearchIndexAdapter {
    client: reqwest::Client,
    base_url: String,
    index_name: String,
    admin_key: Option<String>,
    timeout: Duration,
}

impl HttpSearchIndexAdapter {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        index_name: impl Into<String>,
        admin_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            index_name: index_name.into(),
            admin_key,
            timeout: clamp_timeout(timeout),
        }
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.admin_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[async_trait]
impl SearchIndexAdapter for HttpSearchIndexAdapter {
    async fn ensure_index(&self) -> Result<(), AdapterError> {
        let url = format!("{}/indexes", self.base_url);
        let send = self
            .authed(self.client.post(&url))
            .json(&serde_json::json!({
                "uid": self.index_name,
                "filterableAttributes": ["doc_type", "created_at"],
                "sortableAttributes": ["created_at"],
            }))
            .send();

        let response = tokio::time::timeout(self.timeout, send).await.map_err(|_| {
            AdapterError::Timeout { backend: "search_index", timeout_secs: self.timeout.as_secs() }
        })?;
        response.map_err(|e| map_err(e))?;
        Ok(())
    }

    async fn upsert(&self, id: &str, mut payload: serde_json::Value) -> Result<(), AdapterError> {
        if let Some(obj) = payload.as_object_mut() {
            obj.entry("id").or_insert_with(|| serde_json::Value::String(id.to_string()));
        }

        let url = format!("{}/indexes/{}/documents", self.base_url, self.index_name);
        let send = self.authed(self.client.post(&url)).json(&[payload]).send();

        let response = tokio::time::timeout(self.timeout, send).await.map_err(|_| {
            AdapterError::Timeout { backend: "search_index", timeout_secs: self.timeout.as_secs() }
        })?;
        let response = response.map_err(|e| map_err(e))?;

        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Err(AdapterError::Invalid {
                backend: "search_index",
                message: "malformed document payload".to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(AdapterError::Request {
                backend: "search_index",
                message: format!("http {}", response.status()),
            });
        }
        Ok(())
    }
}

fn map_err(e: reqwest::Error) -> AdapterError {
    if e.is_timeout() {
        AdapterError::Timeout { backend: "search_index", timeout_secs: 0 }
    } else {
        AdapterError::Request { backend: "search_index", message: e.to_string() }
    }
}

use super::{clamp_timeout, AdapterError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub response_schema: Option<serde_json::Value>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self { max_tokens: 1024, temperature: 0.1, response_schema: None }
    }
}

/// LLM adapter contract (§4.1): an OpenAI-compatible chat/completions
/// endpoint for generation, plus an embeddings endpoint. Both calls are
/// single-attempt; the guarded decoder (C4) is what retries on bad JSON.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    async fn complete(&self, prompt: &str, opts: &CompletionOptions) -> Result<String, AdapterError>;

    async fn embed(&self, text: &str, model: &str) -> Result<Vec<f32>, AdapterError>;
}

pub struct HttpLlmAdapter {
    client: reqwest::Client,
    base_url: String,
    model: String,
    complete_timeout: Duration,
    embed_timeout: Duration,
    embed_max_chars: usize,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

impl HttpLlmAdapter {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        complete_timeout: Duration,
        embed_timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            complete_timeout: clamp_timeout(complete_timeout),
            embed_timeout: clamp_timeout(embed_timeout),
            embed_max_chars: 8000,
        }
    }
}

#[async_trait]
impl LlmAdapter for HttpLlmAdapter {
    async fn complete(&self, prompt: &str, opts: &CompletionOptions) -> Result<String, AdapterError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut payload = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": opts.temperature,
            "max_tokens": opts.max_tokens,
        });
        if let Some(schema) = &opts.response_schema {
            payload["response_format"] = serde_json::json!({ "type": "json_object", "schema": schema });
        }

        let send = self.client.post(&url).json(&payload).send();
        let response = tokio::time::timeout(self.complete_timeout, send).await.map_err(|_| {
            AdapterError::Timeout { backend: "llm", timeout_secs: self.complete_timeout.as_secs() }
        })?;
        let response = response.map_err(|e| map_err("llm", e))?;

        if !response.status().is_success() {
            return Err(AdapterError::Request {
                backend: "llm",
                message: format!("http {}", response.status()),
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Request { backend: "llm", message: e.to_string() })?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AdapterError::Request {
                backend: "llm",
                message: "empty choices in completion response".to_string(),
            })
    }

    async fn embed(&self, text: &str, model: &str) -> Result<Vec<f32>, AdapterError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let truncated: String = text.chars().take(self.embed_max_chars).collect();

        let url = format!("{}/embeddings", self.base_url);
        let send = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "model": model, "input": truncated }))
            .send();

        let response = tokio::time::timeout(self.embed_timeout, send).await.map_err(|_| {
            AdapterError::Timeout { backend: "embed", timeout_secs: self.embed_timeout.as_secs() }
        })?;
        let response = response.map_err(|e| map_err("embed", e))?;

        if !response.status().is_success() {
            return Err(AdapterError::Request {
                backend: "embed",
                message: format!("http {}", response.status()),
            });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Request { backend: "embed", message: e.to_string() })?;

        Ok(body.data.into_iter().next().map(|d| d.embedding).unwrap_or_default())
    }
}

fn map_err(backend: &'static str, e: reqwest::Error) -> AdapterError {
    if e.is_timeout() {
        AdapterError::Timeout { backend, timeout_secs: 0 }
    } else {
        AdapterError::Request { backend, message: e.to_string() }
    }
}

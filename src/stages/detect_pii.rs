use super::StageResult;
use crate::adapters::LlmAdapter;
use crate::domain::{JobContext, PiiHit, StageStatus};
use crate::guard::guarded_json;
use crate::registry::{GeneralTask, Registry};
use std::sync::LazyLock;

fn pii_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": { "pii_detected": { "type": "array" } }
    })
}

static EMAIL_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

static PHONE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});

/// Strict secondary regex pass (§4.2, §9): only fills gaps when the
/// LLM-based pass produced nothing, never widens it.
fn regex_fallback(text: &str) -> Vec<PiiHit> {
    let mut hits = Vec::new();
    for m in EMAIL_RE.find_iter(text) {
        hits.push(PiiHit { kind: "EMAIL".to_string(), text: m.as_str().to_string() });
    }
    for m in PHONE_RE.find_iter(text) {
        hits.push(PiiHit { kind: "PHONE".to_string(), text: m.as_str().to_string() });
    }
    hits
}

/// Reads `raw_text`, writes `pii`. On LLM failure, falls back to the regex
/// pass rather than returning nothing (§4.2).
pub async fn detect_pii(ctx: &mut JobContext, llm: &dyn LlmAdapter, registry: &Registry) -> StageResult {
    let template = registry.get_general(GeneralTask::DetectPii);
    let prompt = Registry::render(template, &ctx.raw_text);

    match guarded_json(llm, &prompt, &pii_schema()).await {
        Some(value) => {
            let hits: Vec<PiiHit> = value["pii_detected"]
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| serde_json::from_value::<PiiHit>(v.clone()).ok())
                        .collect()
                })
                .unwrap_or_default();
            ctx.pii = hits;
            Ok(StageStatus::Ok)
        }
        None => {
            ctx.pii = regex_fallback(&ctx.raw_text);
            Ok(StageStatus::Degraded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{AdapterError, CompletionOptions};
    use crate::domain::JobTicket;
    use async_trait::async_trait;

    struct StubLlm(&'static str);

    #[async_trait]
    impl LlmAdapter for StubLlm {
        async fn complete(&self, _prompt: &str, _opts: &CompletionOptions) -> Result<String, AdapterError> {
            Ok(self.0.to_string())
        }
        async fn embed(&self, _text: &str, _model: &str) -> Result<Vec<f32>, AdapterError> {
            Ok(vec![])
        }
    }

    #[test]
    fn regex_fallback_finds_email_and_phone() {
        let hits = regex_fallback("Contact me at jane@example.com or 415-555-1212.");
        assert!(hits.iter().any(|h| h.kind == "EMAIL" && h.text == "jane@example.com"));
        assert!(hits.iter().any(|h| h.kind == "PHONE"));
    }

    #[tokio::test]
    async fn falls_back_to_regex_when_llm_degrades() {
        let mut ctx = JobContext::new(JobTicket::new("j1", "/tmp/a", "a.pdf", "application/pdf"));
        ctx.raw_text = "email jane@example.com".to_string();
        let registry = Registry::load().unwrap();
        let status = detect_pii(&mut ctx, &StubLlm("garbage"), &registry).await.unwrap();
        assert_eq!(status, StageStatus::Degraded);
        assert_eq!(ctx.pii.len(), 1);
        assert_eq!(ctx.pii[0].kind, "EMAIL");
    }

    #[tokio::test]
    async fn uses_llm_result_when_valid() {
        let mut ctx = JobContext::new(JobTicket::new("j1", "/tmp/a", "a.pdf", "application/pdf"));
        let registry = Registry::load().unwrap();
        let llm = StubLlm(r#"{"pii_detected":[{"type":"EMAIL","text":"a@b.com"}]}"#);
        detect_pii(&mut ctx, &llm, &registry).await.unwrap();
        assert_eq!(ctx.pii.len(), 1);
        assert_eq!(ctx.pii[0].text, "a@b.com");
    }
}

//! Guarded JSON Decoder (C4). Wraps an LLM completion that must produce
//! JSON matching a schema, retrying with a repair prompt a bounded number
//! of times before giving up. Grounded directly in the original pipeline's
//! `guards.py::guarded_json`.

use crate::adapters::{AdapterError, CompletionOptions, LlmAdapter};

const REPAIR_RETRIES: u32 = 2;

/// Minimal structural validation: every required key from the schema must
/// be present and, where the schema names a JSON type, the value must
/// match it. This mirrors the handful of ad hoc checks the original
/// validator actually performs rather than pulling in a full JSON-Schema
/// engine for a handful of flat extraction schemas.
fn validate(value: &serde_json::Value, schema: &serde_json::Value) -> Result<(), String> {
    let Some(obj) = value.as_object() else {
        return Err("expected a JSON object".to_string());
    };

    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for key in required {
            let Some(key) = key.as_str() else { continue };
            if !obj.contains_key(key) {
                return Err(format!("missing required field '{key}'"));
            }
        }
    }

    for (key, value) in obj {
        let Some(expected_type) = properties.get(key).and_then(|p| p.get("type")).and_then(|t| t.as_str())
        else {
            continue;
        };
        if !matches_json_type(value, expected_type) {
            return Err(format!("field '{key}' does not match type '{expected_type}'"));
        }
    }

    Ok(())
}

fn matches_json_type(value: &serde_json::Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

fn repair_prompt(bad_output: &str, schema: &serde_json::Value, error: &str) -> String {
    format!(
        "You fix JSON. Return ONLY valid JSON matching this schema.\nSchema:\n{}\nBroken JSON:\n{}\nError:\n{}\n",
        schema, bad_output, error
    )
}

/// Calls the LLM with `base_prompt`, validates the result against `schema`,
/// and issues up to `REPAIR_RETRIES` repair prompts on failure. Returns
/// `None` if the output is still invalid after all retries — the caller
/// records `structured_data = {}` and marks the stage degraded, never
/// failed (§4.4).
pub async fn guarded_json(
    llm: &dyn LlmAdapter,
    base_prompt: &str,
    schema: &serde_json::Value,
) -> Option<serde_json::Value> {
    let opts = CompletionOptions {
        max_tokens: 800,
        temperature: 0.0,
        response_schema: Some(schema.clone()),
    };

    let mut raw = match llm.complete(base_prompt, &opts).await {
        Ok(text) => text,
        Err(_) => return None,
    };
    let mut outcome = parse_and_validate(&raw, schema);

    for _ in 0..REPAIR_RETRIES {
        if let Ok(value) = outcome {
            return Some(value);
        }
        let error = outcome.unwrap_err();
        let prompt = repair_prompt(&raw, schema, &error);
        raw = match llm.complete(&prompt, &opts).await {
            Ok(text) => text,
            Err(_) => return None,
        };
        outcome = parse_and_validate(&raw, schema);
    }

    outcome.ok()
}

fn parse_and_validate(raw: &str, schema: &serde_json::Value) -> Result<serde_json::Value, String> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    validate(&value, schema)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedLlm {
        responses: Vec<&'static str>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmAdapter for ScriptedLlm {
        async fn complete(&self, _prompt: &str, _opts: &CompletionOptions) -> Result<String, AdapterError> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            Ok(self.responses[idx.min(self.responses.len() - 1)].to_string())
        }

        async fn embed(&self, _text: &str, _model: &str) -> Result<Vec<f32>, AdapterError> {
            Ok(vec![])
        }
    }

    fn invoice_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": { "total": { "type": "string" } },
            "required": ["total"]
        })
    }

    #[tokio::test]
    async fn returns_value_on_first_valid_response() {
        let llm = ScriptedLlm { responses: vec![r#"{"total":"123.45"}"#], calls: AtomicU32::new(0) };
        let result = guarded_json(&llm, "extract", &invoice_schema()).await;
        assert_eq!(result.unwrap()["total"], "123.45");
    }

    #[tokio::test]
    async fn repairs_once_then_succeeds() {
        let llm = ScriptedLlm {
            responses: vec!["not json", r#"{"total":"9.99"}"#],
            calls: AtomicU32::new(0),
        };
        let result = guarded_json(&llm, "extract", &invoice_schema()).await;
        assert_eq!(result.unwrap()["total"], "9.99");
    }

    #[tokio::test]
    async fn gives_up_after_two_repairs() {
        let llm = ScriptedLlm {
            responses: vec!["bad", "still bad", "still bad again"],
            calls: AtomicU32::new(0),
        };
        let result = guarded_json(&llm, "extract", &invoice_schema()).await;
        assert!(result.is_none());
    }
}

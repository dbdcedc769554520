use super::StageResult;
use crate::adapters::LlmAdapter;
use crate::domain::{JobContext, StageStatus};
use crate::guard::guarded_json;
use crate::registry::{GeneralTask, Registry};

fn summary_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": { "summary": { "type": "string" } },
        "required": ["summary"]
    })
}

/// Reads `raw_text`, writes `summary`. Any LLM failure — transient or
/// persistently invalid JSON — degrades to an empty string (§4.2).
pub async fn summarize(ctx: &mut JobContext, llm: &dyn LlmAdapter, registry: &Registry) -> StageResult {
    let template = registry.get_general(GeneralTask::Summarize);
    let prompt = Registry::render(template, &ctx.raw_text);

    match guarded_json(llm, &prompt, &summary_schema()).await {
        Some(value) => {
            ctx.summary = value["summary"].as_str().unwrap_or_default().to_string();
            Ok(StageStatus::Ok)
        }
        None => {
            ctx.summary = String::new();
            Ok(StageStatus::Degraded)
        }
    }
}

use super::StageResult;
use crate::adapters::LlmAdapter;
use crate::domain::{JobContext, StageStatus};
use crate::guard::guarded_json;
use crate::registry::Registry;

/// Reads `raw_text`/`doc_type`, writes `structured_data`. No schema for the
/// classified doc_type (including `unknown`) is a no-op yielding `{}`, not
/// an error; a guarded-JSON failure after retries also degrades to `{}`
/// rather than failing the job (§4.2, §4.4).
pub async fn extract(ctx: &mut JobContext, llm: &dyn LlmAdapter, registry: &Registry) -> StageResult {
    let Some((template, schema)) = registry.get_extraction(ctx.classification.doc_type) else {
        ctx.structured_data = serde_json::Value::Object(Default::default());
        return Ok(StageStatus::Skipped);
    };

    let prompt = Registry::render(template, &ctx.raw_text);
    match guarded_json(llm, &prompt, schema).await {
        Some(value) => {
            ctx.structured_data = value;
            Ok(StageStatus::Ok)
        }
        None => {
            ctx.structured_data = serde_json::Value::Object(Default::default());
            Ok(StageStatus::Degraded)
        }
    }
}

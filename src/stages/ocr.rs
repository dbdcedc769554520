use super::StageResult;
use crate::adapters::OcrAdapter;
use crate::domain::{JobContext, StageStatus};

/// Reads `file_path`, writes `raw_text`. Empty text is not an error here —
/// the orchestrator decides what to do with it (§4.5 short-circuit).
pub async fn ocr(ctx: &mut JobContext, adapter: &dyn OcrAdapter) -> StageResult {
    let (text, _confidence) = adapter.extract(&ctx.ticket.file_path).await?;
    ctx.raw_text = text;
    Ok(StageStatus::Ok)
}

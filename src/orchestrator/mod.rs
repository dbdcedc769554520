//! Job Orchestrator (C5): drives one `JobContext` through the stage DAG —
//! OCR, then Classify, then a fan-out of {Extract, Summarize, DetectPII,
//! Embed}, then a fan-in of {IndexLexical, IndexVector} — and resolves it
//! to either a `DocumentRecord` or a `JobError` the work queue runtime uses
//! to decide whether to retry (§4.5, §4.6).
//!
//! Grounded in the teacher's `worker/runner.rs` `process_task` shape,
//! generalized from a single-resource fetch to the seven-stage document
//! pipeline. {Extract, Summarize, DetectPII, Embed} only read the immutable
//! `raw_text`/`doc_type` and each write a disjoint `JobContext` field, so
//! they run concurrently against independent clones of the context and are
//! merged back afterward rather than racing on one `&mut JobContext`.

use crate::adapters::{ClassifierAdapter, LlmAdapter, OcrAdapter, SearchIndexAdapter, VectorIndexAdapter};
use crate::domain::{DocumentRecord, ErrorKind, JobContext, JobError, JobTicket, StageStatus};
use crate::registry::Registry;
use crate::stages::{classify, detect_pii, embed, extract, index_lexical, index_vector, ocr, summarize, StageError};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The five backend collaborators a job attempt needs, constructed once at
/// startup and shared across every worker (§9 "explicit dependencies").
pub struct Adapters {
    pub ocr: Arc<dyn OcrAdapter>,
    pub classifier: Arc<dyn ClassifierAdapter>,
    pub llm: Arc<dyn LlmAdapter>,
    pub search_index: Arc<dyn SearchIndexAdapter>,
    pub vector_index: Arc<dyn VectorIndexAdapter>,
}

impl Adapters {
    /// Builds the five HTTP-backed adapters from `AdaptersConfig`, sharing
    /// one pooled `reqwest::Client` across all of them (§9).
    pub fn from_config(config: &crate::config::AdaptersConfig) -> Self {
        use crate::adapters::{HttpClassifierAdapter, HttpLlmAdapter, HttpOcrAdapter, HttpSearchIndexAdapter, HttpVectorIndexAdapter};

        let client = reqwest::Client::new();
        let llm_client = llm_client(config.llm_api_key.as_deref()).unwrap_or_else(|_| client.clone());

        Self {
            ocr: Arc::new(HttpOcrAdapter::new(
                client.clone(),
                config.ocr_base_url.clone(),
                Duration::from_secs(config.ocr_timeout_seconds),
            )),
            classifier: Arc::new(HttpClassifierAdapter::new(
                client.clone(),
                config.classifier_base_url.clone(),
                Duration::from_secs(config.classifier_timeout_seconds),
                config.classifier_demo_mode,
            )),
            llm: Arc::new(HttpLlmAdapter::new(
                llm_client,
                config.llm_base_url.clone(),
                config.llm_model.clone(),
                Duration::from_secs(config.llm_timeout_seconds),
                Duration::from_secs(config.embed_timeout_seconds),
            )),
            search_index: Arc::new(HttpSearchIndexAdapter::new(
                client.clone(),
                config.lexical_url.clone(),
                config.lexical_index_name.clone(),
                config.lexical_admin_key.clone(),
                Duration::from_secs(config.lexical_timeout_seconds),
            )),
            vector_index: Arc::new(HttpVectorIndexAdapter::new(
                client,
                config.vector_base_url(),
                config.vector_collection.clone(),
                Duration::from_secs(config.vector_timeout_seconds),
            )),
        }
    }
}

/// Builds a client carrying `Authorization: Bearer <key>` on every request,
/// so the shared base client used by the other adapters never sees the LLM
/// credential.
fn llm_client(api_key: Option<&str>) -> Result<reqwest::Client, reqwest::Error> {
    let Some(api_key) = api_key else {
        return reqwest::Client::builder().build();
    };
    let mut headers = reqwest::header::HeaderMap::new();
    let mut auth = reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}"))
        .expect("API key must be a valid header value");
    auth.set_sensitive(true);
    headers.insert(reqwest::header::AUTHORIZATION, auth);
    reqwest::Client::builder().default_headers(headers).build()
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub embedding_model: String,
    pub job_deadline: Duration,
    pub classifier_confidence_threshold: f32,
}

/// Runs a single attempt of the full pipeline for `ticket` and resolves it
/// to a terminal outcome for *this attempt*. `Ok` carries the (possibly
/// degraded) final record alongside the `JobContext` the work queue runtime
/// persists per-stage timing/status from (§4.6's logs partition); `Err`
/// carries the `ErrorKind` the runtime dispatches on to decide whether to
/// requeue the ticket or publish `FAILED`. Deadline overrun is reported as
/// `Cancelled` so the runtime treats it the same way as a cooperative
/// cancellation.
pub async fn run_job(
    ticket: JobTicket,
    adapters: &Adapters,
    registry: &Registry,
    config: &OrchestratorConfig,
) -> Result<(DocumentRecord, JobContext), JobError> {
    match tokio::time::timeout(config.job_deadline, run_pipeline(ticket, adapters, registry, config)).await {
        Ok(result) => result,
        Err(_) => Err(JobError {
            stage: "deadline".to_string(),
            error_kind: ErrorKind::Cancelled,
            message: format!("job exceeded its deadline of {:?}", config.job_deadline),
        }),
    }
}

async fn run_pipeline(
    ticket: JobTicket,
    adapters: &Adapters,
    registry: &Registry,
    config: &OrchestratorConfig,
) -> Result<(DocumentRecord, JobContext), JobError> {
    let mut ctx = JobContext::new(ticket);

    run_stage(&mut ctx, "ocr", |c| ocr(c, adapters.ocr.as_ref())).await?;

    if ctx.raw_text.trim().is_empty() {
        // §4.5: empty OCR output short-circuits straight to a degraded
        // terminal success. Classify/Extract/Summarize/DetectPII/Embed are
        // all skipped; the lexical write still happens so ingress sees the
        // job completed rather than stuck.
        let record = finalize(&mut ctx, adapters).await?;
        return Ok((record, ctx));
    }

    run_stage(&mut ctx, "classify", |c| {
        classify(c, adapters.classifier.as_ref(), config.classifier_confidence_threshold)
    })
    .await?;

    let base = ctx.clone();
    let mut extract_ctx = base.clone();
    let mut summarize_ctx = base.clone();
    let mut pii_ctx = base.clone();
    let mut embed_ctx = base;

    let (extract_result, summarize_result, pii_result, embed_result) = tokio::join!(
        run_stage(&mut extract_ctx, "extract", |c| extract(c, adapters.llm.as_ref(), registry)),
        run_stage(&mut summarize_ctx, "summarize", |c| summarize(c, adapters.llm.as_ref(), registry)),
        run_stage(&mut pii_ctx, "detect_pii", |c| detect_pii(c, adapters.llm.as_ref(), registry)),
        run_stage(&mut embed_ctx, "embed", |c| embed(c, adapters.llm.as_ref(), &config.embedding_model)),
    );

    // Extract/Summarize/DetectPII never return Err — they absorb every LLM
    // failure into a degraded result (§4.2). Only Embed's Transient case
    // propagates. `?` still drains the others correctly if that changes.
    extract_result?;
    summarize_result?;
    pii_result?;
    embed_result?;

    ctx.structured_data = extract_ctx.structured_data;
    ctx.summary = summarize_ctx.summary;
    ctx.pii = pii_ctx.pii;
    ctx.embedding = embed_ctx.embedding;
    ctx.stage_elapsed.extend(extract_ctx.stage_elapsed);
    ctx.stage_elapsed.extend(summarize_ctx.stage_elapsed);
    ctx.stage_elapsed.extend(pii_ctx.stage_elapsed);
    ctx.stage_elapsed.extend(embed_ctx.stage_elapsed);
    ctx.stage_status.extend(extract_ctx.stage_status);
    ctx.stage_status.extend(summarize_ctx.stage_status);
    ctx.stage_status.extend(pii_ctx.stage_status);
    ctx.stage_status.extend(embed_ctx.stage_status);

    let record = finalize(&mut ctx, adapters).await?;
    Ok((record, ctx))
}

/// Writes the lexical record (propagating any failure — lexical is the
/// source of truth, §4.5) then the vector record (never propagating: a
/// vector failure after a successful lexical write is a degraded success).
async fn finalize(ctx: &mut JobContext, adapters: &Adapters) -> Result<DocumentRecord, JobError> {
    let mut record = DocumentRecord::from_context(ctx, false, Utc::now());

    run_stage(ctx, "index_lexical", |_| index_lexical(&record, adapters.search_index.as_ref())).await?;

    let embedding = ctx.embedding.clone();
    let vector_status =
        run_stage(ctx, "index_vector", |_| index_vector(&record, &embedding, adapters.vector_index.as_ref())).await?;
    record.vector_indexed = vector_status == StageStatus::Ok;

    Ok(record)
}

/// Times one stage invocation and converts its error, if any, into a
/// `JobError` tagged with the stage name and the error's kind. `f` takes a
/// reborrow of `ctx` so the original reference is still usable afterward to
/// record the outcome.
async fn run_stage<F, Fut>(ctx: &mut JobContext, name: &str, f: F) -> Result<StageStatus, JobError>
where
    F: FnOnce(&mut JobContext) -> Fut,
    Fut: std::future::Future<Output = Result<StageStatus, StageError>>,
{
    let start = Instant::now();
    let result = f(ctx).await;
    match result {
        Ok(status) => {
            ctx.record_stage(name, start.elapsed(), status);
            Ok(status)
        }
        Err(e) => Err(JobError { stage: name.to_string(), error_kind: e.kind(), message: e.to_string() }),
    }
}

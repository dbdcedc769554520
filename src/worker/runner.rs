//! Per-task execution (C6 part 2): runs one leased envelope through the
//! orchestrator and resolves the queue/ledger side effects for its outcome.
//! Grounded in the teacher's `worker/runner.rs` `process_task` shape — the
//! commented-out original intent was download, upload, emit a log — now
//! generalized to run-pipeline, persist state, requeue-or-DLQ.

use crate::domain::{ErrorKind, JobError, JobState, JobTicket, StageStatus};
use crate::ledger::FjallStore;
use crate::observability::Metrics;
use crate::orchestrator::{self, Adapters, OrchestratorConfig};
use crate::proto::TaskEnvelope;
use crate::queue::FjallQueue;
use crate::registry::Registry;
use crate::storage::StorageClient;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Everything one task execution needs, shared read-only across the pool.
pub struct WorkerContext {
    pub ledger: Arc<FjallStore>,
    pub queue: Arc<FjallQueue>,
    pub storage: Arc<StorageClient>,
    pub adapters: Arc<Adapters>,
    pub registry: Arc<Registry>,
    pub orchestrator_config: OrchestratorConfig,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub retry_backoff_cap_ms: u64,
    pub metrics: Arc<Metrics>,
}

/// Exponential backoff before a retried task becomes visible again:
/// `base * 2^attempt`, capped at `cap` (§4.6).
fn backoff_delay(attempt: u32, base_ms: u64, cap_ms: u64) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor).min(cap_ms))
}

/// Runs one leased task end-to-end and applies the retry/DLQ/finalize
/// decision (§4.6): ack + persist success on a good run, requeue under
/// budget for `Transient`/`Cancelled`, or move to the DLQ and publish
/// `FAILED` once the retry budget is exhausted or the failure is
/// `Permanent`/`NotAvailable`.
pub async fn process_task(seq: u64, envelope: TaskEnvelope, ctx: &WorkerContext) {
    let job_id = envelope.job_id.clone();
    let ticket =
        JobTicket::new(job_id.clone(), envelope.file_path.clone(), envelope.file_name.clone(), envelope.mime_type.clone());

    if let Err(e) = ctx.ledger.upsert_state(&job_id, &JobState::Running) {
        error!(job_id, error = %e, "failed to record running state");
    }

    match orchestrator::run_job(ticket, &ctx.adapters, &ctx.registry, &ctx.orchestrator_config).await {
        Ok((record, job_ctx)) => {
            for (stage, status) in &job_ctx.stage_status {
                let elapsed = job_ctx.stage_elapsed.get(stage).copied().unwrap_or_default();
                let status_label = match status {
                    StageStatus::Ok => "ok",
                    StageStatus::Degraded => "degraded",
                    StageStatus::Skipped => "skipped",
                };
                if let Err(e) = ctx.ledger.append_log(&job_id, stage, status_label, "", elapsed.as_millis() as u64) {
                    warn!(job_id, stage, error = %e, "failed to append stage log");
                }
            }

            let degraded = job_ctx.stage_status.values().any(|s| *s != StageStatus::Ok);
            ctx.metrics.job_succeeded();
            if degraded {
                ctx.metrics.job_degraded();
            }

            if let Err(e) = ctx.ledger.upsert_state(&job_id, &JobState::Succeeded { result: record }) {
                error!(job_id, error = %e, "failed to persist succeeded state");
            }
            if let Err(e) = ctx.queue.ack(seq) {
                error!(job_id, seq, error = %e, "failed to ack completed task");
            }
            cleanup_blob(ctx, &envelope.file_path).await;
            info!(job_id, seq, degraded, "job succeeded");
        }
        Err(err) => handle_failure(seq, &envelope, err, ctx).await,
    }
}

async fn handle_failure(seq: u64, envelope: &TaskEnvelope, err: JobError, ctx: &WorkerContext) {
    let job_id = &envelope.job_id;
    if let Err(e) = ctx.ledger.append_log(job_id, &err.stage, "failed", &err.message, 0) {
        warn!(job_id, stage = %err.stage, error = %e, "failed to append failure log");
    }

    let retryable = matches!(err.error_kind, ErrorKind::Transient | ErrorKind::Cancelled);

    if retryable && envelope.attempt < ctx.max_retries {
        ctx.metrics.stage_retried();
        let delay = backoff_delay(envelope.attempt, ctx.retry_backoff_base_ms, ctx.retry_backoff_cap_ms);
        tokio::time::sleep(delay).await;
        if let Err(e) = ctx.queue.requeue(seq) {
            error!(job_id, seq, error = %e, "failed to requeue task");
        }
        warn!(job_id, seq, stage = %err.stage, attempt = envelope.attempt, delay_ms = delay.as_millis() as u64, "job attempt failed, requeued");
        return;
    }

    ctx.metrics.job_failed();
    if let Err(e) = ctx.queue.move_to_dlq(seq, &err.stage, error_kind_label(err.error_kind), &err.message) {
        error!(job_id, seq, error = %e, "failed to move task to dead-letter queue");
    }
    if let Err(e) = ctx.ledger.upsert_state(job_id, &JobState::Failed { error: err.clone() }) {
        error!(job_id, error = %e, "failed to persist failed state");
    }
    cleanup_blob(ctx, &envelope.file_path).await;
    error!(job_id, seq, stage = %err.stage, error_kind = ?err.error_kind, "job permanently failed");
}

fn error_kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Transient => "transient",
        ErrorKind::Permanent => "permanent",
        ErrorKind::NotAvailable => "not_available",
        ErrorKind::Cancelled => "cancelled",
    }
}

/// Removes the source blob once a job reaches a terminal state. Missing
/// files are logged, not treated as a task failure — cleanup racing a prior
/// attempt's delete is expected under at-least-once redelivery.
async fn cleanup_blob(ctx: &WorkerContext, file_path: &str) {
    if let Err(e) = ctx.storage.delete_path(Path::new(file_path)).await {
        warn!(file_path, error = %e, "failed to delete blob after terminal outcome");
    }
}

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::{
    error::ApiError,
    models::{HealthResponse, JobAcceptedResponse},
    state::AppState,
    utils::validate_body_size,
    validation::validate_file_name,
};
use crate::domain::{JobState, JobTicket};

const IDEMPOTENCY_HEADER: &str = "X-Docflow-Idempotency-Key";

/// Primary job ingestion endpoint (`POST /jobs`, §1).
///
/// Accepts a `multipart/form-data` body with a single `file` field, writes
/// the blob to local storage, creates a `JobTicket`, and durably enqueues
/// it. Honors `X-Docflow-Idempotency-Key`: a replayed key returns the
/// original `job_id` instead of creating a second ticket (§11).
pub async fn ingest_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let idempotency_key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .filter(|value| !value.is_empty());

    if let Some(ref key) = idempotency_key
        && let Ok(Some(existing_job_id)) = state.ledger.get_idempotent(key)
        && state.ledger.get_state(&existing_job_id).ok().flatten().is_some()
    {
        return Ok((
            StatusCode::ACCEPTED,
            Json(JobAcceptedResponse { job_id: existing_job_id, file_name: String::new() }),
        ));
    }

    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidPayload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        file_name = field.file_name().map(str::to_owned);
        mime_type = field.content_type().map(str::to_owned);
        data = Some(
            field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidPayload(e.to_string()))?
                .to_vec(),
        );
    }

    let data = data.ok_or_else(|| {
        ApiError::InvalidPayload("multipart body must include a 'file' field".to_string())
    })?;
    let file_name = file_name.unwrap_or_else(|| "upload.bin".to_string());
    let mime_type = mime_type.unwrap_or_else(|| "application/octet-stream".to_string());

    validate_file_name(&file_name)?;
    validate_body_size(data.len() as u64, state.config.server.max_upload_bytes.as_u64())?;

    let job_id = Uuid::now_v7().to_string();
    let storage_key = format!("{job_id}/{file_name}");
    let uploaded = state
        .storage
        .upload(&storage_key, data)
        .await
        .map_err(|e| ApiError::Internal(format!("blob upload failed: {e}")))?;
    let file_path = uploaded.path.to_string_lossy().to_string();

    let ticket = JobTicket::new(job_id.clone(), file_path, file_name.clone(), mime_type);

    state
        .ledger
        .upsert_state(&job_id, &JobState::Queued)
        .map_err(|e| ApiError::Internal(format!("failed to persist job state: {e}")))?;

    if let Some(ref key) = idempotency_key {
        state
            .ledger
            .remember_idempotency(key, &job_id)
            .map_err(|e| ApiError::Internal(format!("failed to store idempotency key: {e}")))?;
    }

    state
        .queue
        .enqueue(&ticket)
        .map_err(|e| ApiError::Internal(format!("failed to enqueue job: {e}")))?;

    state.metrics.job_accepted();

    Ok((StatusCode::ACCEPTED, Json(JobAcceptedResponse { job_id, file_name })))
}

/// Job status endpoint (`GET /jobs/{job_id}`, §7): a read-only projection
/// over the result store returning `{state, result?, error?}`.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let job_state = state
        .ledger
        .get_state(&job_id)
        .map_err(|e| ApiError::Internal(format!("failed to read job state: {e}")))?
        .ok_or_else(|| ApiError::NotFound(job_id))?;

    Ok((StatusCode::OK, Json(job_state)))
}

/// Health check endpoint (`GET /health`).
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());
    components.insert(
        "ledger".to_string(),
        health_label(state.ledger.stats().is_ok()),
    );
    components.insert(
        "queue".to_string(),
        health_label(state.queue.health_check().is_ok()),
    );
    components.insert("storage".to_string(), "healthy".to_string());

    let all_healthy = components.values().all(|status| status == "healthy");
    let status_code = if all_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "unhealthy" }.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response))
}

fn health_label(is_healthy: bool) -> String {
    if is_healthy { "healthy".to_string() } else { "unhealthy".to_string() }
}

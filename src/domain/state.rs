use super::DocumentRecord;
use serde::{Deserialize, Serialize};

/// The three error kinds that matter to the orchestrator and the queue
/// runtime. `Cancelled` is added alongside the three data-carrying kinds
/// below because shutdown/deadline handling needs to distinguish "this
/// attempt was aborted, redeliver it" from "this attempt failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transient,
    Permanent,
    NotAvailable,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobError {
    pub stage: String,
    pub error_kind: ErrorKind,
    pub message: String,
}

/// Authoritative job state as kept in the result store. `SUCCEEDED` carries
/// the final `DocumentRecord`; `FAILED` carries `{stage, error_kind,
/// message}`. Terminal variants are immutable once published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Succeeded { result: DocumentRecord },
    Failed { error: JobError },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded { .. } | JobState::Failed { .. })
    }
}

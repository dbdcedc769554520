//! Generated protobuf types for the work queue's wire format (§4.6, §11).
//!
//! - `TaskEnvelope` — per-attempt job task as it crosses the broker boundary
//! - `JobStatusUpdate` — coarse job-level status broadcast
//! - `JobLogEntry` — structured per-stage log entries
//! - `DeadLetterTask` — permanently failed tasks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docflow::proto::TaskEnvelope;
//!
//! let task = TaskEnvelope {
//!     job_id: "job-123".to_string(),
//!     file_path: "/data/incoming/job-123/invoice.pdf".to_string(),
//!     file_name: "invoice.pdf".to_string(),
//!     mime_type: "application/pdf".to_string(),
//!     ..Default::default()
//! };
//!
//! let bytes = prost::Message::encode_to_vec(&task);
//! let decoded = TaskEnvelope::decode(&bytes[..])?;
//! ```

// Include generated protobuf code
#[allow(clippy::all)]
#[allow(warnings)]
mod docflow_jobs {
    include!("docflow.jobs.rs");
}

// Re-export all types for convenience
pub use docflow_jobs::*;

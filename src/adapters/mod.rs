//! Backend Adapters (C1): uniform client facades over the five external
//! collaborators the pipeline depends on. Each adapter is constructed once
//! at startup (§9 "explicit dependencies") and shares a pooled `reqwest`
//! client across workers. Adapters make exactly one attempt per call and
//! map failures onto `{Transient, Permanent, NotAvailable}`; retrying is
//! the work queue runtime's job (§4.6), not theirs.

mod classifier;
mod error;
mod llm;
mod ocr;
mod search_index;
mod vector_index;

pub use classifier::{ClassifierAdapter, HttpClassifierAdapter};
pub use error::AdapterError;
pub use llm::{HttpLlmAdapter, LlmAdapter};
pub use ocr::{HttpOcrAdapter, OcrAdapter};
pub use search_index::{HttpSearchIndexAdapter, SearchIndexAdapter};
pub use vector_index::{HttpVectorIndexAdapter, VectorIndexAdapter};

use std::time::Duration;

/// Per-call timeout floor enforced regardless of configuration (§4.1).
pub const TIMEOUT_FLOOR: Duration = Duration::from_secs(5);

pub fn clamp_timeout(configured: Duration) -> Duration {
    configured.max(TIMEOUT_FLOOR)
}

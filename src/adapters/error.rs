use crate::domain::ErrorKind;
use thiserror::Error;

/// Error raised by a backend adapter (§4.1). Every variant maps to exactly
/// one of the three kinds stages and the runtime dispatch on; adapters
/// never retry internally, they make one attempt and report what happened.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("request to {backend} timed out after {timeout_secs}s")]
    Timeout { backend: &'static str, timeout_secs: u64 },

    #[error("{backend} returned an error: {message}")]
    Request { backend: &'static str, message: String },

    #[error("{backend} is not available: {message}")]
    NotAvailable { backend: &'static str, message: String },

    #[error("{backend} rejected the input: {message}")]
    Invalid { backend: &'static str, message: String },
}

impl AdapterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::Timeout { .. } | AdapterError::Request { .. } => ErrorKind::Transient,
            AdapterError::NotAvailable { .. } => ErrorKind::NotAvailable,
            AdapterError::Invalid { .. } => ErrorKind::Permanent,
        }
    }
}

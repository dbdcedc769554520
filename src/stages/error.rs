use crate::adapters::AdapterError;
use crate::domain::ErrorKind;
use thiserror::Error;

/// Error raised by a stage function (§4.2). Stages never retry internally;
/// they report the smallest kind they can justify and let the orchestrator
/// (§4.5) and the runtime (§4.6) decide what happens next.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("{0}")]
    Other(String),
}

impl StageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StageError::Adapter(e) => e.kind(),
            StageError::Other(_) => ErrorKind::Permanent,
        }
    }
}

//! Core data model shared by every component: the job ticket ingress hands
//! off, the mutable context a worker carries through the stage DAG, the
//! final record written to the external stores, and the terminal state
//! published to the result store.

mod context;
mod record;
mod state;
mod ticket;

pub use context::{Classification, JobContext, PiiHit, StageStatus};
pub use record::DocumentRecord;
pub use state::{ErrorKind, JobError, JobState};
pub use ticket::JobTicket;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of document types the classifier and extraction stage
/// recognize. `Unknown` is the explicit degradation target, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Invoice,
    Receipt,
    Contract,
    Report,
    Resume,
    Unknown,
}

impl DocType {
    pub const EXTRACTABLE: [DocType; 5] = [
        DocType::Invoice,
        DocType::Receipt,
        DocType::Contract,
        DocType::Report,
        DocType::Resume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Invoice => "invoice",
            DocType::Receipt => "receipt",
            DocType::Contract => "contract",
            DocType::Report => "report",
            DocType::Resume => "resume",
            DocType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(DocType::Invoice),
            "receipt" => Ok(DocType::Receipt),
            "contract" => Ok(DocType::Contract),
            "report" => Ok(DocType::Report),
            "resume" => Ok(DocType::Resume),
            "unknown" => Ok(DocType::Unknown),
            _ => Err(()),
        }
    }
}

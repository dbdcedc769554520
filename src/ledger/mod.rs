//! Job Registry / Status API backing store (C7): durable storage for
//! `JobState`, per-stage logs, and idempotency-key deduplication, backed by
//! an embedded `fjall` keyspace. Grounded in the teacher's `ledger/` module,
//! generalized from `JobSnapshot` to this domain's `JobState`.

pub mod error;
pub mod partitions;
pub mod pruning;
pub mod store;

pub use error::{LedgerError, Result};
pub use pruning::{PruneStats, RETENTION_IDEMPOTENCY_DAYS, RETENTION_JOBS_DAYS, RETENTION_LOGS_DAYS};
pub use store::{FjallStore, LogEntry, StoreStats};

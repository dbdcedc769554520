use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::JobState;

use super::error::Result;
use super::partitions::{encode_idem_key, encode_job_key, encode_log_key, encode_log_prefix, encode_meta_key};
use super::pruning::{prune_expired, PruneStats};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredJob {
    state: JobState,
    stored_at: i64,
}

/// One persisted stage-attempt log line, as surfaced by the status API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub job_id: String,
    pub stage: String,
    pub status: String,
    pub message: String,
    pub elapsed_ms: u64,
    pub recorded_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLogEntry {
    entry: LogEntry,
    stored_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredIdempotency {
    job_id: String,
    stored_at: i64,
}

/// Fjall-backed persistence for job state, per-stage logs, and idempotency
/// keys (C7). Grounded in the teacher's `ledger/store.rs` partition layout;
/// generalized from `JobSnapshot` to this domain's `JobState`, and every
/// stored value now carries its own `stored_at` so pruning (§11) can act
/// per-key instead of the teacher's partition-wide heuristic.
#[derive(Clone)]
pub struct FjallStore {
    keyspace: Keyspace,
    jobs: PartitionHandle,
    logs: PartitionHandle,
    idempotency: PartitionHandle,
    metadata: PartitionHandle,
}

impl FjallStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("opening ledger at {}", path.display());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;
        let jobs = keyspace.open_partition("jobs", PartitionCreateOptions::default())?;
        let logs = keyspace.open_partition("logs", PartitionCreateOptions::default())?;
        let idempotency = keyspace.open_partition("idempotency", PartitionCreateOptions::default())?;
        let metadata = keyspace.open_partition("metadata", PartitionCreateOptions::default())?;

        Ok(Self { keyspace, jobs, logs, idempotency, metadata })
    }

    pub fn upsert_state(&self, job_id: &str, state: &JobState) -> Result<()> {
        let key = encode_job_key(job_id);
        let value = serde_json::to_vec(&StoredJob { state: state.clone(), stored_at: now_secs() })?;
        self.jobs.insert(key, value)?;
        debug!(job_id, "upserted job state");
        Ok(())
    }

    pub fn get_state(&self, job_id: &str) -> Result<Option<JobState>> {
        let key = encode_job_key(job_id);
        match self.jobs.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice::<StoredJob>(&bytes)?.state)),
            None => Ok(None),
        }
    }

    /// Appends one stage-attempt log line for `job_id`, allocating the next
    /// offset from a per-job counter kept in `metadata`.
    pub fn append_log(&self, job_id: &str, stage: &str, status: &str, message: &str, elapsed_ms: u64) -> Result<()> {
        let offset_key = encode_meta_key(&format!("log_offset:{job_id}"));
        let offset = self
            .metadata
            .get(&offset_key)?
            .map(|bytes| u64::from_be_bytes(bytes.as_ref().try_into().unwrap_or([0u8; 8])))
            .unwrap_or(0);

        let entry = LogEntry {
            job_id: job_id.to_string(),
            stage: stage.to_string(),
            status: status.to_string(),
            message: message.to_string(),
            elapsed_ms,
            recorded_at: now_secs(),
        };
        let stored = StoredLogEntry { entry, stored_at: now_secs() };

        self.logs.insert(encode_log_key(job_id, offset), serde_json::to_vec(&stored)?)?;
        self.metadata.insert(offset_key, (offset + 1).to_be_bytes())?;
        Ok(())
    }

    pub fn get_logs(&self, job_id: &str) -> Result<Vec<LogEntry>> {
        let prefix = encode_log_prefix(job_id);
        let mut entries = Vec::new();
        for item in self.logs.prefix(&prefix) {
            let (_, value) = item?;
            entries.push(serde_json::from_slice::<StoredLogEntry>(&value)?.entry);
        }
        Ok(entries)
    }

    /// Records `key -> job_id` for request deduplication
    /// (`X-Docflow-Idempotency-Key`, §11).
    pub fn remember_idempotency(&self, key: &str, job_id: &str) -> Result<()> {
        let value = serde_json::to_vec(&StoredIdempotency { job_id: job_id.to_string(), stored_at: now_secs() })?;
        self.idempotency.insert(encode_idem_key(key), value)?;
        Ok(())
    }

    pub fn get_idempotent(&self, key: &str) -> Result<Option<String>> {
        match self.idempotency.get(encode_idem_key(key))? {
            Some(bytes) => Ok(Some(serde_json::from_slice::<StoredIdempotency>(&bytes)?.job_id)),
            None => Ok(None),
        }
    }

    pub fn prune_expired(&self, job_ttl_days: u32, logs_ttl_days: u32, idempotency_ttl_days: u32) -> Result<PruneStats> {
        prune_expired(
            &self.keyspace,
            &self.jobs,
            &self.logs,
            &self.idempotency,
            &self.metadata,
            job_ttl_days,
            logs_ttl_days,
            idempotency_ttl_days,
        )
    }

    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            job_count: self.jobs.iter().count(),
            log_count: self.logs.iter().count(),
            idem_count: self.idempotency.iter().count(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StoreStats {
    pub job_count: usize,
    pub log_count: usize,
    pub idem_count: usize,
}

fn now_secs() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
}

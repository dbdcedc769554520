use crate::domain::JobTicket;
use crate::proto::{DeadLetterTask, TaskEnvelope};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use prost::Message;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Protobuf decode error: {0}")]
    ProtobufDecode(#[from] prost::DecodeError),

    #[error("task not found: seq={0}")]
    TaskNotFound(u64),
}

pub type Result<T> = std::result::Result<T, QueueError>;

/// FjallQueue manages work queue persistence and the DLQ for the document
/// pipeline (C6). Grounded in the teacher's `queue/store.rs`: sequential
/// big-endian `u64` keys, one partition per concern, protobuf-encoded
/// values. Generalized with a `pending`/`in_flight` split so a crashed
/// worker's lease can be reclaimed — the teacher's single `tasks` partition
/// didn't need this because distribution there was a one-shot mpsc hand-off
/// with no lease/visibility-timeout concept.
pub struct FjallQueue {
    keyspace: Keyspace,
    pending: PartitionHandle,
    in_flight: PartitionHandle,
    dlq: PartitionHandle,
    metadata: PartitionHandle,
    seq_counter: AtomicU64,
}

impl FjallQueue {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("opening work queue at {}", path.as_ref().display());

        let keyspace = Config::new(path).open()?;
        let pending = keyspace.open_partition("pending", PartitionCreateOptions::default())?;
        let in_flight = keyspace.open_partition("in_flight", PartitionCreateOptions::default())?;
        let dlq = keyspace.open_partition("dlq", PartitionCreateOptions::default())?;
        let metadata = keyspace.open_partition("metadata", PartitionCreateOptions::default())?;

        let current_seq = metadata
            .get(b"next_seq")?
            .map(|bytes| u64::from_be_bytes(bytes.as_ref().try_into().unwrap_or([0u8; 8])))
            .unwrap_or(0);

        Ok(Self { keyspace, pending, in_flight, dlq, metadata, seq_counter: AtomicU64::new(current_seq) })
    }

    /// Persists a new ticket at `attempt = 0` and returns its sequence
    /// number. Enqueue is durable before the caller is told it succeeded
    /// (§2 at-least-once delivery).
    pub fn enqueue(&self, ticket: &JobTicket) -> Result<u64> {
        let seq = self.seq_counter.fetch_add(1, Ordering::SeqCst);
        let envelope = TaskEnvelope {
            job_id: ticket.job_id.clone(),
            file_path: ticket.file_path.clone(),
            file_name: ticket.file_name.clone(),
            mime_type: ticket.mime_type.clone(),
            attempt: 0,
            visible_at: 0,
        };
        self.pending.insert(seq.to_be_bytes(), envelope.encode_to_vec())?;
        self.metadata.insert(b"next_seq", (seq + 1).to_be_bytes())?;
        debug!(seq, job_id = %ticket.job_id, "task enqueued");
        Ok(seq)
    }

    /// Leases the oldest pending task: moves it into `in_flight` with a
    /// visibility deadline and returns it. Workers must `ack`/`requeue`/
    /// `move_to_dlq` before the lease expires or `reclaim_expired` will hand
    /// it to someone else (§4.6 heartbeat/visibility timeout).
    pub fn lease(&self, visibility_timeout: Duration) -> Result<Option<(u64, TaskEnvelope)>> {
        let Some(item) = self.pending.iter().next() else {
            return Ok(None);
        };
        let (key, value) = item?;
        let seq = u64::from_be_bytes(key.as_ref().try_into().unwrap_or([0u8; 8]));
        let mut envelope = TaskEnvelope::decode(&*value)?;
        envelope.visible_at = (now_secs() + visibility_timeout.as_secs()) as i64;

        self.pending.remove(&key)?;
        self.in_flight.insert(key, envelope.encode_to_vec())?;

        Ok(Some((seq, envelope)))
    }

    /// Marks a leased task's attempt as successful; removes it permanently.
    pub fn ack(&self, seq: u64) -> Result<()> {
        self.in_flight.remove(seq.to_be_bytes())?;
        Ok(())
    }

    /// Returns a leased task to `pending` with its attempt counter
    /// incremented, for a `Transient`/`Cancelled` failure under the retry
    /// budget (§4.6).
    pub fn requeue(&self, seq: u64) -> Result<()> {
        let key = seq.to_be_bytes();
        let Some(bytes) = self.in_flight.get(key)? else {
            return Err(QueueError::TaskNotFound(seq));
        };
        let mut envelope = TaskEnvelope::decode(&*bytes)?;
        envelope.attempt += 1;
        envelope.visible_at = 0;

        self.in_flight.remove(key)?;
        self.pending.insert(key, envelope.encode_to_vec())?;
        debug!(seq, attempt = envelope.attempt, "task requeued");
        Ok(())
    }

    /// Moves an exhausted or permanently failed task to the DLQ.
    pub fn move_to_dlq(&self, seq: u64, stage: &str, error_kind: &str, message: &str) -> Result<()> {
        let key = seq.to_be_bytes();
        let envelope = match self.in_flight.get(key)? {
            Some(bytes) => Some(TaskEnvelope::decode(&*bytes)?),
            None => match self.pending.get(key)? {
                Some(bytes) => Some(TaskEnvelope::decode(&*bytes)?),
                None => None,
            },
        };

        let dlq_entry = DeadLetterTask {
            envelope,
            stage: stage.to_string(),
            error_kind: error_kind.to_string(),
            message: message.to_string(),
            failed_at: now_secs() as i64,
        };
        self.dlq.insert(key, dlq_entry.encode_to_vec())?;

        self.in_flight.remove(key)?;
        self.pending.remove(key)?;
        warn!(seq, stage, error_kind, "task moved to dead-letter queue");
        Ok(())
    }

    /// Sweeps `in_flight` for leases past their visibility deadline and
    /// returns them to `pending`, incrementing their attempt counter —
    /// recovers work stranded by a crashed worker (§8 "worker crash
    /// mid-pipeline").
    pub fn reclaim_expired(&self) -> Result<Vec<u64>> {
        let now = now_secs() as i64;
        let mut reclaimed = Vec::new();

        for item in self.in_flight.iter() {
            let (key, value) = item?;
            let mut envelope = TaskEnvelope::decode(&*value)?;
            if envelope.visible_at > now {
                continue;
            }
            let seq = u64::from_be_bytes(key.as_ref().try_into().unwrap_or([0u8; 8]));
            envelope.attempt += 1;
            envelope.visible_at = 0;
            self.in_flight.remove(&key)?;
            self.pending.insert(&key, envelope.encode_to_vec())?;
            reclaimed.push(seq);
        }

        if !reclaimed.is_empty() {
            warn!(count = reclaimed.len(), "reclaimed expired leases");
        }
        Ok(reclaimed)
    }

    pub fn get_dlq(&self, seq: u64) -> Result<Option<DeadLetterTask>> {
        match self.dlq.get(seq.to_be_bytes())? {
            Some(bytes) => Ok(Some(DeadLetterTask::decode(&*bytes)?)),
            None => Ok(None),
        }
    }

    pub fn list_dlq(&self, limit: usize) -> Result<Vec<(u64, DeadLetterTask)>> {
        let mut results = Vec::new();
        for item in self.dlq.iter().take(limit) {
            let (key, value) = item?;
            let seq = u64::from_be_bytes(key.as_ref().try_into().unwrap_or([0u8; 8]));
            results.push((seq, DeadLetterTask::decode(&*value)?));
        }
        Ok(results)
    }

    pub fn current_seq(&self) -> u64 {
        self.seq_counter.load(Ordering::SeqCst)
    }

    pub fn flush(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    pub fn health_check(&self) -> Result<()> {
        let _ = self.metadata.get(b"next_seq")?;
        Ok(())
    }
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

//! Work Queue Runtime worker pool (C6 part 2): leases tasks from the durable
//! queue, runs each through the orchestrator, and applies the retry/DLQ/
//! finalize decision (§4.6).
//!
//! Grounded in the teacher's `worker/mod.rs` — a bounded pool draining a
//! shared hand-off — generalized from an in-process mpsc receiver per
//! worker to a shared lease-based pull loop: the API and worker processes
//! here are separate CLI commands (possibly separate hosts) that can only
//! share the durable queue on disk, not an in-process channel, so workers
//! pull via `FjallQueue::lease` rather than waiting on a `TaskBroker`
//! receiver.

pub mod runner;

use crate::config::Config;
use crate::ledger::FjallStore;
use crate::observability::Metrics;
use crate::orchestrator::{Adapters, OrchestratorConfig};
use crate::queue::FjallQueue;
use crate::registry::Registry;
use crate::storage::StorageClient;
use runner::WorkerContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Runs the worker pool until a shutdown signal arrives. `W =
/// worker_concurrency` jobs run concurrently, each one processed start to
/// finish by a single worker (§5 concurrency model). On `ctrl_c`/`SIGTERM`,
/// dequeuing stops immediately and in-flight jobs get up to
/// `shutdown_grace_seconds` to finish before being abandoned to redelivery
/// (§5 "the runtime stops dequeuing new tickets, waits for in-flight jobs up
/// to a grace period, and then cancels them").
pub async fn run(ledger_path: String, queue_path: String) -> Result<(), AnyError> {
    let config = Config::load()?;

    let ledger = Arc::new(FjallStore::open(&ledger_path)?);
    let queue = Arc::new(FjallQueue::open(&queue_path)?);
    let registry = Arc::new(Registry::load()?);
    let adapters = Arc::new(Adapters::from_config(&config.adapters));
    let storage = Arc::new(StorageClient::new(config.server.blob_dir.clone()));
    let metrics = Arc::new(Metrics::new());

    info!("ensuring lexical index and vector collection exist");
    adapters
        .search_index
        .ensure_index()
        .await
        .map_err(|e| format!("failed to ensure lexical index: {e}"))?;
    adapters
        .vector_index
        .ensure_collection(config.adapters.vector_dimension)
        .await
        .map_err(|e| format!("failed to ensure vector collection: {e}"))?;

    let ctx = Arc::new(WorkerContext {
        ledger: ledger.clone(),
        queue: queue.clone(),
        storage,
        adapters,
        registry,
        orchestrator_config: OrchestratorConfig {
            embedding_model: config.adapters.embedding_model.clone(),
            job_deadline: Duration::from_secs(config.worker.job_deadline_seconds),
            classifier_confidence_threshold: config.adapters.classifier_confidence_threshold,
        },
        max_retries: config.worker.max_retries,
        retry_backoff_base_ms: config.worker.retry_backoff_base_ms,
        retry_backoff_cap_ms: config.worker.retry_backoff_cap_ms,
        metrics,
    });

    let visibility_timeout = Duration::from_secs(config.worker.visibility_timeout_seconds);
    let poll_interval = Duration::from_millis(config.worker.poll_interval_ms.max(1));
    let concurrency = config.worker.worker_concurrency.max(1);
    let shutdown_grace = Duration::from_secs(config.worker.shutdown_grace_seconds);

    info!(concurrency, visibility_timeout_secs = visibility_timeout.as_secs(), "worker pool starting");

    tokio::spawn(reclaim_loop(queue.clone(), visibility_timeout));
    tokio::spawn(prune_loop(ledger, config.retention.clone()));

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut in_flight = JoinSet::new();
    let mut shutdown = Box::pin(shutdown_signal());

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown signal received, no longer leasing new tasks");
                break;
            }
            permit = semaphore.clone().acquire_owned() => {
                let permit = permit.expect("semaphore is never closed");
                match queue.lease(visibility_timeout) {
                    Ok(Some((seq, envelope))) => {
                        let ctx = ctx.clone();
                        in_flight.spawn(async move {
                            runner::process_task(seq, envelope, &ctx).await;
                            drop(permit);
                        });
                    }
                    Ok(None) => {
                        drop(permit);
                        tokio::time::sleep(poll_interval).await;
                    }
                    Err(e) => {
                        drop(permit);
                        warn!(error = %e, "failed to lease task, backing off");
                        tokio::time::sleep(poll_interval).await;
                    }
                }
            }
        }
    }

    info!(in_flight = in_flight.len(), grace_secs = shutdown_grace.as_secs(), "draining in-flight jobs");
    let drained = tokio::time::timeout(shutdown_grace, async {
        while in_flight.join_next().await.is_some() {}
    })
    .await
    .is_ok();

    if !drained {
        warn!(remaining = in_flight.len(), "grace period elapsed, abandoning remaining jobs to redelivery");
        in_flight.abort_all();
        while in_flight.join_next().await.is_some() {}
    } else {
        info!("all in-flight jobs drained cleanly");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Periodically sweeps `in_flight` leases past their visibility deadline
/// back to `pending`, recovering work stranded by a crashed worker (§8
/// "worker crash mid-pipeline").
async fn reclaim_loop(queue: Arc<FjallQueue>, visibility_timeout: Duration) {
    let tick = (visibility_timeout / 2).max(Duration::from_secs(1));
    let mut interval = tokio::time::interval(tick);
    loop {
        interval.tick().await;
        match queue.reclaim_expired() {
            Ok(reclaimed) if !reclaimed.is_empty() => {
                info!(count = reclaimed.len(), "reclaimed expired leases");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "failed to sweep expired leases"),
        }
    }
}

/// Periodically deletes ledger entries past their retention TTL (§11).
async fn prune_loop(ledger: Arc<FjallStore>, retention: crate::config::RetentionConfig) {
    let tick = Duration::from_secs(6 * 60 * 60);
    let mut interval = tokio::time::interval(tick);
    loop {
        interval.tick().await;
        match ledger.prune_expired(retention.job_ttl_days, retention.logs_ttl_days, retention.idempotency_ttl_days) {
            Ok(stats) => info!(?stats, "ledger pruning complete"),
            Err(e) => warn!(error = %e, "failed to prune ledger"),
        }
    }
}

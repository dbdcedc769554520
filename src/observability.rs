//! Observability stubs (metrics, tracing). Stub now; exporter plumbing
//! (Prometheus/OTLP) is out of scope (§1 Non-goals, §10.5).

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters/gauges (§10.5).
#[derive(Debug, Default)]
pub struct Metrics {
    jobs_accepted: AtomicU64,
    jobs_succeeded: AtomicU64,
    jobs_failed: AtomicU64,
    jobs_degraded: AtomicU64,
    stage_retries: AtomicU64,
    dlq_depth: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_accepted(&self) {
        self.jobs_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_accepted", "Metric incremented");
    }

    pub fn job_succeeded(&self) {
        self.jobs_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_succeeded", "Metric incremented");
    }

    pub fn job_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_failed", "Metric incremented");
    }

    pub fn job_degraded(&self) {
        self.jobs_degraded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_degraded", "Metric incremented");
    }

    pub fn stage_retried(&self) {
        self.stage_retries.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "stage_retries", "Metric incremented");
    }

    pub fn set_dlq_depth(&self, depth: u64) {
        self.dlq_depth.store(depth, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_accepted: self.jobs_accepted.load(Ordering::Relaxed),
            jobs_succeeded: self.jobs_succeeded.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            jobs_degraded: self.jobs_degraded.load(Ordering::Relaxed),
            stage_retries: self.stage_retries.load(Ordering::Relaxed),
            dlq_depth: self.dlq_depth.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub jobs_accepted: u64,
    pub jobs_succeeded: u64,
    pub jobs_failed: u64,
    pub jobs_degraded: u64,
    pub stage_retries: u64,
    pub dlq_depth: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_increment() {
        let metrics = Metrics::new();
        metrics.job_accepted();
        metrics.job_succeeded();
        metrics.job_degraded();
        metrics.stage_retried();
        metrics.set_dlq_depth(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.jobs_accepted, 1);
        assert_eq!(snapshot.jobs_succeeded, 1);
        assert_eq!(snapshot.jobs_failed, 0);
        assert_eq!(snapshot.jobs_degraded, 1);
        assert_eq!(snapshot.stage_retries, 1);
        assert_eq!(snapshot.dlq_depth, 3);
    }
}

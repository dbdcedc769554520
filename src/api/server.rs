use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::decompression::RequestDecompressionLayer;
use tracing::info;

use super::{
    services::{get_job, health, ingest_job},
    state::AppState,
};
use crate::config::Config;
use crate::ledger::FjallStore;
use crate::observability::Metrics;
use crate::queue::FjallQueue;
use crate::storage::StorageClient;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Runs the thin ingress surface (§1): accept a file upload, enqueue a
/// ticket, serve job status reads. `ledger_path` is an explicit CLI override
/// (mirrors the worker's own entrypoint); the queue and blob directories
/// come from the shared `Config` since both the API and worker processes
/// must agree on where the durable queue lives.
pub async fn run(address: SocketAddr, ledger_path: String) -> Result<(), AnyError> {
    info!("loading configuration");
    let config = Config::load().map_err(|e| format!("failed to load config: {e}"))?;

    info!(path = %ledger_path, "opening ledger");
    let ledger = Arc::new(
        FjallStore::open(&ledger_path).map_err(|e| format!("failed to open ledger: {e}"))?,
    );

    info!(path = %config.server.queue_path.display(), "opening work queue");
    let queue = Arc::new(
        FjallQueue::open(&config.server.queue_path)
            .map_err(|e| format!("failed to open queue: {e}"))?,
    );

    let storage = Arc::new(StorageClient::new(config.server.blob_dir.clone()));
    let metrics = Arc::new(Metrics::new());
    let config = Arc::new(config);

    let state = AppState::new(config, ledger, queue, storage, metrics);

    let app = Router::new()
        .route("/jobs", post(ingest_job))
        .route("/jobs/{job_id}", get(get_job))
        .route("/health", get(health))
        .with_state(state)
        // Handles Content-Encoding transparently for clients that gzip their upload.
        .layer(RequestDecompressionLayer::new());

    let listener = TcpListener::bind(address).await?;
    info!(%address, "docflow ingress listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

use std::sync::Arc;

use crate::config::Config;
use crate::ledger::FjallStore;
use crate::observability::Metrics;
use crate::queue::FjallQueue;
use crate::storage::StorageClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<FjallStore>,
    pub queue: Arc<FjallQueue>,
    pub storage: Arc<StorageClient>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        ledger: Arc<FjallStore>,
        queue: Arc<FjallQueue>,
        storage: Arc<StorageClient>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self { config, ledger, queue, storage, metrics }
    }
}

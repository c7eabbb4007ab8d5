use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::index::store::ChunkStore;
use crate::resolve::resolver::FieldResolver;

/// Shared application state injected into all route handlers via Axum
/// extractors. Requests construct their own orchestrator from these handles;
/// nothing here is mutable across requests besides the lock registry.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ChunkStore>,
    /// Pluggable resolution seam. Production: `RagFieldResolver`.
    pub resolver: Arc<dyn FieldResolver>,
    /// Retained for handlers that need runtime settings (collection name,
    /// ports); currently only read at startup.
    #[allow(dead_code)]
    pub config: Config,
    index_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl AppState {
    pub fn new(store: Arc<ChunkStore>, resolver: Arc<dyn FieldResolver>, config: Config) -> Self {
        Self {
            store,
            resolver,
            config,
            index_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Per-tenant indexing lock. Concurrent uploads for one tenant serialize
    /// on it: replace-mode indexing racing append-mode for the same tenant
    /// is undefined, so it is simply not allowed to happen.
    pub async fn tenant_lock(&self, tenant_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.index_locks.lock().await;
        locks.entry(tenant_id.to_string()).or_default().clone()
    }
}

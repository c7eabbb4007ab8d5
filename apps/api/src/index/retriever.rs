//! Tenant-scoped retrieval with local error recovery.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::index::store::{ChunkStore, RetrievedChunk};

/// Thin facade over the chunk store used by field resolution.
///
/// A failed embedding or store read is logged and recovered as an empty
/// result set: the page pass continues with no context (which usually ends
/// in a skip) instead of aborting.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<ChunkStore>,
}

impl Retriever {
    pub fn new(store: Arc<ChunkStore>) -> Self {
        Self { store }
    }

    /// Returns up to `k` chunks belonging strictly to `tenant_id`, ordered
    /// by similarity to `query`.
    pub async fn retrieve(&self, query: &str, tenant_id: &str, k: usize) -> Vec<RetrievedChunk> {
        match self.store.search(query, tenant_id, k).await {
            Ok(chunks) => {
                if let Some(best) = chunks.first() {
                    debug!(
                        %tenant_id,
                        count = chunks.len(),
                        best_score = best.score,
                        best_source = %best.source_id,
                        "retrieved context chunks"
                    );
                } else {
                    debug!(%tenant_id, "no context chunks matched");
                }
                chunks
            }
            Err(err) => {
                warn!(%tenant_id, error = %err, "retrieval failed; continuing with empty context");
                Vec::new()
            }
        }
    }
}

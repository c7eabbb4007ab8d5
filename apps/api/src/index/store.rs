//! Qdrant-backed chunk store: collection lifecycle, tenant-tagged
//! persistence, and tenant-filtered similarity search.
//!
//! One physical collection holds every tenant's chunks; isolation is
//! enforced by the `tenant_id` payload filter applied to every search and
//! every replace-mode delete.

use qdrant_client::qdrant::{
    value::Kind, Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder,
    DeletePointsBuilder, Distance, FieldType, Filter, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::embeddings::{EmbeddingClient, EmbeddingError, EMBEDDING_DIM};
use crate::index::chunker::{chunk_text, TextChunk};

const TENANT_FIELD: &str = "tenant_id";
const SOURCE_FIELD: &str = "source_id";
const TEXT_FIELD: &str = "text";
const HEADING_FIELDS: [&str; 3] = ["heading_1", "heading_2", "heading_3"];

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    Store(#[from] qdrant_client::QdrantError),
}

/// Whether an upload adds to or replaces the tenant's indexed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Append,
    Replace,
}

/// A chunk as returned from a similarity search, highest score first.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub text: String,
    pub source_id: String,
    pub score: f32,
}

pub struct ChunkStore {
    client: Qdrant,
    embeddings: EmbeddingClient,
    collection: String,
}

impl ChunkStore {
    pub fn new(client: Qdrant, embeddings: EmbeddingClient, collection: String) -> Self {
        Self {
            client,
            embeddings,
            collection,
        }
    }

    /// Creates the collection and its payload indexes on first use.
    /// Safe to call repeatedly; an existing collection is left untouched.
    pub async fn ensure_ready(&self) -> Result<(), IndexError> {
        if self.client.collection_exists(&self.collection).await? {
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(EMBEDDING_DIM, Distance::Cosine)),
            )
            .await?;

        // Keyword indexes back the tenant filter and heading-path filters.
        for field in [TENANT_FIELD, SOURCE_FIELD]
            .into_iter()
            .chain(HEADING_FIELDS)
        {
            let request =
                CreateFieldIndexCollectionBuilder::new(&self.collection, field, FieldType::Keyword);
            if let Err(err) = self.client.create_field_index(request).await {
                // Index creation is idempotent; racing creators are fine.
                if !err.to_string().contains("already exists") {
                    return Err(err.into());
                }
            }
        }

        info!("Created collection '{}'", self.collection);
        Ok(())
    }

    /// Chunks and indexes one converted document for `tenant_id`.
    /// `Replace` discards the tenant's existing points first; other tenants'
    /// data is never touched. Partial writes are not rolled back; re-indexing
    /// with `Replace` is the recovery.
    pub async fn index_document(
        &self,
        text: &str,
        source_id: &str,
        tenant_id: &str,
        mode: IndexMode,
    ) -> Result<usize, IndexError> {
        self.ensure_ready().await?;

        let chunks = chunk_text(text);
        if chunks.is_empty() {
            info!(%tenant_id, %source_id, "document produced no chunks; store untouched");
            return Ok(0);
        }

        if mode == IndexMode::Replace {
            self.client
                .delete_points(
                    DeletePointsBuilder::new(&self.collection)
                        .points(tenant_filter(tenant_id))
                        .wait(true),
                )
                .await?;
            info!(%tenant_id, "replace mode: discarded existing tenant points");
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embeddings.embed_batch(&texts).await?;

        let points: Vec<PointStruct> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| chunk_point(chunk, source_id, tenant_id, vector))
            .collect();
        let indexed = points.len();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;

        info!(%tenant_id, %source_id, chunks = indexed, "indexed document");
        Ok(indexed)
    }

    /// Embeds `query` and returns the `k` most similar chunks belonging to
    /// `tenant_id`. The tenant filter is attached to every search; no
    /// unfiltered search path exists.
    pub async fn search(
        &self,
        query: &str,
        tenant_id: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, IndexError> {
        let vector = self.embeddings.embed_one(query).await?;

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, k as u64)
                    .filter(tenant_filter(tenant_id))
                    .with_payload(true),
            )
            .await?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|point| {
                let text = payload_str(&point.payload, TEXT_FIELD)?;
                Some(RetrievedChunk {
                    text,
                    source_id: payload_str(&point.payload, SOURCE_FIELD).unwrap_or_default(),
                    score: point.score,
                })
            })
            .collect())
    }
}

/// Builds the stored point for one chunk. Every persisted copy of a chunk
/// passes through here; the tenant tag is attached unconditionally.
fn chunk_point(
    chunk: &TextChunk,
    source_id: &str,
    tenant_id: &str,
    vector: Vec<f32>,
) -> PointStruct {
    let mut payload = Payload::new();
    payload.insert(TEXT_FIELD, chunk.text.clone());
    payload.insert(SOURCE_FIELD, source_id.to_string());
    payload.insert(TENANT_FIELD, tenant_id.to_string());
    for (field, heading) in HEADING_FIELDS.iter().zip(&chunk.headings) {
        if let Some(heading) = heading {
            payload.insert(*field, heading.clone());
        }
    }
    PointStruct::new(Uuid::new_v4().to_string(), vector, payload)
}

/// The isolation filter: only points tagged for exactly this tenant match.
fn tenant_filter(tenant_id: &str) -> Filter {
    Filter::must([Condition::matches(TENANT_FIELD, tenant_id.to_string())])
}

fn payload_str(
    payload: &std::collections::HashMap<String, qdrant_client::qdrant::Value>,
    key: &str,
) -> Option<String> {
    match payload.get(key)?.kind.as_ref()? {
        Kind::StringValue(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::condition::ConditionOneOf;
    use qdrant_client::qdrant::r#match::MatchValue;

    fn sample_chunk() -> TextChunk {
        TextChunk {
            text: "First Name: Jane".to_string(),
            headings: [Some("Profile".to_string()), None, None],
        }
    }

    #[test]
    fn test_chunk_point_always_carries_tenant_id() {
        let point = chunk_point(&sample_chunk(), "cv.pdf", "tenant-a", vec![0.0; 4]);
        let tenant = point.payload.get(TENANT_FIELD).unwrap();
        assert!(matches!(
            tenant.kind.as_ref().unwrap(),
            Kind::StringValue(s) if s == "tenant-a"
        ));
    }

    #[test]
    fn test_chunk_point_carries_text_source_and_headings() {
        let point = chunk_point(&sample_chunk(), "cv.pdf", "tenant-a", vec![0.0; 4]);
        assert!(matches!(
            point.payload.get(TEXT_FIELD).unwrap().kind.as_ref().unwrap(),
            Kind::StringValue(s) if s == "First Name: Jane"
        ));
        assert!(matches!(
            point.payload.get(SOURCE_FIELD).unwrap().kind.as_ref().unwrap(),
            Kind::StringValue(s) if s == "cv.pdf"
        ));
        assert!(matches!(
            point.payload.get("heading_1").unwrap().kind.as_ref().unwrap(),
            Kind::StringValue(s) if s == "Profile"
        ));
        assert!(!point.payload.contains_key("heading_2"));
    }

    #[test]
    fn test_tenant_filter_matches_exactly_the_queried_tenant() {
        let filter = tenant_filter("tenant-a");
        assert_eq!(filter.must.len(), 1);
        assert!(filter.should.is_empty());
        assert!(filter.must_not.is_empty());

        let ConditionOneOf::Field(field) =
            filter.must[0].condition_one_of.as_ref().unwrap()
        else {
            panic!("expected a field condition");
        };
        assert_eq!(field.key, TENANT_FIELD);
        let matcher = field.r#match.as_ref().unwrap().match_value.as_ref().unwrap();
        assert!(matches!(matcher, MatchValue::Keyword(k) if k == "tenant-a"));
    }

    #[test]
    fn test_payload_str_ignores_non_string_values() {
        let point = chunk_point(&sample_chunk(), "cv.pdf", "tenant-a", vec![0.0; 4]);
        assert_eq!(payload_str(&point.payload, "missing"), None);
        assert_eq!(
            payload_str(&point.payload, TEXT_FIELD),
            Some("First Name: Jane".to_string())
        );
    }
}

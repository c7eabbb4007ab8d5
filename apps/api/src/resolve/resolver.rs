//! Field resolution: retrieval-augmented single-value LLM calls.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::index::retriever::Retriever;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::field::FormField;
use crate::resolve::classifier::{classify, ResolutionPlan};
use crate::resolve::prompts::{RESOLVE_PROMPT_TEMPLATE, RESOLVE_SYSTEM};

/// Number of context chunks retrieved per field.
const RETRIEVAL_K: usize = 3;
/// Exact model output meaning "the CV does not contain this fact".
pub const SKIP_SENTINEL: &str = "SKIP";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("language model call failed: {0}")]
    Llm(#[from] LlmError),
}

/// Outcome of resolving one field. `Skip` is terminal: it never reaches
/// action synthesis output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    Skip,
    Value(String),
}

impl ResolvedValue {
    /// Interprets raw model output: trim surrounding whitespace, then a
    /// case-sensitive comparison against the skip sentinel. Anything else is
    /// forwarded literally; malformed answers are not re-prompted, and a
    /// downstream option mismatch is tolerated rather than corrected.
    pub fn from_model_output(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == SKIP_SENTINEL {
            ResolvedValue::Skip
        } else {
            ResolvedValue::Value(trimmed.to_string())
        }
    }
}

/// The resolution seam. The orchestrator holds an `Arc<dyn FieldResolver>`
/// so the page pass is testable without a store or a model behind it.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    async fn resolve(
        &self,
        field: &FormField,
        tenant_id: &str,
    ) -> Result<ResolvedValue, ResolveError>;
}

/// Production resolver: tenant-scoped retrieval feeding one LLM call per
/// field.
pub struct RagFieldResolver {
    retriever: Retriever,
    llm: LlmClient,
}

impl RagFieldResolver {
    pub fn new(retriever: Retriever, llm: LlmClient) -> Self {
        Self { retriever, llm }
    }
}

#[async_trait]
impl FieldResolver for RagFieldResolver {
    async fn resolve(
        &self,
        field: &FormField,
        tenant_id: &str,
    ) -> Result<ResolvedValue, ResolveError> {
        let query = match classify(field) {
            ResolutionPlan::Inert => return Ok(ResolvedValue::Skip),
            ResolutionPlan::Resolve { query } => query,
        };

        let chunks = self.retriever.retrieve(&query, tenant_id, RETRIEVAL_K).await;
        // Context order equals retrieval rank; no re-ranking.
        let context = chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = build_prompt(field, &context);
        let raw = self.llm.complete(&prompt, RESOLVE_SYSTEM).await?;
        debug!(selector = %field.selector, answer = %raw, "field resolved");

        Ok(ResolvedValue::from_model_output(&raw))
    }
}

fn build_prompt(field: &FormField, context: &str) -> String {
    RESOLVE_PROMPT_TEMPLATE
        .replace("{label}", field.label.as_deref().unwrap_or(""))
        .replace("{name}", field.name.as_deref().unwrap_or(""))
        .replace("{field_type}", field.field_type.as_str())
        .replace("{options}", &field.options.join(", "))
        .replace("{context}", context)
}

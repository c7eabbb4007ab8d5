//! Page resolution: one pass over an externally analyzed form.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::field::FormField;
use crate::resolve::orchestrator::{PageOrchestrator, PageOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveFormRequest {
    pub tenant_id: String,
    /// Field descriptions in page order, as produced by the external form
    /// analyzer.
    pub fields: Vec<FormField>,
}

/// POST /api/v1/forms/resolve
///
/// Always answers 200 with a (possibly empty) action list; per-field
/// failures are reported in-band in `failures`, never as an HTTP error.
pub async fn handle_resolve(
    State(state): State<AppState>,
    Json(req): Json<ResolveFormRequest>,
) -> Result<Json<PageOutcome>, AppError> {
    if req.tenant_id.trim().is_empty() {
        return Err(AppError::Validation("missing tenant_id".to_string()));
    }

    let orchestrator = PageOrchestrator::new(state.resolver.clone());
    let outcome = orchestrator.run(&req.fields, &req.tenant_id).await;
    Ok(Json(outcome))
}

//! Document upload and indexing.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::index::store::IndexMode;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub document_id: String,
    pub chunks_indexed: usize,
}

/// POST /api/v1/documents
///
/// Multipart parts: `tenant_id` (required), `mode` (`append` default,
/// `replace` discards the tenant's existing chunks), `file` (PDF bytes, or
/// already-converted text with markdown heading markers).
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut tenant_id: Option<String> = None;
    let mut mode = IndexMode::Append;
    let mut upload: Option<(Option<String>, bytes::Bytes)> = None;

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = part.name().map(str::to_string);
        match name.as_deref() {
            Some("tenant_id") => {
                let text = part
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid tenant_id part: {e}")))?;
                tenant_id = Some(text);
            }
            Some("mode") => {
                let text = part
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid mode part: {e}")))?;
                mode = parse_mode(&text)?;
            }
            Some("file") => {
                let filename = part.file_name().map(str::to_string);
                let data = part
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid file part: {e}")))?;
                upload = Some((filename, data));
            }
            _ => {}
        }
    }

    let tenant_id = tenant_id
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("missing tenant_id".to_string()))?;
    let (filename, data) = upload
        .ok_or_else(|| AppError::Validation("missing file".to_string()))?;

    let text = extract_text(filename.as_deref(), &data)?;
    let document_id = Uuid::new_v4().to_string();
    let source_id = filename.unwrap_or_else(|| document_id.clone());

    // Indexing for one tenant never interleaves with another upload for the
    // same tenant; the lock covers the whole delete-embed-write sequence.
    let lock = state.tenant_lock(&tenant_id).await;
    let _guard = lock.lock().await;

    let chunks_indexed = state
        .store
        .index_document(&text, &source_id, &tenant_id, mode)
        .await?;

    Ok(Json(UploadResponse {
        document_id,
        chunks_indexed,
    }))
}

fn parse_mode(raw: &str) -> Result<IndexMode, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "append" => Ok(IndexMode::Append),
        "replace" => Ok(IndexMode::Replace),
        other => Err(AppError::Validation(format!(
            "unknown index mode '{other}' (expected 'append' or 'replace')"
        ))),
    }
}

/// PDF bytes go through the document converter; anything else is taken as
/// already-converted text.
fn extract_text(filename: Option<&str>, data: &bytes::Bytes) -> Result<String, AppError> {
    let is_pdf = filename
        .map(|f| f.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false)
        || data.starts_with(b"%PDF");

    if is_pdf {
        pdf_extract::extract_text_from_mem(data).map_err(|e| {
            AppError::UnprocessableEntity(format!("could not extract text from PDF: {e}"))
        })
    } else {
        String::from_utf8(data.to_vec()).map_err(|_| {
            AppError::UnprocessableEntity(
                "file is neither a PDF nor valid UTF-8 text".to_string(),
            )
        })
    }
}

//! PDF upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ingestion::UploadedFile;
use crate::server::state::AppState;
use crate::types::UploadResponse;

/// POST /upload_pdf - Ingest one or more PDFs into a new session
pub async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        // Plain form values carry no file name and are not documents
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            tracing::debug!("Skipping non-file field {:?}", field.name());
            continue;
        };
        let filename = if filename.trim().is_empty() {
            format!("upload_{}.pdf", Uuid::new_v4().simple())
        } else {
            filename
        };

        let data = field.bytes().await.map_err(|e| {
            Error::InvalidRequest(format!("Failed to read file '{}': {}", filename, e))
        })?;

        tracing::info!("Received file: {} ({} bytes)", filename, data.len());
        files.push(UploadedFile::new(filename, data));
    }

    if files.is_empty() {
        return Err(Error::InvalidRequest(
            "expected at least one uploaded PDF file".to_string(),
        ));
    }

    let outcome = state.rag().ingest(files).await?;

    Ok(Json(UploadResponse {
        message: "PDF uploaded successfully.".to_string(),
        session_id: outcome.session_id,
        documents: outcome.documents,
        chunks: outcome.chunks,
    }))
}

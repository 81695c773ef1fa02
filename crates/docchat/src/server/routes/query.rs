//! Query endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// POST /query - Answer a question within a session
pub async fn query(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>> {
    let Json(request) = payload.map_err(|e| Error::InvalidRequest(e.body_text()))?;

    tracing::info!(
        "Query on session {}: {}",
        request.session_id,
        request.query.chars().take(100).collect::<String>()
    );

    let outcome = state.rag().query(&request.session_id, &request.query).await?;

    Ok(Json(QueryResponse {
        response: outcome.answer,
        audio_url: outcome.audio_url,
    }))
}

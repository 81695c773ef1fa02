//! Session inspection and removal

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::HistoryResponse;

/// GET /sessions/:id/history - Conversation so far
pub async fn session_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>> {
    let history = state.rag().history(&id).await?;
    Ok(Json(HistoryResponse {
        session_id: id,
        history,
    }))
}

/// DELETE /sessions/:id - Drop a session and its audio
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.rag().remove_session(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

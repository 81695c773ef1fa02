//! API routes

pub mod query;
pub mod sessions;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    let upload = post(upload::upload_pdf).layer(DefaultBodyLimit::max(max_upload_size));

    Router::new()
        // Upload - with larger body limit for PDFs
        .route("/upload_pdf", upload.clone())
        .route("/upload_pdf/", upload)
        // Query
        .route("/query", post(query::query))
        .route("/query/", post(query::query))
        // Sessions
        .route("/sessions/:id", axum::routing::delete(sessions::delete_session))
        .route("/sessions/:id/history", get(sessions::session_history))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<serde_json::Value> {
    let rag = state.rag();
    axum::Json(serde_json::json!({
        "name": "docchat",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Conversational question answering over uploaded PDFs",
        "llm": {
            "provider": rag.llm().name(),
            "model": rag.llm().model(),
        },
        "embeddings": {
            "provider": rag.embedder().name(),
            "dimensions": rag.embedder().dimensions(),
        },
        "speech": rag.speech_enabled(),
        "endpoints": {
            "POST /upload_pdf": "Upload PDFs and start a session",
            "POST /query": "Ask a question within a session",
            "GET /sessions/:id/history": "Conversation history of a session",
            "DELETE /sessions/:id": "Delete a session",
            "GET /audio/:session/:file": "Rendered answer audio"
        }
    }))
}

//! Request and response bodies for the HTTP API

use serde::{Deserialize, Serialize};

use super::conversation::Turn;

/// Body of `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The user's question
    pub query: String,
    /// Session returned by `POST /upload_pdf`
    pub session_id: String,
}

/// Successful response of `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The generated answer
    pub response: String,
    /// Where the spoken answer can be fetched, when speech succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Successful response of `POST /upload_pdf`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub message: String,
    /// Number of PDFs ingested into the session
    pub documents: usize,
    /// Number of chunks indexed
    pub chunks: usize,
}

/// Response of `GET /sessions/:id/history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub history: Vec<Turn>,
}

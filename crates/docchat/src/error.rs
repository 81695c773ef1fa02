//! Error types for the conversational RAG service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for docchat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// PDF could not be turned into a usable document
    #[error("Failed to ingest '{filename}': {message}")]
    Ingestion { filename: String, message: String },

    /// Query referenced a session that does not exist (or has expired)
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Embedding or index failure
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Language model failure
    #[error("Generation failed: {0}")]
    Generation(String),

    /// An external call exceeded its time budget
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    /// Speech synthesis failure
    #[error("Speech rendering failed: {0}")]
    Render(String),

    /// Malformed client input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an ingestion error
    pub fn ingestion(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ingestion {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            secs,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status and machine-readable type for this error
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Ingestion { .. } => (StatusCode::BAD_REQUEST, "ingestion_error"),
            Error::SessionNotFound(_) => (StatusCode::BAD_REQUEST, "session_not_found"),
            Error::Retrieval(_) => (StatusCode::BAD_GATEWAY, "retrieval_error"),
            Error::Generation(_) => (StatusCode::SERVICE_UNAVAILABLE, "generation_error"),
            Error::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            Error::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "render_error"),
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status();

        // Front ends key off this exact shape for unknown sessions
        if let Error::SessionNotFound(id) = &self {
            tracing::info!("Rejected query for unknown session {}", id);
            return (status, Json(json!({ "message": "Session not found" }))).into_response();
        }

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_not_found_is_client_error() {
        let (status, kind) = Error::SessionNotFound("abc".into()).status();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(kind, "session_not_found");

        let response = Error::SessionNotFound("abc".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_timeout_message() {
        let err = Error::timeout("answer generation", 30);
        assert_eq!(err.to_string(), "answer generation timed out after 30s");
        assert_eq!(err.status().0, StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_ingestion_error_names_file() {
        let err = Error::ingestion("report.pdf", "no extractable text");
        assert!(err.to_string().contains("report.pdf"));
        assert_eq!(err.status().0, StatusCode::BAD_REQUEST);
    }
}

//! Core types for the conversational RAG service

pub mod conversation;
pub mod document;
pub mod query;

pub use conversation::{Role, Turn};
pub use document::{Chunk, Document};
pub use query::{HistoryResponse, QueryRequest, QueryResponse, UploadResponse};

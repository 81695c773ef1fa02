//! docchat: conversational question answering over uploaded PDFs
//!
//! Every upload becomes an isolated session holding the extracted documents,
//! an in-memory vector index over their chunks and the conversation so far.
//! Follow-up questions are rewritten into standalone queries before
//! retrieval, answers are grounded in the retrieved chunks, and each answer
//! can also be rendered to speech.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod speech;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::{ConversationalRag, QueryOutcome, QueryStage, QueryTrace, UploadOutcome};
pub use session::{InMemorySessionStore, SessionId, SessionRecord, SessionStore};
pub use types::{
    conversation::{Role, Turn},
    document::{Chunk, Document},
    query::{QueryRequest, QueryResponse, UploadResponse},
};

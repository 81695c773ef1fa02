//! Session storage: documents, index and history per conversation

mod memory;

pub use memory::InMemorySessionStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::Result;
use crate::retrieval::VectorIndex;
use crate::types::{Document, Role, Turn};

/// Opaque session identifier (UUID v4 string)
pub type SessionId = String;

/// Generate a fresh session id
pub fn new_session_id() -> SessionId {
    uuid::Uuid::new_v4().to_string()
}

/// Snapshot of one session
///
/// Documents and index are immutable after upload and shared by `Arc`;
/// the history is copied at the time of the read.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: SessionId,
    pub documents: Arc<Vec<Document>>,
    pub index: Arc<VectorIndex>,
    pub history: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(id: SessionId, documents: Vec<Document>, index: VectorIndex) -> Self {
        let now = Utc::now();
        Self {
            id,
            documents: Arc::new(documents),
            index: Arc::new(index),
            history: Vec::new(),
            created_at: now,
            last_active: now,
        }
    }
}

/// Keyed storage of sessions
///
/// Implementations:
/// - `InMemorySessionStore`: process-local, sharded map with idle expiry
///
/// Unknown and expired ids both fail with `Error::SessionNotFound`.
/// Appends to one session are serialized so concurrent writers never lose turns.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Register a new session for freshly ingested documents
    async fn create(&self, documents: Vec<Document>, index: VectorIndex) -> Result<SessionId>;

    /// Read a session, marking it active
    async fn get(&self, id: &str) -> Result<SessionRecord>;

    /// Append one turn to a session's history
    async fn append_history(&self, id: &str, role: Role, text: &str) -> Result<()> {
        self.append_turns(id, vec![Turn::new(role, text)]).await
    }

    /// Append several turns as one step; all land or none do
    async fn append_turns(&self, id: &str, turns: Vec<Turn>) -> Result<()>;

    /// Destroy a session; returns whether it existed
    async fn remove(&self, id: &str) -> bool;

    /// Number of stored sessions (including ones not yet swept)
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every expired session; returns how many were removed
    async fn evict_expired(&self) -> usize;
}

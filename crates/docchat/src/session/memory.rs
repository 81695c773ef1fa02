//! In-memory session store on a sharded concurrent map

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::retrieval::VectorIndex;
use crate::types::{Document, Turn};

use super::{new_session_id, SessionId, SessionRecord, SessionStore};

/// Process-local session store
///
/// Sessions idle for longer than `ttl` are treated as gone the next time they
/// are touched. Creating a session beyond `max_sessions` evicts the least
/// recently active one.
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, SessionRecord>,
    ttl: Option<Duration>,
    max_sessions: usize,
}

impl InMemorySessionStore {
    pub fn new(ttl: Option<Duration>, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.ttl_secs.map(Duration::from_secs),
            config.max_sessions,
        )
    }

    fn is_expired(&self, record: &SessionRecord, now: DateTime<Utc>) -> bool {
        match self.ttl {
            Some(ttl) => {
                let idle = (now - record.last_active).to_std().unwrap_or_default();
                idle >= ttl
            }
            None => false,
        }
    }

    /// Run `f` on a live session under its entry lock
    fn with_live<T>(&self, id: &str, f: impl FnOnce(&mut SessionRecord) -> T) -> Result<T> {
        let now = Utc::now();
        {
            let Some(mut entry) = self.sessions.get_mut(id) else {
                return Err(Error::SessionNotFound(id.to_string()));
            };
            if !self.is_expired(&entry, now) {
                entry.last_active = now;
                return Ok(f(&mut entry));
            }
        }

        // The entry guard must be released before removal
        self.sessions.remove(id);
        tracing::info!("Session {} expired", id);
        Err(Error::SessionNotFound(id.to_string()))
    }

    /// Make room for one more session
    fn enforce_capacity(&self) {
        if self.sessions.len() < self.max_sessions {
            return;
        }
        self.sweep_expired();

        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.last_active)
                .map(|entry| entry.key().clone());

            match oldest {
                Some(id) => {
                    self.sessions.remove(&id);
                    tracing::info!("Evicted least recently active session {}", id);
                }
                None => break,
            }
        }
    }

    fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, record| !self.is_expired(record, now));
        before.saturating_sub(self.sessions.len())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, documents: Vec<Document>, index: VectorIndex) -> Result<SessionId> {
        self.enforce_capacity();

        let id = new_session_id();
        let record = SessionRecord::new(id.clone(), documents, index);
        tracing::info!(
            "Created session {} ({} documents, {} chunks)",
            id,
            record.documents.len(),
            record.index.len()
        );
        self.sessions.insert(id.clone(), record);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<SessionRecord> {
        self.with_live(id, |record| record.clone())
    }

    async fn append_turns(&self, id: &str, turns: Vec<Turn>) -> Result<()> {
        self.with_live(id, |record| record.history.extend(turns))
    }

    async fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    async fn len(&self) -> usize {
        self.sessions.len()
    }

    async fn evict_expired(&self) -> usize {
        let removed = self.sweep_expired();
        if removed > 0 {
            tracing::info!("Evicted {} expired sessions", removed);
        }
        removed
    }
}

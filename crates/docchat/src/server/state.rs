//! Application state for the HTTP server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::pipeline::ConversationalRag;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Upload and query pipeline
    rag: ConversationalRag,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create state with providers built from configuration
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");
        let rag = ConversationalRag::from_config(&config)?;
        Ok(Self::from_parts(config, rag))
    }

    /// Create state around an already assembled pipeline
    pub fn from_parts(config: RagConfig, rag: ConversationalRag) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                rag,
                ready: RwLock::new(true),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the pipeline
    pub fn rag(&self) -> &ConversationalRag {
        &self.inner.rag
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}

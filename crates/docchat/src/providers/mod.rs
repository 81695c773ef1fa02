//! Capability providers for embeddings and chat completion
//!
//! Trait-based seams so the pipeline can run against a local Ollama server,
//! an OpenAI-compatible endpoint (Groq, OpenAI, vLLM) or offline hashing
//! embeddings.

pub mod embedding;
pub mod hashing;
mod http;
pub mod llm;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

pub use embedding::EmbeddingProvider;
pub use hashing::HashingEmbedder;
pub use llm::{ChatMessage, ChatRole, LlmProvider};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use crate::config::{EmbeddingBackend, LlmBackend, RagConfig};
use crate::error::Result;

/// Build the embedding provider selected by configuration
pub fn build_embedder(config: &RagConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder: Arc<dyn EmbeddingProvider> = match config.embeddings.provider {
        EmbeddingBackend::Ollama => Arc::new(OllamaClient::new(&config.llm, &config.embeddings)?),
        EmbeddingBackend::OpenAi => Arc::new(OpenAiClient::new(&config.llm, &config.embeddings)?),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(config.embeddings.dimensions)),
    };
    tracing::info!(
        "Embedding provider: {} ({} dims)",
        embedder.name(),
        embedder.dimensions()
    );
    Ok(embedder)
}

/// Build the chat completion provider selected by configuration
pub fn build_llm(config: &RagConfig) -> Result<Arc<dyn LlmProvider>> {
    let llm: Arc<dyn LlmProvider> = match config.llm.provider {
        LlmBackend::Ollama => Arc::new(OllamaClient::new(&config.llm, &config.embeddings)?),
        LlmBackend::OpenAi => Arc::new(OpenAiClient::new(&config.llm, &config.embeddings)?),
    };
    tracing::info!("LLM provider: {} (model {})", llm.name(), llm.model());
    Ok(llm)
}

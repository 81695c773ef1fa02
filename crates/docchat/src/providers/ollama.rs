//! Ollama API client for embeddings and chat with retry logic

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::http::{build_client, describe_failure, retry_request};
use super::llm::{ChatMessage, LlmProvider};

/// Ollama API client with automatic retry
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Base URL for chat requests
    base_url: String,
    /// Base URL for embedding requests
    embed_url: String,
    /// Embedding model name
    embed_model: String,
    /// Generation model name
    generate_model: String,
    /// Sampling temperature
    temperature: f32,
    /// Expected embedding dimensions
    dimensions: usize,
    /// Maximum retries
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client with retry support
    pub fn new(llm: &LlmConfig, embeddings: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(llm.timeout_secs)?,
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            embed_url: llm.embeddings_url().trim_end_matches('/').to_string(),
            embed_model: embeddings.model.clone(),
            generate_model: llm.generate_model.clone(),
            temperature: llm.temperature,
            dimensions: embeddings.dimensions,
            max_retries: llm.max_retries,
        })
    }

    async fn embed_once(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.embed_url);
        let request = EmbedRequest {
            model: &self.embed_model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::retrieval(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::retrieval(format!(
                "Embedding failed: {}",
                describe_failure(response).await
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::retrieval(format!("Failed to parse embedding response: {}", e)))?;

        if embed_response.embedding.is_empty() {
            return Err(Error::retrieval(format!(
                "Model '{}' returned an empty embedding",
                self.embed_model
            )));
        }

        Ok(embed_response.embedding)
    }

    async fn chat_once(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.generate_model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation(format!("Chat request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::generation(format!(
                "Chat failed: {}",
                describe_failure(response).await
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("Failed to parse chat response: {}", e)))?;

        Ok(chat_response.message.content)
    }

    async fn ping(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        retry_request("Ollama embedding", self.max_retries, || self.embed_once(text)).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.ping().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[async_trait]
impl LlmProvider for OllamaClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        tracing::debug!(
            "Ollama chat with model {} ({} messages)",
            self.generate_model,
            messages.len()
        );
        retry_request("Ollama chat", self.max_retries, || self.chat_once(messages)).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.ping().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.generate_model
    }
}

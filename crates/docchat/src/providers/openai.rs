//! OpenAI-compatible client (Groq, OpenAI, vLLM) for chat and embeddings

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::http::{build_client, describe_failure, retry_request};
use super::llm::{ChatMessage, LlmProvider};

/// Client for `/chat/completions` and `/embeddings` with bearer auth
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    embed_url: String,
    api_key: String,
    embed_model: String,
    generate_model: String,
    temperature: f32,
    dimensions: usize,
    max_retries: u32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiClient {
    pub fn new(llm: &LlmConfig, embeddings: &EmbeddingConfig) -> Result<Self> {
        let api_key = llm
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("llm.api_key is required for the openai provider".into()))?;

        Ok(Self {
            client: build_client(llm.timeout_secs)?,
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            embed_url: llm.embeddings_url().trim_end_matches('/').to_string(),
            api_key,
            embed_model: embeddings.model.clone(),
            generate_model: llm.generate_model.clone(),
            temperature: llm.temperature,
            dimensions: embeddings.dimensions,
            max_retries: llm.max_retries,
        })
    }

    async fn complete_once(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = CompletionRequest {
            model: &self.generate_model,
            messages,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::generation(format!(
                "Completion failed: {}",
                describe_failure(response).await
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("Failed to parse completion: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::generation("Completion returned no choices"))
    }

    async fn embed_many_once(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.embed_url);
        let request = EmbeddingsRequest {
            model: &self.embed_model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
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

        let mut parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::retrieval(format!("Failed to parse embeddings: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(Error::retrieval(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_batch(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::retrieval("Embedding response was empty"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        retry_request("Embedding batch", self.max_retries, || {
            self.embed_many_once(texts)
        })
        .await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.embed("ping").await.is_ok())
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        retry_request("Chat completion", self.max_retries, || {
            self.complete_once(messages)
        })
        .await
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.base_url);
        match self.client.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn model(&self) -> &str {
        &self.generate_model
    }
}

//! Configuration for the conversational RAG service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// LLM configuration
    pub llm: LlmConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Rewrite/answer configuration
    pub generation: GenerationConfig,
    /// Session lifetime configuration
    pub session: SessionConfig,
    /// Speech rendering configuration
    pub speech: SpeechConfig,
    /// PDF ingestion configuration
    pub ingestion: IngestionConfig,
}

impl RagConfig {
    /// Load configuration: defaults, then an optional TOML file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse TOML text; missing sections fall back to defaults
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Apply `DOCCHAT_*` (and `GROQ_KEY`) environment overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("DOCCHAT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("DOCCHAT_PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(url) = std::env::var("DOCCHAT_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("DOCCHAT_LLM_MODEL") {
            self.llm.generate_model = model;
        }
        if let Ok(dir) = std::env::var("DOCCHAT_AUDIO_DIR") {
            self.speech.output_dir = PathBuf::from(dir);
        }
        let key = std::env::var("DOCCHAT_API_KEY").or_else(|_| std::env::var("GROQ_KEY"));
        if let Ok(key) = key {
            if !key.trim().is_empty() {
                self.llm.api_key = Some(key);
            }
        }
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;

        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be at least 1".to_string()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be at least 1".to_string()));
        }
        if self.generation.max_sentences == 0 {
            return Err(Error::Config("generation.max_sentences must be at least 1".to_string()));
        }
        if self.session.max_sessions == 0 {
            return Err(Error::Config("session.max_sessions must be at least 1".to_string()));
        }
        let timeouts = [
            ("embeddings.timeout_secs", self.embeddings.timeout_secs),
            ("llm.timeout_secs", self.llm.timeout_secs),
            ("generation.rewrite_timeout_secs", self.generation.rewrite_timeout_secs),
            ("generation.answer_timeout_secs", self.generation.answer_timeout_secs),
            ("speech.timeout_secs", self.speech.timeout_secs),
            ("ingestion.extract_timeout_secs", self.ingestion.extract_timeout_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(Error::Config(format!("{} must be at least 1", name)));
        }
        let needs_key = self.llm.provider == LlmBackend::OpenAi
            || self.embeddings.provider == EmbeddingBackend::OpenAi;
        if needs_key && self.llm.api_key.is_none() {
            return Err(Error::Config(
                "llm.api_key (or GROQ_KEY) is required for the openai provider".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Allowed CORS origins (empty = any origin)
    pub cors_origins: Vec<String>,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Embedding backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local Ollama server
    #[default]
    Ollama,
    /// OpenAI-compatible `/embeddings` endpoint
    OpenAi,
    /// Offline feature hashing (no model server)
    Hashing,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which backend produces embeddings
    pub provider: EmbeddingBackend,
    /// Embedding model name (all-MiniLM-L6-v2 is served by Ollama as `all-minilm`)
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Concurrent embedding requests while building an index
    pub concurrency: usize,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::Ollama,
            model: "all-minilm".to_string(),
            dimensions: 384,
            concurrency: 4,
            timeout_secs: 60,
        }
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// LLM backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Local Ollama server
    #[default]
    Ollama,
    /// OpenAI-compatible chat completions (Groq, OpenAI, vLLM...)
    OpenAi,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which backend answers chat requests
    pub provider: LlmBackend,
    /// Base URL for the LLM backend
    pub base_url: String,
    /// Base URL for embeddings when it differs from `base_url`
    pub embed_base_url: Option<String>,
    /// API key for OpenAI-compatible backends
    pub api_key: Option<String>,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Retries for failed requests (0 disables)
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmBackend::Ollama,
            base_url: "http://localhost:11434".to_string(),
            embed_base_url: None,
            api_key: None,
            generate_model: "llama3:8b".to_string(),
            temperature: 0.2, // Low for grounded answers
            timeout_secs: 120,
            max_retries: 1,
        }
    }
}

impl LlmConfig {
    /// Base URL used for embedding requests
    pub fn embeddings_url(&self) -> &str {
        self.embed_base_url.as_deref().unwrap_or(&self.base_url)
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters repeated from the end of the previous chunk
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 5000,
            chunk_overlap: 500,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be at least 1".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks passed to the answer generator
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Query rewriting and answer generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Hard cap on sentences in an answer
    pub max_sentences: usize,
    /// Timeout for the rewrite call in seconds
    pub rewrite_timeout_secs: u64,
    /// Timeout for the answer call in seconds
    pub answer_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_sentences: 3,
            rewrite_timeout_secs: 60,
            answer_timeout_secs: 120,
        }
    }
}

/// Session lifetime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle time after which a session expires (None = never)
    pub ttl_secs: Option<u64>,
    /// Maximum live sessions; the least recently active is evicted beyond this
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: Some(3600), // 1 hour idle
            max_sessions: 1000,
        }
    }
}

/// Speech backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpeechBackend {
    /// Google Translate TTS endpoint (what gTTS uses)
    #[default]
    GoogleTranslate,
    /// No audio
    Disabled,
}

/// Speech rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Speech backend
    pub provider: SpeechBackend,
    /// Language code passed to the synthesizer
    pub language: String,
    /// Directory rendered audio is written to
    pub output_dir: PathBuf,
    /// TTS endpoint base URL
    pub base_url: String,
    /// Timeout for a full synthesis in seconds
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            provider: SpeechBackend::GoogleTranslate,
            language: "en".to_string(),
            output_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("docchat")
                .join("audio"),
            base_url: "https://translate.google.com".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SpeechConfig {
    pub fn enabled(&self) -> bool {
        self.provider != SpeechBackend::Disabled
    }
}

/// PDF ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Timeout for extracting text from one PDF in seconds
    pub extract_timeout_secs: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            extract_timeout_secs: 60,
        }
    }
}

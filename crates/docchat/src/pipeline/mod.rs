//! Session-scoped conversational RAG pipeline
//!
//! Upload: extract -> chunk -> embed -> new session.
//! Query: session lookup -> rewrite -> retrieve -> answer -> history append -> speech.

mod trace;

pub use trace::{QueryStage, QueryTrace, StageEntry};

use futures::future::try_join_all;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::{AnswerGenerator, QueryRewriter};
use crate::ingestion::{IngestPipeline, TextChunker, UploadedFile};
use crate::providers::{self, EmbeddingProvider, LlmProvider};
use crate::retrieval::{ScoredChunk, VectorIndex};
use crate::session::{InMemorySessionStore, SessionId, SessionStore};
use crate::speech::{self, AudioStore, SpeechRenderer};
use crate::types::Turn;

/// Result of ingesting one upload into a new session
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub session_id: SessionId,
    pub filenames: Vec<String>,
    pub documents: usize,
    pub chunks: usize,
}

/// Result of one answered query
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub answer: String,
    /// The question actually used for retrieval
    pub standalone_query: String,
    pub sources: Vec<ScoredChunk>,
    pub audio_url: Option<String>,
    pub trace: QueryTrace,
}

/// Renderer plus where its output goes
#[derive(Clone)]
struct SpeechOutput {
    renderer: Arc<dyn SpeechRenderer>,
    store: AudioStore,
    language: String,
    timeout: Duration,
}

/// Time bounds for external calls
#[derive(Debug, Clone, Copy)]
struct Limits {
    top_k: usize,
    embed_concurrency: usize,
    embed_timeout: Duration,
    rewrite_timeout: Duration,
    answer_timeout: Duration,
}

impl Limits {
    fn from_config(config: &RagConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            embed_concurrency: config.embeddings.concurrency.max(1),
            embed_timeout: config.embeddings.timeout(),
            rewrite_timeout: Duration::from_secs(config.generation.rewrite_timeout_secs),
            answer_timeout: Duration::from_secs(config.generation.answer_timeout_secs),
        }
    }
}

/// Fail with `Error::Timeout` when `fut` does not finish within `limit`
async fn bounded<T>(
    operation: &str,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::timeout(operation, limit.as_secs())),
    }
}

/// Conversational question answering over per-session document sets
#[derive(Clone)]
pub struct ConversationalRag {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    store: Arc<dyn SessionStore>,
    ingest: IngestPipeline,
    rewriter: QueryRewriter,
    generator: AnswerGenerator,
    speech: Option<SpeechOutput>,
    limits: Limits,
}

impl ConversationalRag {
    /// Assemble a pipeline from explicit capabilities
    ///
    /// Speech is off until `with_speech` is called.
    pub fn new(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        config.validate()?;

        let chunker = TextChunker::from_config(&config.chunking)?;
        let ingest = IngestPipeline::with_pdf_parser(
            chunker,
            Duration::from_secs(config.ingestion.extract_timeout_secs),
        );

        Ok(Self {
            rewriter: QueryRewriter::new(Arc::clone(&llm)),
            generator: AnswerGenerator::new(Arc::clone(&llm), config.generation.max_sentences),
            embedder,
            llm,
            store,
            ingest,
            speech: None,
            limits: Limits::from_config(config),
        })
    }

    /// Build every capability from configuration
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let embedder = providers::build_embedder(config)?;
        let llm = providers::build_llm(config)?;
        let store: Arc<dyn SessionStore> =
            Arc::new(InMemorySessionStore::from_config(&config.session));

        let mut rag = Self::new(config, embedder, llm, store)?;
        if let Some(renderer) = speech::build_renderer(&config.speech)? {
            tracing::info!(
                "Speech renderer: {} (audio in {})",
                renderer.name(),
                config.speech.output_dir.display()
            );
            rag = rag.with_speech(
                renderer,
                AudioStore::new(config.speech.output_dir.clone()),
                config.speech.language.clone(),
                Duration::from_secs(config.speech.timeout_secs),
            );
        }
        Ok(rag)
    }

    /// Render answers to audio with `renderer`, stored in `store`
    pub fn with_speech(
        mut self,
        renderer: Arc<dyn SpeechRenderer>,
        store: AudioStore,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        self.speech = Some(SpeechOutput {
            renderer,
            store,
            language: language.into(),
            timeout,
        });
        self
    }

    /// Replace the ingestion pipeline (custom extractor or chunk sizes)
    pub fn with_ingest_pipeline(mut self, ingest: IngestPipeline) -> Self {
        self.ingest = ingest;
        self
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    pub fn speech_enabled(&self) -> bool {
        self.speech.is_some()
    }

    /// Ingest uploaded PDFs into a brand new session
    ///
    /// Any file that cannot be read fails the whole upload; no session is created.
    pub async fn ingest(&self, files: Vec<UploadedFile>) -> Result<UploadOutcome> {
        if files.is_empty() {
            return Err(Error::InvalidRequest("no files uploaded".to_string()));
        }
        let start = Instant::now();

        let ingested = try_join_all(files.iter().map(|file| self.ingest.ingest(file))).await?;

        let mut documents = Vec::with_capacity(ingested.len());
        let mut chunks = Vec::new();
        for (doc, doc_chunks) in ingested {
            chunks.extend(doc_chunks);
            documents.push(doc);
        }
        let chunk_count = chunks.len();
        let filenames: Vec<String> = documents.iter().map(|d| d.filename.clone()).collect();

        // One embedding round per `embed_concurrency` chunks, each bounded by the embed timeout
        let rounds = chunk_count.div_ceil(self.limits.embed_concurrency).max(1) as u32;
        let index = bounded(
            "index build",
            self.limits.embed_timeout * rounds,
            VectorIndex::build(chunks, self.embedder.as_ref(), self.limits.embed_concurrency),
        )
        .await?;

        let session_id = self.store.create(documents, index).await?;

        tracing::info!(
            "Upload complete for session {}: {} files, {} chunks in {}ms",
            session_id,
            filenames.len(),
            chunk_count,
            start.elapsed().as_millis()
        );

        Ok(UploadOutcome {
            session_id,
            documents: filenames.len(),
            filenames,
            chunks: chunk_count,
        })
    }

    /// Answer `question` in the context of session `session_id`
    ///
    /// History is only appended once an answer exists; a failure or timeout at
    /// any stage leaves the session untouched.
    pub async fn query(&self, session_id: &str, question: &str) -> Result<QueryOutcome> {
        let mut trace = QueryTrace::start();

        match self.answer(session_id, question, &mut trace).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                trace.fail();
                tracing::warn!(
                    "Query on session {} failed after {:?}: {}",
                    session_id,
                    trace.stages(),
                    e
                );
                Err(e)
            }
        }
    }

    async fn answer(
        &self,
        session_id: &str,
        question: &str,
        trace: &mut QueryTrace,
    ) -> Result<QueryOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidRequest("query must not be empty".to_string()));
        }

        let session = self.store.get(session_id).await?;

        let standalone = bounded(
            "query rewrite",
            self.limits.rewrite_timeout,
            self.rewriter.rewrite(&session.history, question),
        )
        .await?;
        trace.advance(QueryStage::Rewritten);

        let sources = bounded(
            "retrieval",
            self.limits.embed_timeout,
            session
                .index
                .retrieve(&standalone, self.limits.top_k, self.embedder.as_ref()),
        )
        .await?;
        trace.advance(QueryStage::Retrieved);

        let answer = bounded(
            "answer generation",
            self.limits.answer_timeout,
            self.generator.generate(&standalone, &sources, &session.history),
        )
        .await?;
        trace.advance(QueryStage::Answered);

        self.store
            .append_turns(
                session_id,
                vec![Turn::user(question), Turn::assistant(answer.clone())],
            )
            .await?;
        trace.advance(QueryStage::HistoryAppended);

        let audio_url = self.render_audio(session_id, &answer).await;
        if audio_url.is_some() {
            trace.advance(QueryStage::RenderedAudio);
        }
        trace.advance(QueryStage::Responded);

        tracing::info!(
            "Answered query on session {} in {}ms ({} sources)",
            session_id,
            trace.elapsed_ms(),
            sources.len()
        );

        Ok(QueryOutcome {
            answer,
            standalone_query: standalone,
            sources,
            audio_url,
            trace: trace.clone(),
        })
    }

    /// Speak the answer; any failure just means no audio
    async fn render_audio(&self, session_id: &str, answer: &str) -> Option<String> {
        let speech = self.speech.as_ref()?;
        let turn_id = uuid::Uuid::new_v4().simple().to_string();

        let rendered = bounded(
            "speech rendering",
            speech.timeout,
            speech.renderer.synthesize(answer, &speech.language),
        )
        .await;

        let result = match rendered {
            Ok(audio) => speech.store.save(session_id, &turn_id, &audio).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(
                    "Speech rendering failed for session {}, answering without audio: {}",
                    session_id,
                    e
                );
                None
            }
        }
    }

    /// Conversation so far for a session
    pub async fn history(&self, session_id: &str) -> Result<Vec<Turn>> {
        Ok(self.store.get(session_id).await?.history)
    }

    /// Destroy a session and its rendered audio
    pub async fn remove_session(&self, session_id: &str) -> Result<()> {
        if !self.store.remove(session_id).await {
            return Err(Error::SessionNotFound(session_id.to_string()));
        }
        if let Some(speech) = &self.speech {
            if let Err(e) = speech.store.remove_session(session_id).await {
                tracing::warn!("Could not delete audio for session {}: {}", session_id, e);
            }
        }
        tracing::info!("Removed session {}", session_id);
        Ok(())
    }

    /// Whether the model backends answer their health checks
    pub async fn providers_healthy(&self) -> bool {
        let embed_ok = self.embedder.health_check().await.unwrap_or(false);
        let llm_ok = self.llm.health_check().await.unwrap_or(false);
        embed_ok && llm_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeechBackend;
    use crate::ingestion::pdf::tests::build_pdf;
    use crate::providers::{ChatMessage, EmbeddingProvider, HashingEmbedder};
    use crate::types::Role;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Model that only knows what the context tells it
    ///
    /// Rewrite calls resolve "it" against a history that mentions Paris;
    /// answer calls report the capital only when the context contains it.
    #[derive(Default)]
    struct ContextBoundLlm {
        rewrite_calls: AtomicUsize,
        answer_calls: AtomicUsize,
        answer_delay: Option<Duration>,
        fail_rewrite: bool,
        fail_answer: bool,
    }

    #[async_trait]
    impl LlmProvider for ContextBoundLlm {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            let system = &messages[0].content;
            let question = messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();

            if system.contains("Do NOT answer") {
                self.rewrite_calls.fetch_add(1, Ordering::SeqCst);
                if self.fail_rewrite {
                    return Err(Error::generation("rewrite model offline"));
                }
                let mentions_paris = messages[1..messages.len() - 1]
                    .iter()
                    .any(|m| m.content.contains("Paris"));
                if mentions_paris {
                    return Ok(format!("Standalone question: {}", question.replace(" it", " Paris")));
                }
                return Ok(question);
            }

            self.answer_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_answer {
                return Err(Error::generation("answer model offline"));
            }
            if let Some(delay) = self.answer_delay {
                tokio::time::sleep(delay).await;
            }
            let q = question.to_lowercase();
            if q.contains("capital") && q.contains("france") && system.contains("Paris") {
                Ok("The capital of France is Paris.".to_string())
            } else {
                Ok("I don't know.".to_string())
            }
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "context-bound"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    /// Embeds normally until switched off
    struct SwitchableEmbedder {
        inner: HashingEmbedder,
        offline: AtomicBool,
    }

    impl SwitchableEmbedder {
        fn new(dimensions: usize) -> Self {
            Self {
                inner: HashingEmbedder::new(dimensions),
                offline: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for SwitchableEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(Error::retrieval("embedding backend offline"));
            }
            self.inner.embed(text).await
        }

        fn dimensions(&self) -> usize {
            self.inner.dimensions()
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(!self.offline.load(Ordering::SeqCst))
        }

        fn name(&self) -> &str {
            "switchable"
        }
    }

    struct FakeRenderer;

    #[async_trait]
    impl SpeechRenderer for FakeRenderer {
        async fn synthesize(&self, text: &str, _language: &str) -> Result<Vec<u8>> {
            Ok(format!("ID3{}", text).into_bytes())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct BrokenRenderer;

    #[async_trait]
    impl SpeechRenderer for BrokenRenderer {
        async fn synthesize(&self, _text: &str, _language: &str) -> Result<Vec<u8>> {
            Err(Error::render("tts endpoint unreachable"))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn test_config() -> RagConfig {
        let mut config = RagConfig::default();
        config.chunking.chunk_size = 200;
        config.chunking.chunk_overlap = 20;
        config.embeddings.dimensions = 256;
        config.speech.provider = SpeechBackend::Disabled;
        config.generation.answer_timeout_secs = 1;
        config
    }

    fn rag_with_parts(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<ContextBoundLlm>,
    ) -> ConversationalRag {
        let config = test_config();
        ConversationalRag::new(
            &config,
            embedder,
            llm,
            Arc::new(InMemorySessionStore::from_config(&config.session)),
        )
        .unwrap()
    }

    fn rag_with(llm: Arc<ContextBoundLlm>) -> ConversationalRag {
        let dimensions = test_config().embeddings.dimensions;
        rag_with_parts(Arc::new(HashingEmbedder::new(dimensions)), llm)
    }

    fn rag() -> ConversationalRag {
        rag_with(Arc::new(ContextBoundLlm::default()))
    }

    fn pdf(name: &str, pages: &[&str]) -> UploadedFile {
        UploadedFile::new(name, build_pdf(pages))
    }

    async fn france_session(rag: &ConversationalRag) -> SessionId {
        rag.ingest(vec![pdf("france.pdf", &["The capital of France is Paris."])])
            .await
            .unwrap()
            .session_id
    }

    #[tokio::test]
    async fn test_upload_creates_session() {
        let rag = rag();
        let outcome = rag
            .ingest(vec![
                pdf("france.pdf", &["The capital of France is Paris."]),
                pdf("japan.pdf", &["The capital of Japan is Tokyo."]),
            ])
            .await
            .unwrap();

        assert_eq!(outcome.documents, 2);
        assert_eq!(outcome.filenames, vec!["france.pdf", "japan.pdf"]);
        assert!(outcome.chunks >= 2);

        let record = rag.store().get(&outcome.session_id).await.unwrap();
        assert_eq!(record.documents.len(), 2);
        assert_eq!(record.index.len(), outcome.chunks);
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let err = rag().ingest(Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_creates_no_session() {
        let rag = rag();
        let err = rag
            .ingest(vec![
                pdf("good.pdf", &["Fine text."]),
                UploadedFile::new("bad.pdf", b"%PDF-1.4 truncated".to_vec()),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ingestion { .. }));
        assert_eq!(rag.store().len().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let err = rag().query("no-such-session", "Hello?").await.unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_paris_scenario() {
        let llm = Arc::new(ContextBoundLlm::default());
        let rag = rag_with(llm.clone());
        let session = france_session(&rag).await;

        let first = rag
            .query(&session, "What is the capital of France?")
            .await
            .unwrap();
        assert!(first.answer.contains("Paris"));
        assert_eq!(first.standalone_query, "What is the capital of France?");
        assert!(first.audio_url.is_none());
        // Empty history: no rewrite call
        assert_eq!(llm.rewrite_calls.load(Ordering::SeqCst), 0);

        let follow_up = rag
            .query(&session, "What river runs through it?")
            .await
            .unwrap();
        assert_eq!(follow_up.standalone_query, "What river runs through Paris?");
        assert_eq!(llm.rewrite_calls.load(Ordering::SeqCst), 1);
        // The document says nothing about rivers
        assert!(follow_up.answer.to_lowercase().contains("don't know"));

        let history = rag.history(&session).await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "What is the capital of France?");
        assert_eq!(history[3].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_trace_records_every_stage() {
        let rag = rag();
        let session = france_session(&rag).await;
        let outcome = rag.query(&session, "What is the capital of France?").await.unwrap();
        assert_eq!(
            outcome.trace.stages(),
            vec![
                QueryStage::Received,
                QueryStage::Rewritten,
                QueryStage::Retrieved,
                QueryStage::Answered,
                QueryStage::HistoryAppended,
                QueryStage::Responded,
            ]
        );
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let rag = rag();
        let france = france_session(&rag).await;
        let japan = rag
            .ingest(vec![pdf("japan.pdf", &["The capital of Japan is Tokyo."])])
            .await
            .unwrap()
            .session_id;

        let outcome = rag
            .query(&japan, "What is the capital of France?")
            .await
            .unwrap();
        assert!(outcome.sources.iter().all(|s| s.chunk.filename == "japan.pdf"));
        assert!(!outcome.answer.contains("Paris"));

        assert!(rag.history(&france).await.unwrap().is_empty());
        assert_eq!(rag.history(&japan).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_leaves_history_untouched() {
        let llm = Arc::new(ContextBoundLlm {
            answer_delay: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        let rag = rag_with(llm);
        let session = france_session(&rag).await;

        let err = rag
            .query(&session, "What is the capital of France?")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(rag.history(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_history_untouched() {
        let embedder = Arc::new(SwitchableEmbedder::new(test_config().embeddings.dimensions));
        let rag = rag_with_parts(embedder.clone(), Arc::new(ContextBoundLlm::default()));
        let session = france_session(&rag).await;
        rag.query(&session, "What is the capital of France?").await.unwrap();
        let before = rag.history(&session).await.unwrap();

        embedder.offline.store(true, Ordering::SeqCst);
        let err = rag
            .query(&session, "What is the capital of France?")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Retrieval(_)));
        assert_eq!(rag.history(&session).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_rewrite_failure_leaves_history_untouched() {
        let llm = Arc::new(ContextBoundLlm {
            fail_rewrite: true,
            ..Default::default()
        });
        let rag = rag_with(llm.clone());
        let session = france_session(&rag).await;

        // Empty history skips the rewrite, so the first query succeeds
        rag.query(&session, "What is the capital of France?").await.unwrap();
        let before = rag.history(&session).await.unwrap();
        assert_eq!(before.len(), 2);

        let err = rag
            .query(&session, "What river runs through it?")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert_eq!(llm.rewrite_calls.load(Ordering::SeqCst), 1);
        assert_eq!(rag.history(&session).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_answer_failure_leaves_history_untouched() {
        let llm = Arc::new(ContextBoundLlm {
            fail_answer: true,
            ..Default::default()
        });
        let rag = rag_with(llm.clone());
        let session = france_session(&rag).await;

        let err = rag
            .query(&session, "What is the capital of France?")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert_eq!(llm.answer_calls.load(Ordering::SeqCst), 1);
        assert!(rag.history(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_queries_keep_all_history() {
        let rag = Arc::new(rag());
        let session = france_session(&rag).await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let rag = Arc::clone(&rag);
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                rag.query(&session, &format!("What is the capital of France? ({})", i))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let history = rag.history(&session).await.unwrap();
        assert_eq!(history.len(), 16);
        let users = history.iter().filter(|t| t.role == Role::User).count();
        assert_eq!(users, 8);
    }

    #[tokio::test]
    async fn test_speech_adds_audio_url() {
        let dir = tempfile::tempdir().unwrap();
        let rag = rag().with_speech(
            Arc::new(FakeRenderer),
            AudioStore::new(dir.path()),
            "en",
            Duration::from_secs(5),
        );
        let session = france_session(&rag).await;

        let outcome = rag.query(&session, "What is the capital of France?").await.unwrap();
        let url = outcome.audio_url.unwrap();
        assert!(url.starts_with(&format!("/audio/{}/", session)));
        assert!(outcome.trace.stages().contains(&QueryStage::RenderedAudio));

        let file_name = url.rsplit('/').next().unwrap();
        assert!(dir.path().join(&session).join(file_name).exists());
    }

    #[tokio::test]
    async fn test_render_failure_still_answers() {
        let dir = tempfile::tempdir().unwrap();
        let rag = rag().with_speech(
            Arc::new(BrokenRenderer),
            AudioStore::new(dir.path()),
            "en",
            Duration::from_secs(5),
        );
        let session = france_session(&rag).await;

        let outcome = rag.query(&session, "What is the capital of France?").await.unwrap();
        assert!(outcome.answer.contains("Paris"));
        assert!(outcome.audio_url.is_none());
        assert_eq!(rag.history(&session).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_session() {
        let rag = rag();
        let session = france_session(&rag).await;
        rag.remove_session(&session).await.unwrap();
        assert!(matches!(
            rag.query(&session, "Anyone there?").await,
            Err(Error::SessionNotFound(_))
        ));
        assert!(matches!(
            rag.remove_session(&session).await,
            Err(Error::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let rag = rag();
        let session = france_session(&rag).await;
        let err = rag.query(&session, "   ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}

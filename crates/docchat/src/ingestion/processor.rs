//! Ingestion pipeline orchestration

use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

use super::chunker::TextChunker;
use super::pdf::{PdfParser, PdfTextExtractor};

/// One file received from an upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as given by the client
    pub filename: String,
    /// Raw bytes
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Extract + chunk pipeline for uploaded PDFs
#[derive(Clone)]
pub struct IngestPipeline {
    /// PDF text extraction capability
    extractor: Arc<dyn PdfTextExtractor>,
    /// Text chunker
    chunker: TextChunker,
    /// Upper bound for extracting one file
    extract_timeout: Duration,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(
        extractor: Arc<dyn PdfTextExtractor>,
        chunker: TextChunker,
        extract_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            chunker,
            extract_timeout,
        }
    }

    /// Pipeline with the local PDF parser
    pub fn with_pdf_parser(chunker: TextChunker, extract_timeout: Duration) -> Self {
        Self::new(Arc::new(PdfParser::new()), chunker, extract_timeout)
    }

    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    /// Turn one uploaded PDF into a document
    ///
    /// Extraction is CPU-bound, so it runs on the blocking pool.
    pub async fn extract_document(&self, file: &UploadedFile) -> Result<Document> {
        let extractor = Arc::clone(&self.extractor);
        let filename = file.filename.clone();
        let data = file.data.clone();

        let task = tokio::task::spawn_blocking(move || extractor.extract(&filename, &data));

        let extracted = match tokio::time::timeout(self.extract_timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_err)) => {
                return Err(Error::ingestion(
                    &file.filename,
                    format!("extraction aborted: {}", join_err),
                ))
            }
            Err(_) => {
                return Err(Error::ingestion(
                    &file.filename,
                    format!(
                        "text extraction timed out after {}s",
                        self.extract_timeout.as_secs()
                    ),
                ))
            }
        };

        Ok(Document::new(
            file.filename.clone(),
            extracted.text,
            extracted.page_count,
            file.data.len() as u64,
        ))
    }

    /// Full ingestion of one file: extract + chunk
    pub async fn ingest(&self, file: &UploadedFile) -> Result<(Document, Vec<Chunk>)> {
        let doc = self.extract_document(file).await?;
        let chunks = self.chunker.chunk_document(&doc);

        tracing::info!(
            "Ingested '{}': {} pages, {} chars, {} chunks",
            doc.filename,
            doc.page_count,
            doc.char_len(),
            chunks.len()
        );

        Ok((doc, chunks))
    }
}

//! Per-session in-memory vector index with cosine search

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

/// One stored chunk with its embedding
#[derive(Debug, Clone)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
    norm: f32,
}

/// A retrieved chunk and its similarity to the query
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Embedded chunks of one session's documents
///
/// Entries are kept in chunk order so equal scores rank the earlier chunk first.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl VectorIndex {
    /// Embed every chunk and build the index
    ///
    /// At most `concurrency` embedding requests are in flight at once.
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: &dyn EmbeddingProvider,
        concurrency: usize,
    ) -> Result<Self> {
        // Owned texts keep the embedding futures free of borrows into `chunks`
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors: Vec<Vec<f32>> = stream::iter(texts)
            .map(|text| async move { embedder.embed(&text).await })
            .buffered(concurrency.max(1))
            .try_collect()
            .await?;

        let mut index = Self::default();
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            index.insert(chunk, vector)?;
        }

        tracing::debug!(
            "Built vector index: {} chunks, {} dims",
            index.len(),
            index.dimensions
        );
        Ok(index)
    }

    /// Add one pre-embedded chunk
    pub fn insert(&mut self, chunk: Chunk, vector: Vec<f32>) -> Result<()> {
        if vector.is_empty() {
            return Err(Error::retrieval(format!(
                "Empty embedding for chunk {} of '{}'",
                chunk.chunk_index, chunk.filename
            )));
        }
        if self.entries.is_empty() {
            self.dimensions = vector.len();
        } else if vector.len() != self.dimensions {
            return Err(Error::retrieval(format!(
                "Invalid vector dimensions: expected {}, got {}",
                self.dimensions,
                vector.len()
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::retrieval(
                "Invalid vector values: contains NaN or Infinity",
            ));
        }

        let norm = l2_norm(&vector);
        self.entries.push(IndexEntry {
            chunk,
            vector,
            norm,
        });
        Ok(())
    }

    /// Embed `query` and return the `k` most similar chunks, best first
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let query_vector = embedder.embed(query).await?;
        self.search(&query_vector, k)
    }

    /// Rank stored chunks against an already embedded query
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(Error::retrieval(format!(
                "Query dimensions {} do not match index dimensions {}",
                query.len(),
                self.dimensions
            )));
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(Error::retrieval("Query embedding contains NaN or Infinity"));
        }

        let query_norm = l2_norm(query);
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine(query, query_norm, &entry.vector, entry.norm)))
            .collect();

        // Stable sort keeps chunk order for equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(i, score)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Chunks in index order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity; zero vectors score 0
fn cosine(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}

//! Document and chunk types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A single uploaded PDF reduced to its text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Original filename as uploaded
    pub filename: String,
    /// Extracted text, all pages in page order
    pub text: String,
    /// Number of pages in the source PDF
    pub page_count: u32,
    /// Size of the uploaded file in bytes
    pub size_bytes: u64,
    /// SHA-256 of the extracted text
    pub content_hash: String,
    /// When the document was ingested
    pub ingested_at: DateTime<Utc>,
}

impl Document {
    /// Create a document from extracted text
    pub fn new(filename: impl Into<String>, text: String, page_count: u32, size_bytes: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            content_hash: hash_content(&text),
            text,
            page_count,
            size_bytes,
            ingested_at: Utc::now(),
        }
    }

    /// Length of the text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A contiguous, overlapping slice of a document's text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Owning document
    pub document_id: Uuid,
    /// Source filename (for logging and answer context)
    pub filename: String,
    /// Position of this chunk within its document
    pub chunk_index: u32,
    /// Start offset in characters
    pub char_start: usize,
    /// End offset in characters (exclusive)
    pub char_end: usize,
    /// Chunk text
    pub content: String,
}

impl Chunk {
    /// Create a chunk belonging to `doc`
    pub fn new(
        doc: &Document,
        chunk_index: u32,
        char_start: usize,
        char_end: usize,
        content: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: doc.id,
            filename: doc.filename.clone(),
            chunk_index,
            char_start,
            char_end,
            content,
        }
    }
}

/// Hex SHA-256 of some text
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_hash_is_stable() {
        let a = Document::new("a.pdf", "same text".to_string(), 1, 10);
        let b = Document::new("b.pdf", "same text".to_string(), 1, 10);
        assert_ne!(a.id, b.id);
        assert_eq!(a.content_hash, b.content_hash);
        assert_eq!(a.content_hash.len(), 64);
    }

    #[test]
    fn test_char_len_counts_scalars() {
        let doc = Document::new("u.pdf", "héllo".to_string(), 1, 5);
        assert_eq!(doc.char_len(), 5);
    }
}

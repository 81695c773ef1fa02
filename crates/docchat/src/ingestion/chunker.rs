//! Fixed-size text chunking with exact character overlap

use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::{Chunk, Document};

/// A chunk boundary expressed in character offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    /// Start offset in characters
    pub char_start: usize,
    /// End offset in characters (exclusive)
    pub char_end: usize,
    /// The text between the two offsets
    pub text: String,
}

/// Preferred places to end a chunk, strongest first
#[derive(Debug, Clone, Copy)]
enum Break {
    Paragraph,
    Line,
    Sentence,
    Word,
}

const BREAK_PRIORITY: [Break; 4] = [Break::Paragraph, Break::Line, Break::Sentence, Break::Word];

/// Text chunker with configurable size and overlap
///
/// Every chunk after the first starts with exactly the last `overlap`
/// characters of the chunk before it. Chunk ends are pulled back to the
/// strongest natural break that still leaves room for progress, falling
/// back to a hard cut at `chunk_size` characters.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters shared with the previous chunk
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker, rejecting sizes that cannot make progress
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
        }
        .validate()?;

        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunk a document into retrievable units
    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        self.split(&doc.text)
            .into_iter()
            .enumerate()
            .map(|(index, span)| {
                Chunk::new(doc, index as u32, span.char_start, span.char_end, span.text)
            })
            .collect()
    }

    /// Split text into ordered, overlapping spans covering all of it
    pub fn split(&self, text: &str) -> Vec<TextSpan> {
        // Byte offset of every char boundary, including the end of the text
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;

        if total == 0 {
            return Vec::new();
        }

        let sentence_starts: HashSet<usize> = text
            .split_sentence_bound_indices()
            .map(|(i, _)| i)
            .collect();

        let span = |start: usize, end: usize| TextSpan {
            char_start: start,
            char_end: end,
            text: text[offsets[start]..offsets[end]].to_string(),
        };

        let mut spans = Vec::new();
        let mut start = 0usize;

        loop {
            if total - start <= self.chunk_size {
                spans.push(span(start, total));
                break;
            }

            let hard_end = start + self.chunk_size;
            // The next chunk must start after this one does
            let min_end = start + self.overlap + 1;

            let end = self
                .find_break(text, &offsets, &sentence_starts, min_end, hard_end)
                .unwrap_or(hard_end);

            spans.push(span(start, end));
            start = end - self.overlap;
        }

        spans
    }

    /// Latest position in `min_end..=max_end` that ends on the strongest available break
    fn find_break(
        &self,
        text: &str,
        offsets: &[usize],
        sentence_starts: &HashSet<usize>,
        min_end: usize,
        max_end: usize,
    ) -> Option<usize> {
        BREAK_PRIORITY.iter().find_map(|kind| {
            (min_end..=max_end)
                .rev()
                .find(|&end| Self::is_break(*kind, text, offsets, sentence_starts, end))
        })
    }

    fn is_break(
        kind: Break,
        text: &str,
        offsets: &[usize],
        sentence_starts: &HashSet<usize>,
        end: usize,
    ) -> bool {
        let byte = offsets[end];
        let before = &text[..byte];
        match kind {
            Break::Paragraph => before.ends_with("\n\n"),
            Break::Line => before.ends_with('\n'),
            Break::Sentence => sentence_starts.contains(&byte),
            Break::Word => before.chars().next_back().is_some_and(char::is_whitespace),
        }
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tail(s: &str, n: usize) -> String {
        let count = s.chars().count();
        s.chars().skip(count.saturating_sub(n)).collect()
    }

    fn head(s: &str, n: usize) -> String {
        s.chars().take(n).collect()
    }

    fn sample_text() -> String {
        let mut text = String::new();
        for p in 0..12 {
            for s in 0..6 {
                text.push_str(&format!(
                    "Paragraph {} sentence {} talks about rivers, bridges and old maps. ",
                    p, s
                ));
            }
            text.push_str("\n\n");
        }
        text
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = TextChunker::new(100, 10).unwrap();
        let spans = chunker.split("The capital of France is Paris.");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "The capital of France is Paris.");
        assert_eq!(spans[0].char_start, 0);
        assert_eq!(spans[0].char_end, 31);
    }

    #[test]
    fn test_text_of_exactly_chunk_size_is_one_chunk() {
        let chunker = TextChunker::new(10, 3).unwrap();
        assert_eq!(chunker.split("abcdefghij").len(), 1);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let chunker = TextChunker::new(100, 10).unwrap();
        assert!(chunker.split("").is_empty());
    }

    #[test]
    fn test_each_chunk_repeats_previous_tail() {
        let chunker = TextChunker::new(300, 40).unwrap();
        let text = sample_text();
        let spans = chunker.split(&text);
        assert!(spans.len() > 3);

        for pair in spans.windows(2) {
            assert_eq!(head(&pair[1].text, 40), tail(&pair[0].text, 40));
            assert_eq!(pair[1].char_start, pair[0].char_end - 40);
        }
    }

    #[test]
    fn test_chunks_cover_the_whole_text() {
        let chunker = TextChunker::new(250, 30).unwrap();
        let text = sample_text();
        let spans = chunker.split(&text);

        assert_eq!(spans.first().unwrap().char_start, 0);
        assert_eq!(spans.last().unwrap().char_end, text.chars().count());

        let mut rebuilt = spans[0].text.clone();
        for span in &spans[1..] {
            rebuilt.extend(span.text.chars().skip(30));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_chunks_never_exceed_chunk_size() {
        let chunker = TextChunker::new(120, 20).unwrap();
        for span in chunker.split(&sample_text()) {
            assert!(span.text.chars().count() <= 120);
        }
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        let chunker = TextChunker::new(60, 5).unwrap();
        let text = "First paragraph is here.\n\nSecond paragraph is longer than the first one.";
        let spans = chunker.split(text);
        assert!(spans[0].text.ends_with("\n\n"));
    }

    #[test]
    fn test_hard_cut_without_breaks() {
        let chunker = TextChunker::new(10, 2).unwrap();
        let text = "a".repeat(25);
        let spans = chunker.split(&text);
        assert_eq!(spans[0].text.len(), 10);
        assert_eq!(spans[1].char_start, 8);
        assert_eq!(spans.last().unwrap().char_end, 25);
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let chunker = TextChunker::new(200, 25).unwrap();
        let text = sample_text();
        assert_eq!(chunker.split(&text), chunker.split(&text));

        let again = TextChunker::new(200, 25).unwrap();
        assert_eq!(chunker.split(&text), again.split(&text));
    }

    #[test]
    fn test_multibyte_text() {
        let chunker = TextChunker::new(7, 2).unwrap();
        let text = "日本語のテキストを分割します";
        let spans = chunker.split(text);
        for pair in spans.windows(2) {
            assert_eq!(head(&pair[1].text, 2), tail(&pair[0].text, 2));
        }
        assert_eq!(spans.last().unwrap().char_end, text.chars().count());
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        assert!(TextChunker::new(0, 0).is_err());
        assert!(TextChunker::new(10, 10).is_err());
        assert!(TextChunker::new(10, 11).is_err());
    }

    #[test]
    fn test_chunk_document_assigns_indices() {
        let chunker = TextChunker::new(300, 40).unwrap();
        let doc = Document::new("maps.pdf", sample_text(), 2, 1024);
        let chunks = chunker.chunk_document(&doc);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i as u32);
            assert_eq!(chunk.document_id, doc.id);
            assert_eq!(chunk.filename, "maps.pdf");
        }
    }
}

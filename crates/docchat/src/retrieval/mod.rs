//! Semantic retrieval over a session's chunks

pub mod index;

pub use index::{ScoredChunk, VectorIndex};

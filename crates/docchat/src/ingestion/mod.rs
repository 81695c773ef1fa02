//! PDF ingestion: text extraction and chunking

mod chunker;
pub mod pdf;
mod processor;

pub use chunker::{TextChunker, TextSpan};
pub use pdf::{ExtractedText, PdfParser, PdfTextExtractor};
pub use processor::{IngestPipeline, UploadedFile};

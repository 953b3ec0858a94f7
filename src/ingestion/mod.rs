//! Document ingestion: chunking of extracted text

pub mod chunker;

pub use chunker::TextChunker;

//! docqa: document question-answering backend
//!
//! Users upload documents (PDF, DOCX, TXT), the system extracts text, splits
//! it into overlapping chunks, embeds the chunks into a per-document vector
//! index, and answers questions by retrieving the most similar chunks and
//! forwarding them with recent conversation history to an LLM for grounded
//! answer generation.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use types::{
    chat::ChatEntry,
    document::{Document, DocumentStatus},
};

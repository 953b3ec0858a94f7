//! Response types for the HTTP API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chat::ChatEntry;
use super::document::{Document, DocumentStatus};

/// Token issued on registration and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Opaque API token for the Authorization header
    pub token: String,
}

/// Document representation returned by upload and listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Document ID
    pub id: Uuid,
    /// Original filename
    pub filename: String,
    /// File size in bytes
    pub file_size: u64,
    /// Upload timestamp
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    /// Ingestion progress
    pub status: DocumentStatus,
    /// Number of chunks in the index (0 until indexing completes)
    pub chunk_count: usize,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            file_size: doc.file_size,
            uploaded_at: doc.uploaded_at,
            status: doc.status,
            chunk_count: doc.chunks.as_ref().map(|c| c.len()).unwrap_or(0),
        }
    }
}

/// Response for `GET /api/documents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    /// The caller's documents, most recent first
    pub documents: Vec<DocumentSummary>,
    /// Total count
    pub total_count: usize,
}

/// Lightweight document reference embedded in chat entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Document ID
    pub id: Uuid,
    /// Original filename
    pub filename: String,
}

/// One chat exchange as returned by `GET /api/history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntryResponse {
    /// Entry ID
    pub id: Uuid,
    /// Question text
    pub question: String,
    /// Answer text
    pub answer: String,
    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Document this exchange refers to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentRef>,
}

impl ChatEntryResponse {
    /// Build from a chat entry and an optional resolved document reference
    pub fn from_entry(entry: &ChatEntry, document: Option<DocumentRef>) -> Self {
        Self {
            id: entry.id,
            question: entry.question.clone(),
            answer: entry.answer.clone(),
            created_at: entry.created_at,
            document,
        }
    }
}

/// Answer returned by `POST /api/qa`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Generated answer text
    pub answer: String,
}

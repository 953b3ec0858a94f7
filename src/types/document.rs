//! Document types and the ingestion state machine

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ingestion progress persisted on the document row.
///
/// A document advances through these stages during upload. A crash
/// mid-pipeline leaves the row at the last completed stage, which makes
/// partial failures observable: a document that never reached `Indexed`
/// cannot serve questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Row created, nothing extracted yet
    Created,
    /// Text extraction completed (possibly with empty text)
    Extracted,
    /// Text split into chunks
    Chunked,
    /// Index file written and attached to the row
    Indexed,
}

impl DocumentStatus {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Extracted => "extracted",
            Self::Chunked => "chunked",
            Self::Indexed => "indexed",
        }
    }

    /// Parse from the database representation
    pub fn parse(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "extracted" => Self::Extracted,
            "chunked" => Self::Chunked,
            "indexed" => Self::Indexed,
            _ => Self::Created,
        }
    }
}

/// An uploaded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Owning user (absent only for legacy rows)
    pub user_id: Option<Uuid>,
    /// Original filename as uploaded
    pub filename: String,
    /// File size in bytes
    pub file_size: u64,
    /// Upload timestamp
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    /// Extracted plain text (None until extraction ran; may be empty)
    pub text_content: Option<String>,
    /// Ingestion progress
    pub status: DocumentStatus,
    /// Path to the persisted vector index. Set together with `chunks`,
    /// only after the index file exists on disk.
    pub index_path: Option<String>,
    /// Ordered text chunks covering the extracted text
    pub chunks: Option<Vec<String>>,
}

impl Document {
    /// Create a new document owned by `user_id`
    pub fn new(user_id: Uuid, filename: String, file_size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            filename,
            file_size,
            uploaded_at: chrono::Utc::now(),
            text_content: None,
            status: DocumentStatus::Created,
            index_path: None,
            chunks: None,
        }
    }

    /// Whether the document can serve questions
    pub fn is_indexed(&self) -> bool {
        self.status == DocumentStatus::Indexed && self.index_path.is_some()
    }

    /// Extension of the original filename, lowercase, without the dot
    pub fn extension(filename: &str) -> String {
        filename.rsplit('.').next().unwrap_or("").to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            DocumentStatus::Created,
            DocumentStatus::Extracted,
            DocumentStatus::Chunked,
            DocumentStatus::Indexed,
        ] {
            assert_eq!(DocumentStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn test_new_document_is_not_indexed() {
        let doc = Document::new(Uuid::new_v4(), "notes.txt".to_string(), 42);
        assert_eq!(doc.status, DocumentStatus::Created);
        assert!(!doc.is_indexed());
        assert!(doc.index_path.is_none());
        assert!(doc.chunks.is_none());
    }

    #[test]
    fn test_extension() {
        assert_eq!(Document::extension("notes.txt"), "txt");
        assert_eq!(Document::extension("Report.Final.PDF"), "pdf");
        assert_eq!(Document::extension("no_extension"), "no_extension");
        assert_eq!(Document::extension(""), "");
    }
}

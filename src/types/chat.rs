//! Chat history types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One question/answer exchange. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    /// Unique entry ID
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Document this exchange refers to (None = general exchange)
    pub document_id: Option<Uuid>,
    /// Question text (or the synthetic upload notification)
    pub question: String,
    /// Answer text
    pub answer: String,
    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ChatEntry {
    /// Create a new exchange
    pub fn new(
        user_id: Uuid,
        document_id: Option<Uuid>,
        question: String,
        answer: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            document_id,
            question,
            answer,
            created_at: chrono::Utc::now(),
        }
    }

    /// Synthetic notification recorded when a document is uploaded
    pub fn upload_notification(user_id: Uuid, document_id: Uuid, filename: &str) -> Self {
        Self::new(
            user_id,
            Some(document_id),
            format!("Document uploaded: {}", filename),
            format!("'{}' has been uploaded. You can now ask questions about it.", filename),
        )
    }
}

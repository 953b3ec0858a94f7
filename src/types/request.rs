//! Request types for the HTTP API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Credentials for registration and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    /// Username (must be unique for registration)
    pub username: String,
    /// Plaintext password
    pub password: String,
}

/// Question request for `POST /api/qa`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// Document to answer against (None = general exchange)
    #[serde(default)]
    pub document_id: Option<Uuid>,
    /// The question to answer
    pub question: String,
}

/// Query parameters for `GET /api/history`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    /// Restrict history to one document
    #[serde(default)]
    pub document_id: Option<Uuid>,
}

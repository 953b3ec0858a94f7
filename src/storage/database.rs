//! SQLite persistence for users, auth tokens, documents, and chat history
//!
//! Row-level atomicity is the only cross-request coordination in the system;
//! the index-attachment invariant (`index_path` and `chunks` written
//! together) is enforced here by a single UPDATE statement.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::chat::ChatEntry;
use crate::types::document::{Document, DocumentStatus};
use crate::types::response::DocumentRef;

/// A registered user row
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed storage
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::Database(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Database(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        // WAL for concurrent readers; foreign_keys for the cascades below
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
        "#,
        )
        .map_err(|e| Error::Database(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS auth_tokens (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_auth_tokens_user_id ON auth_tokens(user_id);

            -- user_id is nullable: legacy rows may predate ownership
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                user_id TEXT REFERENCES users(id) ON DELETE CASCADE,
                filename TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                uploaded_at TEXT NOT NULL,
                text_content TEXT,
                status TEXT NOT NULL,
                index_path TEXT,
                chunks TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_documents_user_id ON documents(user_id);

            CREATE TABLE IF NOT EXISTS chat_history (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                document_id TEXT REFERENCES documents(id) ON DELETE CASCADE,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chat_history_user_id ON chat_history(user_id);
            CREATE INDEX IF NOT EXISTS idx_chat_history_document_id ON chat_history(document_id);
        "#,
        )
        .map_err(|e| Error::Database(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Database migrations complete");
        Ok(())
    }

    // ==================== User Operations ====================

    /// Create a new user. Fails with `UsernameTaken` on conflict.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<UserRecord> {
        let conn = self.conn.lock();

        let user = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        let result = conn.execute(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.username,
                user.password_hash,
                user.created_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(user),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::UsernameTaken(username.to_string()))
            }
            Err(e) => Err(Error::Database(format!("Failed to create user: {}", e))),
        }
    }

    /// Look up a user by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare("SELECT id, username, password_hash, created_at FROM users WHERE username = ?1")
            .map_err(|e| Error::Database(format!("Failed to prepare query: {}", e)))?;

        let record = stmt
            .query_row(params![username], row_to_user)
            .optional()
            .map_err(|e| Error::Database(format!("Failed to get user: {}", e)))?;

        Ok(record)
    }

    // ==================== Token Operations ====================

    /// Store a freshly issued token for a user
    pub fn insert_token(&self, token: &str, user_id: &Uuid) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO auth_tokens (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token, user_id.to_string(), Utc::now().to_rfc3339()],
        )
        .map_err(|e| Error::Database(format!("Failed to insert token: {}", e)))?;

        Ok(())
    }

    /// Resolve a presented token to its user
    pub fn get_user_by_token(&self, token: &str) -> Result<Option<UserRecord>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(
                "SELECT u.id, u.username, u.password_hash, u.created_at
                 FROM auth_tokens t JOIN users u ON u.id = t.user_id
                 WHERE t.token = ?1",
            )
            .map_err(|e| Error::Database(format!("Failed to prepare query: {}", e)))?;

        let record = stmt
            .query_row(params![token], row_to_user)
            .optional()
            .map_err(|e| Error::Database(format!("Failed to resolve token: {}", e)))?;

        Ok(record)
    }

    // ==================== Document Operations ====================

    /// Insert a freshly uploaded document row
    pub fn insert_document(&self, doc: &Document) -> Result<()> {
        let conn = self.conn.lock();

        let chunks_json = doc
            .chunks
            .as_ref()
            .map(|c| serde_json::to_string(c))
            .transpose()?;

        conn.execute(
            r#"
            INSERT INTO documents (id, user_id, filename, file_size, uploaded_at,
                                   text_content, status, index_path, chunks)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                doc.id.to_string(),
                doc.user_id.map(|id| id.to_string()),
                doc.filename,
                doc.file_size as i64,
                doc.uploaded_at.to_rfc3339(),
                doc.text_content,
                doc.status.as_str(),
                doc.index_path,
                chunks_json,
            ],
        )
        .map_err(|e| Error::Database(format!("Failed to insert document: {}", e)))?;

        Ok(())
    }

    /// Advance the ingestion stage of a document
    pub fn update_document_status(&self, doc_id: &Uuid, status: DocumentStatus) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "UPDATE documents SET status = ?2 WHERE id = ?1",
            params![doc_id.to_string(), status.as_str()],
        )
        .map_err(|e| Error::Database(format!("Failed to update document status: {}", e)))?;

        Ok(())
    }

    /// Attach index metadata to a document. `index_path` and `chunks` are
    /// written together with the `indexed` status in one statement, so a
    /// reader never observes one without the other.
    pub fn attach_index(&self, doc_id: &Uuid, index_path: &str, chunks: &[String]) -> Result<()> {
        let conn = self.conn.lock();

        let chunks_json = serde_json::to_string(chunks)?;

        conn.execute(
            "UPDATE documents SET index_path = ?2, chunks = ?3, status = ?4 WHERE id = ?1",
            params![
                doc_id.to_string(),
                index_path,
                chunks_json,
                DocumentStatus::Indexed.as_str(),
            ],
        )
        .map_err(|e| Error::Database(format!("Failed to attach index: {}", e)))?;

        Ok(())
    }

    /// Get a document scoped to its owner. Returns None for other users'
    /// documents, indistinguishable from absence.
    pub fn get_document_for_user(&self, doc_id: &Uuid, user_id: &Uuid) -> Result<Option<Document>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, filename, file_size, uploaded_at, text_content,
                        status, index_path, chunks
                 FROM documents WHERE id = ?1 AND user_id = ?2",
            )
            .map_err(|e| Error::Database(format!("Failed to prepare query: {}", e)))?;

        let doc = stmt
            .query_row(params![doc_id.to_string(), user_id.to_string()], row_to_document)
            .optional()
            .map_err(|e| Error::Database(format!("Failed to get document: {}", e)))?;

        Ok(doc)
    }

    /// List a user's documents, most recent first
    pub fn list_documents_for_user(&self, user_id: &Uuid) -> Result<Vec<Document>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, filename, file_size, uploaded_at, text_content,
                        status, index_path, chunks
                 FROM documents WHERE user_id = ?1
                 ORDER BY uploaded_at DESC, rowid DESC",
            )
            .map_err(|e| Error::Database(format!("Failed to prepare query: {}", e)))?;

        let docs = stmt
            .query_map(params![user_id.to_string()], row_to_document)
            .map_err(|e| Error::Database(format!("Failed to list documents: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(docs)
    }

    /// Delete a document scoped to its owner. Chat history cascades.
    /// Returns the deleted document so the caller can remove the index file.
    pub fn delete_document_for_user(
        &self,
        doc_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<Document>> {
        let doc = self.get_document_for_user(doc_id, user_id)?;

        if doc.is_some() {
            let conn = self.conn.lock();
            conn.execute(
                "DELETE FROM documents WHERE id = ?1 AND user_id = ?2",
                params![doc_id.to_string(), user_id.to_string()],
            )
            .map_err(|e| Error::Database(format!("Failed to delete document: {}", e)))?;
        }

        Ok(doc)
    }

    // ==================== Chat History Operations ====================

    /// Insert one question/answer exchange
    pub fn insert_chat_entry(&self, entry: &ChatEntry) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            r#"
            INSERT INTO chat_history (id, user_id, document_id, question, answer, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                entry.id.to_string(),
                entry.user_id.to_string(),
                entry.document_id.map(|id| id.to_string()),
                entry.question,
                entry.answer,
                entry.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::Database(format!("Failed to insert chat entry: {}", e)))?;

        Ok(())
    }

    /// Most recent exchanges for a document, newest first. The prompt
    /// builder reverses these into chronological order.
    pub fn recent_history(
        &self,
        user_id: &Uuid,
        document_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(
                "SELECT question, answer FROM chat_history
                 WHERE user_id = ?1 AND document_id = ?2
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?3",
            )
            .map_err(|e| Error::Database(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(
                params![user_id.to_string(), document_id.to_string(), limit as i64],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .map_err(|e| Error::Database(format!("Failed to load recent history: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(rows)
    }

    /// Full chat history for a user in chronological order, optionally
    /// filtered by document, with the document reference resolved.
    pub fn list_history(
        &self,
        user_id: &Uuid,
        document_id: Option<&Uuid>,
    ) -> Result<Vec<(ChatEntry, Option<DocumentRef>)>> {
        let conn = self.conn.lock();

        let sql = "SELECT c.id, c.user_id, c.document_id, c.question, c.answer, c.created_at,
                          d.filename
                   FROM chat_history c
                   LEFT JOIN documents d ON d.id = c.document_id
                   WHERE c.user_id = ?1
                     AND (?2 IS NULL OR c.document_id = ?2)
                   ORDER BY c.created_at ASC, c.rowid ASC";

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| Error::Database(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(
                params![user_id.to_string(), document_id.map(|id| id.to_string())],
                |row| {
                    let entry = row_to_chat_entry(row)?;
                    let filename: Option<String> = row.get(6)?;
                    let doc_ref = match (entry.document_id, filename) {
                        (Some(id), Some(filename)) => Some(DocumentRef { id, filename }),
                        _ => None,
                    };
                    Ok((entry, doc_ref))
                },
            )
            .map_err(|e| Error::Database(format!("Failed to list history: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(rows)
    }
}

// Row mapping helpers

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<UserRecord> {
    let id_str: String = row.get(0)?;
    let username: String = row.get(1)?;
    let password_hash: String = row.get(2)?;
    let created_at_str: String = row.get(3)?;

    Ok(UserRecord {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
        username,
        password_hash,
        created_at: parse_timestamp(&created_at_str),
    })
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<Document> {
    let id_str: String = row.get(0)?;
    let user_id_str: Option<String> = row.get(1)?;
    let filename: String = row.get(2)?;
    let file_size: i64 = row.get(3)?;
    let uploaded_at_str: String = row.get(4)?;
    let text_content: Option<String> = row.get(5)?;
    let status_str: String = row.get(6)?;
    let index_path: Option<String> = row.get(7)?;
    let chunks_json: Option<String> = row.get(8)?;

    Ok(Document {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
        user_id: user_id_str.and_then(|s| Uuid::parse_str(&s).ok()),
        filename,
        file_size: file_size as u64,
        uploaded_at: parse_timestamp(&uploaded_at_str),
        text_content,
        status: DocumentStatus::parse(&status_str),
        index_path,
        chunks: chunks_json.and_then(|j| serde_json::from_str(&j).ok()),
    })
}

fn row_to_chat_entry(row: &rusqlite::Row) -> rusqlite::Result<ChatEntry> {
    let id_str: String = row.get(0)?;
    let user_id_str: String = row.get(1)?;
    let document_id_str: Option<String> = row.get(2)?;
    let question: String = row.get(3)?;
    let answer: String = row.get(4)?;
    let created_at_str: String = row.get(5)?;

    Ok(ChatEntry {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
        user_id: Uuid::parse_str(&user_id_str).unwrap_or_else(|_| Uuid::new_v4()),
        document_id: document_id_str.and_then(|s| Uuid::parse_str(&s).ok()),
        question,
        answer,
        created_at: parse_timestamp(&created_at_str),
    })
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

//! Document upload, listing, and deletion endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::extract::extract_text;
use crate::index::ChunkIndex;
use crate::ingestion::TextChunker;
use crate::server::auth::AuthUser;
use crate::server::state::AppState;
use crate::types::chat::ChatEntry;
use crate::types::document::{Document, DocumentStatus};
use crate::types::response::{DocumentListResponse, DocumentSummary};

/// POST /api/upload - Upload and index a document
///
/// Pipeline: validate, extract, persist row, record the upload notification,
/// chunk, embed, write the index file, then attach index metadata to the row.
/// Validation happens before any side effect; a failure after the row exists
/// leaves the row at its last completed stage with no index metadata.
pub async fn upload_document(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentSummary>)> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::validation(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::validation("Uploaded file must have a filename"))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::validation(format!("Failed to read file: {}", e)))?;

        file = Some((filename, data.to_vec()));
    }

    let (filename, data) = file.ok_or_else(|| Error::validation("Missing 'file' field"))?;

    // Validate before touching storage
    let config = state.config();
    let extension = Document::extension(&filename);
    if !config.upload.allowed_extensions.iter().any(|e| e == &extension) {
        return Err(Error::validation(format!(
            "File type '.{}' is not allowed (allowed: {})",
            extension,
            config.upload.allowed_extensions.join(", ")
        )));
    }
    if data.len() > config.upload.max_upload_size {
        return Err(Error::validation(format!(
            "File exceeds the maximum upload size of {} bytes",
            config.upload.max_upload_size
        )));
    }

    tracing::info!(
        "Processing upload '{}' ({} bytes) for user '{}'",
        filename,
        data.len(),
        user.username
    );

    // Extraction never fails; an unparseable file yields empty text and the
    // pipeline continues with an empty chunk set
    let text = extract_text(&filename, &data);

    let mut doc = Document::new(user.id, filename.clone(), data.len() as u64);
    doc.text_content = Some(text.clone());
    doc.status = DocumentStatus::Extracted;
    state.db().insert_document(&doc)?;

    state
        .db()
        .insert_chat_entry(&ChatEntry::upload_notification(user.id, doc.id, &filename))?;

    let chunker = TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap);
    let chunks = chunker.chunk(&text);
    state.db().update_document_status(&doc.id, DocumentStatus::Chunked)?;

    // The index file must exist on disk before the row references it
    let index = ChunkIndex::build(state.embedder(), doc.id, &chunks).await?;
    let index_path = state.indexes().save(&index)?;
    state
        .db()
        .attach_index(&doc.id, &index_path.to_string_lossy(), &chunks)?;

    doc.status = DocumentStatus::Indexed;
    doc.index_path = Some(index_path.to_string_lossy().into_owned());
    doc.chunks = Some(chunks);

    tracing::info!(
        "Indexed '{}' as document {} ({} chunks)",
        filename,
        doc.id,
        doc.chunks.as_ref().map(|c| c.len()).unwrap_or(0)
    );

    Ok((StatusCode::CREATED, Json(DocumentSummary::from(&doc))))
}

/// GET /api/documents - List the caller's documents, most recent first
pub async fn list_documents(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DocumentListResponse>> {
    let documents: Vec<DocumentSummary> = state
        .db()
        .list_documents_for_user(&user.id)?
        .iter()
        .map(DocumentSummary::from)
        .collect();

    let total_count = documents.len();

    Ok(Json(DocumentListResponse {
        documents,
        total_count,
    }))
}

/// DELETE /api/documents/:id - Delete a document, its chat history, and its
/// persisted index file
pub async fn delete_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let doc = state
        .db()
        .delete_document_for_user(&id, &user.id)?
        .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;

    // Compensating action: the row is gone, now remove the index file
    state.indexes().remove(&id);

    tracing::info!("Deleted document '{}' ({})", doc.filename, id);

    Ok(Json(serde_json::json!({
        "success": true,
        "document_id": id,
        "filename": doc.filename,
    })))
}

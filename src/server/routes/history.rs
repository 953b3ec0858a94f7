//! Chat history endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::auth::AuthUser;
use crate::server::state::AppState;
use crate::types::request::HistoryQuery;
use crate::types::response::ChatEntryResponse;

/// GET /api/history?document_id= - The caller's chat history in
/// chronological order, optionally filtered by document
pub async fn list_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatEntryResponse>>> {
    // Filtering by a document the caller does not own is a 404, the same as
    // any other cross-user access
    if let Some(doc_id) = params.document_id {
        state
            .db()
            .get_document_for_user(&doc_id, &user.id)?
            .ok_or_else(|| Error::DocumentNotFound(doc_id.to_string()))?;
    }

    let entries = state
        .db()
        .list_history(&user.id, params.document_id.as_ref())?
        .iter()
        .map(|(entry, doc_ref)| ChatEntryResponse::from_entry(entry, doc_ref.clone()))
        .collect();

    Ok(Json(entries))
}

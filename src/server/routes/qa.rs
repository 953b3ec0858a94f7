//! Question answering endpoint

use axum::{extract::State, Json};
use std::path::Path;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::index::IndexStore;
use crate::server::auth::AuthUser;
use crate::server::state::AppState;
use crate::types::chat::ChatEntry;
use crate::types::request::AskRequest;
use crate::types::response::AnswerResponse;

/// POST /api/qa - Answer a question, optionally grounded in a document
///
/// With a document id: load the caller's document (cross-user access is a
/// 404), load its index, retrieve the top-k chunks, fetch the last-N
/// exchanges, build the grounded prompt, and generate. Without one: skip
/// retrieval and history and use the document-less prompt variant. Either
/// way the exchange is persisted before returning.
pub async fn ask(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<AskRequest>,
) -> Result<Json<AnswerResponse>> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(Error::validation("Question is required"));
    }

    tracing::info!("Question from '{}': \"{}\"", user.username, question);

    let answer = match request.document_id {
        Some(doc_id) => answer_with_document(&state, &user, doc_id, question).await?,
        None => answer_without_document(&state, question).await?,
    };

    state.db().insert_chat_entry(&ChatEntry::new(
        user.id,
        request.document_id,
        question.to_string(),
        answer.clone(),
    ))?;

    Ok(Json(AnswerResponse { answer }))
}

/// Retrieval-augmented answer against one document
async fn answer_with_document(
    state: &AppState,
    user: &AuthUser,
    doc_id: uuid::Uuid,
    question: &str,
) -> Result<String> {
    let doc = state
        .db()
        .get_document_for_user(&doc_id, &user.id)?
        .ok_or_else(|| Error::DocumentNotFound(doc_id.to_string()))?;

    // A crash mid-upload leaves a document with text but no index; that is
    // an explicit state, not an internal error
    if !doc.is_indexed() {
        return Err(Error::IndexUnavailable(doc_id.to_string()));
    }
    let index_path = doc
        .index_path
        .as_ref()
        .ok_or_else(|| Error::IndexUnavailable(doc_id.to_string()))?;

    let index = IndexStore::load_from(Path::new(index_path), &doc_id)?;

    let retrieval = &state.config().retrieval;
    let query_embedding = state.embedder().embed(question).await?;
    let retrieved = index.retrieve(&query_embedding, retrieval.top_k);
    let chunks: Vec<String> = retrieved.into_iter().map(|s| s.content).collect();

    // Stored newest-first; the prompt wants oldest-first
    let mut history = state
        .db()
        .recent_history(&user.id, &doc_id, retrieval.history_window)?;
    history.reverse();

    let prompt = PromptBuilder::document_prompt(&chunks, &history, question);
    state.llm().generate(&prompt).await
}

/// Document-less answer: ask the model to prompt the user to upload
async fn answer_without_document(state: &AppState, question: &str) -> Result<String> {
    let prompt = PromptBuilder::general_prompt(question);
    state.llm().generate(&prompt).await
}

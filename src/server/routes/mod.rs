//! API routes for the Q&A server

pub mod accounts;
pub mod documents;
pub mod history;
pub mod qa;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        // Documents - upload gets a larger body limit for multipart
        .route(
            "/upload",
            post(documents::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/documents", get(documents::list_documents))
        .route("/documents/:id", delete(documents::delete_document))
        // Question answering
        .route("/qa", post(qa::ask))
        // Chat history
        .route("/history", get(history::list_history))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "docqa",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document Q&A backend with per-document vector indexes",
        "endpoints": {
            "POST /api/register": "Register and receive an API token",
            "POST /api/login": "Log in and receive an API token",
            "POST /api/upload": "Upload a document (multipart 'file' field)",
            "GET /api/documents": "List your documents",
            "DELETE /api/documents/:id": "Delete a document and its index",
            "POST /api/qa": "Ask a question, optionally against a document",
            "GET /api/history": "List your chat history"
        }
    }))
}

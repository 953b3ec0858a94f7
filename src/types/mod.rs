//! Core data types for documents, chat history, and the HTTP API

pub mod chat;
pub mod document;
pub mod request;
pub mod response;

pub use chat::ChatEntry;
pub use document::{Document, DocumentStatus};
pub use request::{AskRequest, CredentialsRequest, HistoryQuery};
pub use response::{
    AnswerResponse, ChatEntryResponse, DocumentListResponse, DocumentRef, DocumentSummary,
    TokenResponse,
};

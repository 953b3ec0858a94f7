//! Persistent storage for users, tokens, documents, and chat history

pub mod database;

pub use database::{Database, UserRecord};

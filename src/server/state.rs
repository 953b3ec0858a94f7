//! Application state for the Q&A server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::index::IndexStore;
use crate::providers::{EmbeddingProvider, GeminiClient, LlmProvider};
use crate::storage::Database;

/// Shared application state, constructed once at startup and injected into
/// every handler. The API clients live for the whole process rather than
/// being rebuilt per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// SQLite storage
    db: Database,
    /// Per-document index files
    indexes: IndexStore,
    /// Embedding provider
    embedder: Arc<dyn EmbeddingProvider>,
    /// LLM provider
    llm: Arc<dyn LlmProvider>,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let db = Database::new(config.storage.database_path())?;
        tracing::info!("Database opened at {}", config.storage.database_path().display());

        let indexes = IndexStore::new(config.storage.index_dir())?;
        tracing::info!("Index store at {}", config.storage.index_dir().display());

        let gemini = Arc::new(GeminiClient::new(&config.llm));
        tracing::info!(
            "Gemini client initialized (embed: {}, generate: {})",
            config.llm.embed_model,
            config.llm.generate_model
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                indexes,
                embedder: gemini.clone(),
                llm: gemini,
                ready: RwLock::new(true),
            }),
        })
    }

    /// Build state with explicit providers (used by tests)
    #[cfg(test)]
    pub fn with_providers(
        config: AppConfig,
        db: Database,
        indexes: IndexStore,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                indexes,
                embedder,
                llm,
                ready: RwLock::new(true),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the database
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// Get the index store
    pub fn indexes(&self) -> &IndexStore {
        &self.inner.indexes
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get the LLM provider
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}

//! Per-document vector index: build, persist, load, retrieve
//!
//! Each document gets one index file on disk, keyed by document ID. The
//! index holds every chunk's text and embedding; retrieval is cosine
//! similarity over the stored vectors, highest first, ties broken by chunk
//! position so repeated calls return identical orderings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

/// One embedded chunk inside an index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    /// Chunk position within the document
    pub position: u32,
    /// Chunk text
    pub content: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
}

/// A searchable index over one document's chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkIndex {
    /// Document this index belongs to
    pub document_id: Uuid,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Embedded chunks, in document order
    pub entries: Vec<IndexedChunk>,
}

/// A retrieved chunk with its similarity to the query
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Chunk position within the document
    pub position: u32,
    /// Chunk text
    pub content: String,
    /// Cosine similarity to the query (higher is more similar)
    pub similarity: f32,
}

impl ChunkIndex {
    /// Embed every chunk and build the index. An empty chunk sequence
    /// produces an index with zero entries rather than an error.
    pub async fn build(
        embedder: &Arc<dyn EmbeddingProvider>,
        document_id: Uuid,
        chunks: &[String],
    ) -> Result<Self> {
        let embeddings = if chunks.is_empty() {
            Vec::new()
        } else {
            embedder.embed_batch(chunks).await?
        };

        let entries = chunks
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (content, embedding))| IndexedChunk {
                position: i as u32,
                content: content.clone(),
                embedding,
            })
            .collect();

        Ok(Self {
            document_id,
            dimensions: embedder.dimensions(),
            entries,
        })
    }

    /// Retrieve the `k` chunks most similar to the query embedding,
    /// highest similarity first. Deterministic for a fixed index and query.
    pub fn retrieve(&self, query_embedding: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                position: entry.position,
                content: entry.content.clone(),
                similarity: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity between two vectors; zero-norm vectors score 0.0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Filesystem store for persisted indexes, one file per document
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    /// Create the store, ensuring the directory exists
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Deterministic location of a document's index file
    pub fn path_for(&self, document_id: &Uuid) -> PathBuf {
        self.dir.join(format!("document_{}.index.json", document_id))
    }

    /// Persist an index, returning its location. The file is fully written
    /// before the caller attaches the path to the document row.
    pub fn save(&self, index: &ChunkIndex) -> Result<PathBuf> {
        let path = self.path_for(&index.document_id);
        let content = serde_json::to_string(index)?;
        std::fs::write(&path, content)?;

        tracing::info!(
            "Persisted index for document {} ({} chunks) at {}",
            index.document_id,
            index.entries.len(),
            path.display()
        );

        Ok(path)
    }

    /// Load a document's index from its persisted location
    pub fn load(&self, document_id: &Uuid) -> Result<ChunkIndex> {
        let path = self.path_for(document_id);
        Self::load_from(&path, document_id)
    }

    /// Load an index from an explicit path (the one stored on the row)
    pub fn load_from(path: &Path, document_id: &Uuid) -> Result<ChunkIndex> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::IndexUnavailable(document_id.to_string()))?;

        serde_json::from_str(&content).map_err(|e| {
            tracing::error!("Corrupt index file {}: {}", path.display(), e);
            Error::IndexUnavailable(document_id.to_string())
        })
    }

    /// Remove a document's index file. Missing files are fine: deletion is a
    /// compensating action after the row is gone.
    pub fn remove(&self, document_id: &Uuid) {
        let path = self.path_for(document_id);
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::info!("Removed index file {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No index file to remove for document {}", document_id);
            }
            Err(e) => tracing::warn!("Failed to remove index file {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::StubEmbedder;

    fn test_index(chunks: &[&str]) -> ChunkIndex {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(StubEmbedder::new(8));
        let chunks: Vec<String> = chunks.iter().map(|s| s.to_string()).collect();
        tokio_test::block_on(ChunkIndex::build(&embedder, Uuid::new_v4(), &chunks)).unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_empty_chunk_set_builds_empty_index() {
        let index = test_index(&[]);
        assert!(index.entries.is_empty());
        assert!(index.retrieve(&[1.0; 8], 5).is_empty());
    }

    #[test]
    fn test_retrieve_is_deterministic() {
        let index = test_index(&["alpha", "beta", "gamma", "delta"]);
        let embedder = StubEmbedder::new(8);
        let query = embedder.embed_sync("beta");

        let first = index.retrieve(&query, 3);
        let second = index.retrieve(&query, 3);

        assert_eq!(first.len(), 3);
        let positions: Vec<u32> = first.iter().map(|s| s.position).collect();
        assert_eq!(positions, second.iter().map(|s| s.position).collect::<Vec<_>>());
        // The chunk identical to the query is the best match
        assert_eq!(first[0].content, "beta");
    }

    #[test]
    fn test_retrieve_orders_by_similarity() {
        let index = test_index(&["one", "two", "three"]);
        let embedder = StubEmbedder::new(8);
        let results = index.retrieve(&embedder.embed_sync("three"), 3);

        assert_eq!(results[0].content, "three");
        for pair in results.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();

        let index = test_index(&["persisted", "chunks"]);
        let path = store.save(&index).unwrap();
        assert!(path.exists());

        let loaded = store.load(&index.document_id).unwrap();
        assert_eq!(loaded.document_id, index.document_id);
        assert_eq!(loaded.entries.len(), 2);
        assert_eq!(loaded.entries[0].content, "persisted");
    }

    #[test]
    fn test_load_missing_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();

        let err = store.load(&Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::IndexUnavailable(_)));
    }

    #[test]
    fn test_load_corrupt_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();

        let doc_id = Uuid::new_v4();
        std::fs::write(store.path_for(&doc_id), "not json").unwrap();

        let err = store.load(&doc_id).unwrap_err();
        assert!(matches!(err, Error::IndexUnavailable(_)));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();

        let index = test_index(&["gone"]);
        store.save(&index).unwrap();
        store.remove(&index.document_id);
        assert!(!store.path_for(&index.document_id).exists());
        // Second removal is a no-op
        store.remove(&index.document_id);
    }
}

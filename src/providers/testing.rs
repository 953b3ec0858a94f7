//! Deterministic provider stubs for tests

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::Result;

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Embedder producing a deterministic pseudo-random unit-free vector per
/// text: identical inputs always embed identically, distinct inputs land on
/// distinct vectors. No network involved.
pub struct StubEmbedder {
    dimensions: usize,
}

impl StubEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Synchronous embedding, handy inside non-async tests
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut values = Vec::with_capacity(self.dimensions);
        let mut counter = 0u32;

        while values.len() < self.dimensions {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            hasher.update(counter.to_le_bytes());
            let digest = hasher.finalize();

            for byte in digest {
                if values.len() == self.dimensions {
                    break;
                }
                // Map each byte to [-1.0, 1.0]
                values.push(byte as f32 / 127.5 - 1.0);
            }
            counter += 1;
        }

        values
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// LLM stub that echoes a canned answer
pub struct StubLlm {
    pub answer: String,
}

#[async_trait]
impl LlmProvider for StubLlm {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.answer.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::cosine_similarity;

    #[test]
    fn test_embeddings_are_deterministic() {
        let embedder = StubEmbedder::new(16);
        assert_eq!(embedder.embed_sync("hello"), embedder.embed_sync("hello"));
        assert_ne!(embedder.embed_sync("hello"), embedder.embed_sync("world"));
    }

    #[test]
    fn test_identical_text_has_maximal_similarity() {
        let embedder = StubEmbedder::new(16);
        let a = embedder.embed_sync("same text");
        let b = embedder.embed_sync("same text");
        let c = embedder.embed_sync("other text");

        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &c) < 1.0 - 1e-6);
    }
}

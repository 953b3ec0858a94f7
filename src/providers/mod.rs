//! Provider abstractions over the hosted embedding and generation services

pub mod embedding;
pub mod gemini;
pub mod llm;

#[cfg(test)]
pub mod testing;

pub use embedding::EmbeddingProvider;
pub use gemini::GeminiClient;
pub use llm::LlmProvider;

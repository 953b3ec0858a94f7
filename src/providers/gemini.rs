//! Gemini client for embeddings and answer generation
//!
//! Talks to the Generative Language REST API with an API key. Requests and
//! responses are typed serde structs; the answer is extracted from the
//! structured response, never recovered from a stringified object. Transient
//! upstream failures (connect errors, 429, 5xx) are retried with bounded
//! exponential backoff before surfacing as a gateway error.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Base delay for retry backoff; attempt n waits 250ms * 2^n
const RETRY_BASE_DELAY_MS: u64 = 250;

/// Client for the Generative Language API, shared process-wide
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    embed_model: String,
    generate_model: String,
    dimensions: usize,
    temperature: f32,
    max_output_tokens: u32,
    max_retries: u32,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            embed_model: config.embed_model.clone(),
            generate_model: config.generate_model.clone(),
            dimensions: config.dimensions,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            max_retries: config.max_retries,
        }
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.base_url, model, method, self.api_key
        )
    }

    /// POST a JSON body, retrying transient failures with backoff.
    /// Non-retryable failures and exhausted retries map through `on_error`.
    async fn post_with_retry<B, F>(
        &self,
        url: &str,
        body: &B,
        on_error: F,
    ) -> Result<reqwest::Response>
    where
        B: serde::Serialize,
        F: Fn(String) -> Error,
    {
        let mut attempt = 0u32;

        loop {
            match self.client.post(url).json(body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let retryable =
                        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
                    if retryable && attempt < self.max_retries {
                        self.backoff(attempt).await;
                        attempt += 1;
                        continue;
                    }

                    let detail = response.text().await.unwrap_or_default();
                    return Err(on_error(format!("HTTP {}: {}", status, detail)));
                }
                Err(e) => {
                    if (e.is_connect() || e.is_timeout()) && attempt < self.max_retries {
                        self.backoff(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(on_error(e.to_string()));
                }
            }
        }
    }

    async fn backoff(&self, attempt: u32) {
        let delay = Duration::from_millis(RETRY_BASE_DELAY_MS << attempt);
        tracing::warn!(
            "Upstream request failed (attempt {}/{}), retrying in {:?}",
            attempt + 1,
            self.max_retries + 1,
            delay
        );
        tokio::time::sleep(delay).await;
    }
}

#[derive(serde::Serialize)]
struct EmbedRequest {
    content: RequestContent,
}

#[derive(serde::Serialize)]
struct BatchEmbedRequest {
    requests: Vec<BatchEmbedItem>,
}

#[derive(serde::Serialize)]
struct BatchEmbedItem {
    model: String,
    content: RequestContent,
}

#[derive(serde::Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(serde::Serialize)]
struct RequestPart {
    text: String,
}

impl RequestContent {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![RequestPart {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(serde::Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(serde::Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(serde::Serialize)]
struct GenerateRequest {
    contents: Vec<GenerateContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct GenerateContent {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Normalize a generation response to a single plain string: the
/// concatenated text parts of the first candidate.
fn extract_answer(response: GenerateResponse) -> Option<String> {
    let candidate = response.candidates.into_iter().next()?;
    let answer: String = candidate
        .content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect();

    if answer.is_empty() {
        None
    } else {
        Some(answer)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.endpoint(&self.embed_model, "embedContent");
        let request = EmbedRequest {
            content: RequestContent::text(text),
        };

        let response = self
            .post_with_retry(&url, &request, Error::Embedding)
            .await?;

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse embedding response: {}", e)))?;

        Ok(embed_response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint(&self.embed_model, "batchEmbedContents");
        let mut all_embeddings = Vec::with_capacity(texts.len());

        // The API accepts up to 100 contents per batch request
        for batch in texts.chunks(100) {
            let request = BatchEmbedRequest {
                requests: batch
                    .iter()
                    .map(|t| BatchEmbedItem {
                        model: format!("models/{}", self.embed_model),
                        content: RequestContent::text(t),
                    })
                    .collect(),
            };

            let response = self
                .post_with_retry(&url, &request, Error::Embedding)
                .await?;

            let batch_response: BatchEmbedResponse = response.json().await.map_err(|e| {
                Error::Embedding(format!("Failed to parse batch embedding response: {}", e))
            })?;

            if batch_response.embeddings.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    batch_response.embeddings.len()
                )));
            }

            all_embeddings.extend(batch_response.embeddings.into_iter().map(|e| e.values));
        }

        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models?key={}", self.base_url, self.api_key);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint(&self.generate_model, "generateContent");
        let request = GenerateRequest {
            contents: vec![GenerateContent {
                role: "user".to_string(),
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .post_with_retry(&url, &request, Error::Generation)
            .await?;

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Failed to parse generation response: {}", e)))?;

        extract_answer(gen_response)
            .ok_or_else(|| Error::Generation("No text in generation response".to_string()))
    }

    async fn health_check(&self) -> Result<bool> {
        EmbeddingProvider::health_check(self).await
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.generate_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_answer_from_structured_response() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "The capital of France is "}, {"text": "Paris."}], "role": "model"}}
            ]
        }"#;

        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            extract_answer(response).unwrap(),
            "The capital of France is Paris."
        );
    }

    #[test]
    fn test_extract_answer_empty_candidates() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(extract_answer(response).is_none());

        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_answer(response).is_none());
    }

    #[test]
    fn test_endpoint_format() {
        let mut config = LlmConfig::default();
        config.base_url = "https://example.test/v1beta/".to_string();
        config.api_key = "secret".to_string();
        let client = GeminiClient::new(&config);

        assert_eq!(
            client.endpoint("embedding-001", "embedContent"),
            "https://example.test/v1beta/models/embedding-001:embedContent?key=secret"
        );
    }

    #[test]
    fn test_embed_response_parsing() {
        let json = r#"{"embedding": {"values": [0.1, -0.2, 0.3]}}"#;
        let response: EmbedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.embedding.values, vec![0.1, -0.2, 0.3]);
    }
}

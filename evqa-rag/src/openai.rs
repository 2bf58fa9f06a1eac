//! OpenAI-compatible embedding and chat backends.
//!
//! This module is only available when the `openai` feature is enabled. Both
//! backends honor a custom base URL, so any server speaking the OpenAI REST
//! dialect (a local LM Studio or vLLM instance, for example) can stand in.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::QaConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::CompletionModel;

/// The default OpenAI API base.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Placeholder some `.env` templates ship with.
const PLACEHOLDER_KEY: &str = "YOUR_API_KEY_HERE";

/// Prompt budget for chat models, in characters.
const DEFAULT_INPUT_LIMIT: usize = 32_000;

/// Native output size of well-known embedding models.
pub fn known_dimensions(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-large" => Some(3072),
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        _ => None,
    }
}

/// Validate an API key, rejecting blanks and template placeholders.
///
/// # Errors
///
/// Returns [`RagError::Configuration`] for an unusable key.
pub fn validate_api_key(api_key: &str) -> Result<()> {
    let key = api_key.trim();
    if key.is_empty() || key == PLACEHOLDER_KEY {
        return Err(RagError::Configuration(format!(
            "{API_KEY_VAR} is missing; add it to the environment or the .env file"
        )));
    }
    Ok(())
}

/// Read and validate the API key from the environment.
pub fn api_key_from_env() -> Result<String> {
    let key = std::env::var(API_KEY_VAR).unwrap_or_default();
    validate_api_key(&key)?;
    Ok(key)
}

/// Join `base` and `path`, tolerating a trailing slash on either side.
fn endpoint(base: Option<&str>, path: &str) -> String {
    let base = base.unwrap_or(OPENAI_API_BASE).trim_end_matches('/');
    if base.ends_with(path) {
        base.to_string()
    } else {
        format!("{base}/{}", path.trim_start_matches('/'))
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RagError::Configuration(format!("failed to create HTTP client: {e}")))
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull the human-readable message out of an API error body.
fn error_detail(body: String) -> String {
    serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body)
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the `/embeddings` endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use evqa_rag::openai::OpenAIEmbeddingProvider;
///
/// let provider = OpenAIEmbeddingProvider::new("sk-...")?
///     .with_model("text-embedding-3-small");
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
}

impl OpenAIEmbeddingProvider {
    /// Create a provider for `text-embedding-3-small` on the public API.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] for a blank or placeholder key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        validate_api_key(&api_key)?;
        Ok(Self {
            client: http_client(Duration::from_secs(60))?,
            api_key,
            url: endpoint(None, "embeddings"),
            model: "text-embedding-3-small".into(),
            dimensions: 1536,
            request_dimensions: None,
        })
    }

    /// Create a provider from a [`QaConfig`] and an API key.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] for an unusable key, or when the
    /// model's output size is unknown and `embedding_dimensions` is unset.
    pub fn from_config(config: &QaConfig, api_key: impl Into<String>) -> Result<Self> {
        let mut provider = Self::new(api_key)?.with_model(&config.embedding_model);
        provider.client = http_client(config.request_timeout())?;
        provider.url = endpoint(config.api_base_url.as_deref(), "embeddings");

        match (config.embedding_dimensions, known_dimensions(&config.embedding_model)) {
            (Some(dims), _) => Ok(provider.with_dimensions(dims)),
            (None, Some(dims)) => {
                provider.dimensions = dims;
                Ok(provider)
            }
            (None, None) => Err(RagError::Configuration(format!(
                "unknown output size for embedding model '{}'; set EVQA_EMBEDDING_DIMENSIONS",
                config.embedding_model
            ))),
        }
    }

    /// Set the model name. Updates the dimensionality for known models.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        if let Some(dims) = known_dimensions(&self.model) {
            self.dimensions = dims;
        }
        self
    }

    /// Set the output dimensions (Matryoshka support).
    ///
    /// The API returns embeddings truncated to this size.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }

    fn unavailable(&self, message: String) -> RagError {
        RagError::EmbeddingUnavailable { provider: "OpenAI".into(), message }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "OpenAI", text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| self.unavailable("API returned empty response".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "OpenAI",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "request failed");
                self.unavailable(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "OpenAI", %status, "API error");
            return Err(self.unavailable(format!("API returned {status}: {}", error_detail(body))));
        }

        let mut parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse response");
            self.unavailable(format!("failed to parse response: {e}"))
        })?;

        // The API documents `data` in input order; sort on `index` when present anyway.
        parsed.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ── Chat completions ───────────────────────────────────────────────

/// A [`CompletionModel`] backed by the `/chat/completions` endpoint.
pub struct OpenAIChatModel {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
    temperature: f32,
    input_limit: usize,
}

impl OpenAIChatModel {
    /// Create a chat model from a [`QaConfig`] and an API key.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] for an unusable key.
    pub fn from_config(config: &QaConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        validate_api_key(&api_key)?;
        Ok(Self {
            client: http_client(config.request_timeout())?,
            api_key,
            url: endpoint(config.api_base_url.as_deref(), "chat/completions"),
            model: config.generation_model.clone(),
            temperature: 0.0,
            input_limit: DEFAULT_INPUT_LIMIT,
        })
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the prompt budget in characters.
    pub fn with_input_limit(mut self, limit: usize) -> Self {
        self.input_limit = limit;
        self
    }

    fn unavailable(&self, message: String) -> RagError {
        RagError::GenerationUnavailable { provider: "OpenAI".into(), message }
    }
}

#[async_trait]
impl CompletionModel for OpenAIChatModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "chat request failed");
                self.unavailable(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "OpenAI", %status, "chat API error");
            return Err(self.unavailable(format!("API returned {status}: {}", error_detail(body))));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| self.unavailable(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| self.unavailable("response contained no message content".into()))
    }

    fn input_limit(&self) -> usize {
        self.input_limit
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_path() {
        assert_eq!(endpoint(None, "embeddings"), "https://api.openai.com/v1/embeddings");
        assert_eq!(
            endpoint(Some("http://localhost:1234/v1/"), "chat/completions"),
            "http://localhost:1234/v1/chat/completions"
        );
        assert_eq!(
            endpoint(Some("http://proxy/v1/chat/completions"), "chat/completions"),
            "http://proxy/v1/chat/completions"
        );
    }

    #[test]
    fn placeholder_and_blank_keys_are_rejected() {
        assert!(matches!(validate_api_key(""), Err(RagError::Configuration(_))));
        assert!(matches!(validate_api_key("YOUR_API_KEY_HERE"), Err(RagError::Configuration(_))));
        assert!(validate_api_key("sk-test").is_ok());
    }

    #[test]
    fn unknown_model_needs_explicit_dimensions() {
        let config = QaConfig::builder().embedding_model("nomic-embed-text").build().unwrap();
        assert!(OpenAIEmbeddingProvider::from_config(&config, "sk-test").is_err());

        let config = QaConfig::builder()
            .embedding_model("nomic-embed-text")
            .embedding_dimensions(768)
            .build()
            .unwrap();
        let provider = OpenAIEmbeddingProvider::from_config(&config, "sk-test").unwrap();
        assert_eq!(provider.dimensions(), 768);
    }

    #[test]
    fn default_model_size_is_known() {
        let provider =
            OpenAIEmbeddingProvider::from_config(&QaConfig::default(), "sk-test").unwrap();
        assert_eq!(provider.dimensions(), 3072);
    }

    #[test]
    fn api_error_body_is_unwrapped() {
        let body = r#"{"error":{"message":"Incorrect API key provided"}}"#.to_string();
        assert_eq!(error_detail(body), "Incorrect API key provided");
        assert_eq!(error_detail("plain".to_string()), "plain");
    }
}

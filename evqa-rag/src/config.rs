//! Configuration for the question-answering pipeline.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default embedding model name.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// Default generation model name.
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";

/// Configuration parameters for the QA pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaConfig {
    /// Model used to embed segments and questions.
    pub embedding_model: String,
    /// Embedding size to request from the API. Needed for models whose
    /// native size is not known to the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_dimensions: Option<usize>,
    /// Model used to generate answers.
    pub generation_model: String,
    /// Optional base URL for an OpenAI-compatible API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of segments retrieved per question.
    pub retrieval_k: usize,
    /// Upper bound on each embedding or generation call, in seconds.
    pub request_timeout_secs: u64,
    /// Number of segment texts sent per embedding call while building.
    pub embed_batch_size: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimensions: None,
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            api_base_url: None,
            chunk_size: 1000,
            chunk_overlap: 200,
            retrieval_k: 2,
            request_timeout_secs: 60,
            embed_batch_size: 64,
        }
    }
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }

    /// The per-call timeout applied to external capabilities.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build a configuration from process environment variables.
    ///
    /// Unset variables keep their defaults. See [`QaConfig::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Recognized keys: `EVQA_EMBEDDING_MODEL`, `EVQA_EMBEDDING_DIMENSIONS`,
    /// `EVQA_GENERATION_MODEL`, `OPENAI_BASE_URL`, `EVQA_CHUNK_SIZE`,
    /// `EVQA_CHUNK_OVERLAP`, `EVQA_RETRIEVAL_K`, `EVQA_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if a numeric value does not parse
    /// or the resulting configuration fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut builder = QaConfig::builder();

        if let Some(model) = value("EVQA_EMBEDDING_MODEL") {
            builder = builder.embedding_model(model);
        }
        if let Some(dims) = value("EVQA_EMBEDDING_DIMENSIONS") {
            builder =
                builder.embedding_dimensions(parse_number("EVQA_EMBEDDING_DIMENSIONS", &dims)?);
        }
        if let Some(model) = value("EVQA_GENERATION_MODEL") {
            builder = builder.generation_model(model);
        }
        if let Some(url) = value("OPENAI_BASE_URL") {
            builder = builder.api_base_url(url);
        }
        if let Some(size) = value("EVQA_CHUNK_SIZE") {
            builder = builder.chunk_size(parse_number("EVQA_CHUNK_SIZE", &size)?);
        }
        if let Some(overlap) = value("EVQA_CHUNK_OVERLAP") {
            builder = builder.chunk_overlap(parse_number("EVQA_CHUNK_OVERLAP", &overlap)?);
        }
        if let Some(k) = value("EVQA_RETRIEVAL_K") {
            builder = builder.retrieval_k(parse_number("EVQA_RETRIEVAL_K", &k)?);
        }
        if let Some(secs) = value("EVQA_TIMEOUT_SECS") {
            builder = builder.request_timeout_secs(parse_number("EVQA_TIMEOUT_SECS", &secs)?);
        }

        builder.build()
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse::<T>().map_err(|_| {
        RagError::Configuration(format!("{key} must be a non-negative integer, got '{raw}'"))
    })
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone, Default)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    /// Set the embedding model name.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Request embeddings of a specific size.
    pub fn embedding_dimensions(mut self, dims: usize) -> Self {
        self.config.embedding_dimensions = Some(dims);
        self
    }

    /// Set the generation model name.
    pub fn generation_model(mut self, model: impl Into<String>) -> Self {
        self.config.generation_model = model.into();
        self
    }

    /// Point the backends at an OpenAI-compatible API.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = Some(url.into());
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of segments retrieved per question.
    pub fn retrieval_k(mut self, k: usize) -> Self {
        self.config.retrieval_k = k;
        self
    }

    /// Set the per-call timeout in seconds.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// Set how many texts are embedded per call while building.
    pub fn embed_batch_size(mut self, size: usize) -> Self {
        self.config.embed_batch_size = size;
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if:
    /// - `chunk_size == 0` or `chunk_overlap >= chunk_size`
    /// - `retrieval_k == 0`
    /// - `request_timeout_secs`, `embed_batch_size` or `embedding_dimensions` is zero
    /// - either model name is blank
    pub fn build(self) -> Result<QaConfig> {
        let config = self.config;
        if config.chunk_size == 0 {
            return Err(RagError::Configuration("chunk_size must be greater than zero".to_string()));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.retrieval_k == 0 {
            return Err(RagError::Configuration(
                "retrieval_k must be greater than zero".to_string(),
            ));
        }
        if config.request_timeout_secs == 0 {
            return Err(RagError::Configuration(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if config.embed_batch_size == 0 {
            return Err(RagError::Configuration(
                "embed_batch_size must be greater than zero".to_string(),
            ));
        }
        if config.embedding_dimensions == Some(0) {
            return Err(RagError::Configuration(
                "embedding_dimensions must be greater than zero".to_string(),
            ));
        }
        if config.embedding_model.trim().is_empty() || config.generation_model.trim().is_empty() {
            return Err(RagError::Configuration("model names must not be blank".to_string()));
        }
        Ok(config)
    }
}

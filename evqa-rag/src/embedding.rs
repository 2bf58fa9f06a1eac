//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap a concrete embedding backend behind a unified async
/// interface. Output must be deterministic for a fixed model configuration,
/// but callers must not assume vectors stay stable across model upgrades.
///
/// Failures are reported as
/// [`RagError::EmbeddingUnavailable`](crate::RagError::EmbeddingUnavailable).
/// Providers do not retry.
///
/// # Example
///
/// ```rust,ignore
/// use evqa_rag::EmbeddingProvider;
///
/// let embedding = provider.embed("What is the range of the Model 3?").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The result has the same length and order as `texts`. The default
    /// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
    /// backends with native batching should override it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// A short name used in logs and error messages.
    fn name(&self) -> &str {
        "embedder"
    }
}

//! Question-to-segments retrieval.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::document::{ScoredSegment, Segment};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// Embeds a question and looks up the nearest segments in a [`VectorIndex`].
///
/// Cloning is cheap; clones share the embedder and index.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    timeout: Duration,
}

impl Retriever {
    /// Create a retriever. `timeout` bounds each embedding call.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        timeout: Duration,
    ) -> Self {
        Self { embedder, index, timeout }
    }

    /// Return the `k` segments most similar to `question`, most similar first.
    ///
    /// # Errors
    ///
    /// Propagates [`RagError::EmbeddingUnavailable`] from the embedder,
    /// including timeouts.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<Segment>> {
        Ok(self.retrieve_scored(question, k).await?.into_iter().map(|hit| hit.segment).collect())
    }

    /// Like [`retrieve`](Retriever::retrieve) but keeps similarity scores.
    ///
    /// An empty index yields an empty result without contacting the embedder.
    pub async fn retrieve_scored(&self, question: &str, k: usize) -> Result<Vec<ScoredSegment>> {
        if self.index.is_empty().await {
            debug!("index is empty, nothing to retrieve");
            return Ok(Vec::new());
        }

        let embedding = embed_with_timeout(self.embedder.as_ref(), question, self.timeout).await?;
        let hits = self.index.query(&embedding, k).await.inspect_err(|e| {
            error!(error = %e, "index query failed");
        })?;

        let top_score = hits.first().map(|h| h.score);
        debug!(k, result_count = hits.len(), top_score, "retrieved");
        Ok(hits)
    }
}

/// Embed one text, mapping an elapsed `timeout` to `EmbeddingUnavailable`.
pub(crate) async fn embed_with_timeout(
    embedder: &dyn EmbeddingProvider,
    text: &str,
    timeout: Duration,
) -> Result<Vec<f32>> {
    match tokio::time::timeout(timeout, embedder.embed(text)).await {
        Ok(Ok(embedding)) if embedding.iter().any(|v| !v.is_finite()) => {
            error!(provider = embedder.name(), "question embedding has non-finite values");
            Err(RagError::EmbeddingUnavailable {
                provider: embedder.name().to_string(),
                message: "question embedded with non-finite values".to_string(),
            })
        }
        Ok(result) => result,
        Err(_) => {
            error!(provider = embedder.name(), ?timeout, "embedding timed out");
            Err(RagError::EmbeddingUnavailable {
                provider: embedder.name().to_string(),
                message: format!("timed out after {timeout:?}"),
            })
        }
    }
}

/// Embed a batch, mapping an elapsed `timeout` to `EmbeddingUnavailable`.
pub(crate) async fn embed_batch_with_timeout(
    embedder: &dyn EmbeddingProvider,
    texts: &[&str],
    timeout: Duration,
) -> Result<Vec<Vec<f32>>> {
    match tokio::time::timeout(timeout, embedder.embed_batch(texts)).await {
        Ok(result) => result,
        Err(_) => {
            error!(
                provider = embedder.name(),
                batch_size = texts.len(),
                ?timeout,
                "embedding timed out"
            );
            Err(RagError::EmbeddingUnavailable {
                provider: embedder.name().to_string(),
                message: format!("batch of {} timed out after {timeout:?}", texts.len()),
            })
        }
    }
}

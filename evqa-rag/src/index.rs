//! Vector index trait for nearest-neighbour search over embedded segments.

use async_trait::async_trait;

use crate::document::{EmbeddedSegment, ScoredSegment};
use crate::error::Result;

/// A similarity index over [`EmbeddedSegment`]s.
///
/// The index is built once in bulk and only read afterwards, so concurrent
/// queries never contend with writers.
///
/// # Example
///
/// ```rust,ignore
/// use evqa_rag::{InMemoryIndex, VectorIndex};
///
/// let index = InMemoryIndex::new();
/// index.build(embedded_segments).await?;
/// let hits = index.query(&question_embedding, 2).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replace the index contents with `segments`.
    ///
    /// All embeddings must share one dimensionality.
    async fn build(&self, segments: Vec<EmbeddedSegment>) -> Result<()>;

    /// Return at most `k` segments most similar to `embedding`.
    ///
    /// Results are ordered by descending score; ties keep a fixed,
    /// implementation-defined order. `k` larger than the index returns every
    /// segment. `k == 0` is an error.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredSegment>>;

    /// Number of indexed segments.
    async fn len(&self) -> usize;

    /// Whether the index holds no segments.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

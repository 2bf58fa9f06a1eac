//! In-memory vector index using cosine similarity.
//!
//! This module provides [`InMemoryIndex`], a brute-force index backed by a
//! `Vec` protected by a `tokio::sync::RwLock`. Exact search over a few
//! thousand vehicle rows is fast enough that no approximate structure is
//! needed.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{EmbeddedSegment, ScoredSegment};
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

const BACKEND: &str = "InMemory";

/// An in-memory vector index using cosine similarity for search.
///
/// Segments keep their build order, which also breaks score ties.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    segments: RwLock<Vec<EmbeddedSegment>>,
}

impl InMemoryIndex {
    /// Create a new empty in-memory index.
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_finite(embedding: &[f32]) -> bool {
    embedding.iter().all(|v| v.is_finite())
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn build(&self, segments: Vec<EmbeddedSegment>) -> Result<()> {
        if let Some(first) = segments.first() {
            let dimensions = first.embedding.len();
            if let Some(bad) = segments.iter().find(|s| s.embedding.len() != dimensions) {
                return Err(RagError::Index {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "segment '{}' has {} dimensions, expected {dimensions}",
                        bad.segment.id,
                        bad.embedding.len()
                    ),
                });
            }
        }
        if let Some(bad) = segments.iter().find(|s| !is_finite(&s.embedding)) {
            return Err(RagError::Index {
                backend: BACKEND.to_string(),
                message: format!("segment '{}' has a non-finite embedding", bad.segment.id),
            });
        }

        let count = segments.len();
        *self.segments.write().await = segments;
        debug!(backend = BACKEND, segment_count = count, "index built");
        Ok(())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredSegment>> {
        if k == 0 {
            return Err(RagError::Configuration("k must be at least 1".to_string()));
        }

        if !is_finite(embedding) {
            return Err(RagError::Index {
                backend: BACKEND.to_string(),
                message: "query embedding has non-finite values".to_string(),
            });
        }

        let segments = self.segments.read().await;
        if let Some(first) = segments.first() {
            if first.embedding.len() != embedding.len() {
                return Err(RagError::Index {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "query has {} dimensions, index has {}",
                        embedding.len(),
                        first.embedding.len()
                    ),
                });
            }
        }

        let mut scored: Vec<ScoredSegment> = segments
            .iter()
            .map(|s| ScoredSegment {
                segment: s.segment.clone(),
                score: cosine_similarity(&s.embedding, embedding),
            })
            .collect();

        // Stable sort: equal scores stay in build order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    async fn len(&self) -> usize {
        self.segments.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Segment;

    fn embedded(id: &str, embedding: Vec<f32>) -> EmbeddedSegment {
        EmbeddedSegment {
            segment: Segment {
                id: id.into(),
                text: id.into(),
                document_id: "record-0".into(),
                record_index: 0,
                offset: 0,
            },
            embedding,
        }
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn k_beyond_len_returns_everything() {
        let index = InMemoryIndex::new();
        index
            .build(vec![embedded("a", vec![1.0, 0.0]), embedded("b", vec![0.0, 1.0])])
            .await
            .unwrap();

        let hits = index.query(&[1.0, 0.1], 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].segment.id, "a");
    }

    #[tokio::test]
    async fn ties_keep_build_order() {
        let index = InMemoryIndex::new();
        index
            .build(vec![
                embedded("first", vec![1.0, 0.0]),
                embedded("second", vec![1.0, 0.0]),
                embedded("third", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let ids: Vec<String> =
            index.query(&[1.0, 0.0], 3).await.unwrap().into_iter().map(|h| h.segment.id).collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn zero_k_is_rejected() {
        let index = InMemoryIndex::new();
        assert!(matches!(index.query(&[1.0], 0).await, Err(RagError::Configuration(_))));
    }

    #[tokio::test]
    async fn mixed_dimensions_are_rejected() {
        let index = InMemoryIndex::new();
        let err = index
            .build(vec![embedded("a", vec![1.0, 0.0]), embedded("b", vec![1.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Index { .. }));
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn rebuild_replaces_contents() {
        let index = InMemoryIndex::new();
        index.build(vec![embedded("old", vec![1.0])]).await.unwrap();
        index.build(vec![embedded("new", vec![1.0]), embedded("newer", vec![1.0])]).await.unwrap();
        assert_eq!(index.len().await, 2);
    }

    #[tokio::test]
    async fn non_finite_embeddings_are_rejected() {
        let index = InMemoryIndex::new();
        let err = index
            .build(vec![embedded("a", vec![1.0, 0.0]), embedded("b", vec![f32::NAN, 1.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Index { .. }));
        assert!(index.is_empty().await);

        index.build(vec![embedded("a", vec![1.0, 0.0])]).await.unwrap();
        let err = index.query(&[f32::INFINITY, 0.0], 1).await.unwrap_err();
        assert!(matches!(err, RagError::Index { .. }));
    }

    #[tokio::test]
    async fn overflowing_scores_still_sort() {
        // Finite inputs whose squares overflow f32 produce NaN scores.
        let index = InMemoryIndex::new();
        let segments: Vec<_> = (0..64)
            .map(|i| {
                let v = if i % 3 == 0 { vec![f32::MAX, f32::MAX] } else { vec![1.0, i as f32] };
                embedded(&format!("s{i}"), v)
            })
            .collect();
        index.build(segments).await.unwrap();

        let hits = index.query(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 5);
    }

    #[tokio::test]
    async fn empty_index_answers_with_nothing() {
        let index = InMemoryIndex::new();
        assert!(index.query(&[1.0, 0.0], 2).await.unwrap().is_empty());
    }
}

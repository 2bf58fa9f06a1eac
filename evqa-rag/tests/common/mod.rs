//! Deterministic stand-ins for the external embedding and generation services.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use evqa_rag::{
    CompletionModel, EmbeddingProvider, QaConfig, QaOrchestrator, RagError, Record, Result,
};

pub const DIM: usize = 64;

/// Bag-of-words embedding: each lowercase token is hashed into a bucket.
///
/// Texts sharing words point in similar directions, which is enough for
/// retrieval tests to be meaningful.
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }
}

pub fn keyword_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
    {
        let hash = token.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        v[(hash % DIM as u64) as usize] += 1.0;
    }
    v
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(keyword_vector(text))
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// An embedder whose backend is always down.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::EmbeddingUnavailable {
            provider: "failing".into(),
            message: "connection refused".into(),
        })
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// An embedder that reports one size and returns another.
pub struct WrongSizeEmbedder;

#[async_trait]
impl EmbeddingProvider for WrongSizeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0; 3])
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Keyword embedding, except texts mentioning `trigger` come back with NaN.
pub struct NanEmbedder {
    pub trigger: &'static str,
}

#[async_trait]
impl EmbeddingProvider for NanEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = keyword_vector(text);
        if text.contains(self.trigger) {
            v[0] = f32::NAN;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "nan"
    }
}

/// Never answers.
pub struct HangingEmbedder;

#[async_trait]
impl EmbeddingProvider for HangingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        std::future::pending().await
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "hanging"
    }
}

/// Replies with the prompt it was given, so answers quote the context.
pub struct EchoModel {
    pub input_limit: usize,
}

impl EchoModel {
    pub fn new() -> Self {
        Self { input_limit: 100_000 }
    }
}

#[async_trait]
impl CompletionModel for EchoModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }

    fn input_limit(&self) -> usize {
        self.input_limit
    }
}

/// Fails the first `failures` calls, then echoes.
pub struct FlakyModel {
    pub failures: usize,
    calls: AtomicUsize,
}

impl FlakyModel {
    pub fn new(failures: usize) -> Self {
        Self { failures, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl CompletionModel for FlakyModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(RagError::GenerationUnavailable {
                provider: "flaky".into(),
                message: "503 Service Unavailable".into(),
            });
        }
        Ok(prompt.to_string())
    }

    fn input_limit(&self) -> usize {
        100_000
    }
}

/// Takes `delay` to answer.
pub struct SlowModel {
    pub delay: Duration,
}

#[async_trait]
impl CompletionModel for SlowModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok("eventually".to_string())
    }

    fn input_limit(&self) -> usize {
        100_000
    }
}

pub fn tesla() -> Record {
    Record::vehicle("Tesla", "Model 3", "RWD", 500.0, 45000.0)
}

pub fn fleet() -> Vec<Record> {
    vec![
        tesla(),
        Record::vehicle("Hyundai", "Ioniq 5", "AWD", 430.0, 47000.0),
        Record::vehicle("BYD", "Dolphin", "FWD", 400.0, 33000.0),
        Record::vehicle("Porsche", "Taycan", "AWD", 460.0, 105000.0),
    ]
}

pub fn orchestrator(
    embedder: Arc<dyn EmbeddingProvider>,
    model: Arc<dyn CompletionModel>,
    config: QaConfig,
) -> QaOrchestrator {
    QaOrchestrator::builder()
        .config(config)
        .embedding_provider(embedder)
        .completion_model(model)
        .build()
        .expect("valid orchestrator")
}

/// Keyword embedder and echo model, the usual happy-path pair.
pub fn keyword_orchestrator(config: QaConfig) -> QaOrchestrator {
    orchestrator(Arc::new(KeywordEmbedder::new()), Arc::new(EchoModel::new()), config)
}

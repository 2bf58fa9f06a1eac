//! Question-answering orchestrator.
//!
//! The [`QaOrchestrator`] coordinates the one-time index build
//! (records → documents → segments → embeddings → index) and per-question
//! answering (retrieve → generate). Construct one via
//! [`QaOrchestrator::builder()`], call [`build`](QaOrchestrator::build) once,
//! then share it (for instance behind an `Arc`) with every caller of
//! [`ask`](QaOrchestrator::ask).
//!
//! # Example
//!
//! ```rust,ignore
//! use evqa_rag::{QaConfig, QaOrchestrator};
//!
//! let mut qa = QaOrchestrator::builder()
//!     .config(QaConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .completion_model(Arc::new(model))
//!     .build()?;
//!
//! qa.build(dataset.records()).await?;
//! let answer = qa.ask("What is the range of the Tesla Model 3?").await?;
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{Instrument, error, info, info_span};

use crate::builder::DocumentBuilder;
use crate::chunking::{CharacterChunker, Chunker};
use crate::config::QaConfig;
use crate::document::{Answer, EmbeddedSegment, Record, Segment};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{AnswerGenerator, CompletionModel};
use crate::index::VectorIndex;
use crate::inmemory::InMemoryIndex;
use crate::retriever::{Retriever, embed_batch_with_timeout};

/// Lifecycle state of a [`QaOrchestrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    /// Constructed; no index yet.
    Uninitialized,
    /// Building the index.
    Building,
    /// Serving questions, none in flight.
    Ready,
    /// Serving questions, at least one in flight.
    Answering,
    /// The build failed. Terminal.
    Failed,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrchestratorState::Uninitialized => "uninitialized",
            OrchestratorState::Building => "building",
            OrchestratorState::Ready => "ready",
            OrchestratorState::Answering => "answering",
            OrchestratorState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a successful index build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Records rendered into documents.
    pub record_count: usize,
    /// Segments embedded and indexed.
    pub segment_count: usize,
    /// Embedding dimensionality.
    pub dimensions: usize,
}

/// Counts an in-flight question for as long as it lives.
///
/// Dropping the guard, including when the `ask` future is abandoned,
/// releases the count.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The question-answering orchestrator.
///
/// The index is written only by [`build`](QaOrchestrator::build), which
/// needs `&mut self`; [`ask`](QaOrchestrator::ask) takes `&self` and never
/// mutates shared state, so concurrent questions are safe.
pub struct QaOrchestrator {
    config: QaConfig,
    document_builder: DocumentBuilder,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    retriever: Retriever,
    generator: AnswerGenerator,
    phase: OrchestratorState,
    in_flight: AtomicUsize,
}

impl QaOrchestrator {
    /// Create a new [`QaOrchestratorBuilder`].
    pub fn builder() -> QaOrchestratorBuilder {
        QaOrchestratorBuilder::default()
    }

    /// Return a reference to the configuration.
    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// The current lifecycle state.
    pub fn state(&self) -> OrchestratorState {
        match self.phase {
            OrchestratorState::Ready if self.in_flight.load(Ordering::SeqCst) > 0 => {
                OrchestratorState::Answering
            }
            phase => phase,
        }
    }

    /// Number of segments in the index.
    pub async fn segment_count(&self) -> usize {
        self.index.len().await
    }

    /// Build the index from `records`.
    ///
    /// Runs to completion or fails as a whole: on success the orchestrator
    /// is `Ready`, on any error it is `Failed` and will never serve.
    ///
    /// # Errors
    ///
    /// - [`RagError::Configuration`] if called more than once; rebuilding
    ///   requires a new orchestrator.
    /// - [`RagError::MissingField`] from the document builder.
    /// - [`RagError::EmbeddingUnavailable`] if any embedding call fails.
    /// - [`RagError::Index`] if the index rejects the segments.
    pub async fn build(&mut self, records: &[Record]) -> Result<BuildReport> {
        if self.phase != OrchestratorState::Uninitialized {
            return Err(RagError::Configuration(format!(
                "index already built (state: {}); create a new orchestrator to rebuild",
                self.phase
            )));
        }

        self.phase = OrchestratorState::Building;
        let span = info_span!("build_index", record_count = records.len());
        let outcome = self.run_build(records).instrument(span).await;
        match outcome {
            Ok(report) => {
                self.phase = OrchestratorState::Ready;
                info!(
                    record_count = report.record_count,
                    segment_count = report.segment_count,
                    dimensions = report.dimensions,
                    "index ready"
                );
                Ok(report)
            }
            Err(e) => {
                self.phase = OrchestratorState::Failed;
                error!(error = %e, "index build failed");
                Err(e)
            }
        }
    }

    async fn run_build(&self, records: &[Record]) -> Result<BuildReport> {
        // 1. Render documents
        let documents = self.document_builder.build(records)?;

        // 2. Chunk
        let segments: Vec<Segment> =
            documents.iter().flat_map(|document| self.chunker.chunk(document)).collect();

        // 3. Embed in batches
        let dimensions = self.embedder.dimensions();
        let timeout = self.config.request_timeout();
        let mut embedded = Vec::with_capacity(segments.len());
        for batch in segments.chunks(self.config.embed_batch_size) {
            let texts: Vec<&str> = batch.iter().map(|s| s.text.as_str()).collect();
            let embeddings =
                embed_batch_with_timeout(self.embedder.as_ref(), &texts, timeout).await?;

            if embeddings.len() != batch.len() {
                return Err(RagError::EmbeddingUnavailable {
                    provider: self.embedder.name().to_string(),
                    message: format!(
                        "returned {} embeddings for {} texts",
                        embeddings.len(),
                        batch.len()
                    ),
                });
            }

            for (segment, embedding) in batch.iter().zip(embeddings) {
                if embedding.len() != dimensions {
                    return Err(RagError::EmbeddingUnavailable {
                        provider: self.embedder.name().to_string(),
                        message: format!(
                            "segment '{}' embedded with {} dimensions, expected {dimensions}",
                            segment.id,
                            embedding.len()
                        ),
                    });
                }
                if embedding.iter().any(|v| !v.is_finite()) {
                    return Err(RagError::EmbeddingUnavailable {
                        provider: self.embedder.name().to_string(),
                        message: format!(
                            "segment '{}' embedded with non-finite values",
                            segment.id
                        ),
                    });
                }
                embedded.push(EmbeddedSegment { segment: segment.clone(), embedding });
            }
        }

        // 4. Build the index
        let segment_count = embedded.len();
        self.index.build(embedded).await?;

        Ok(BuildReport { record_count: documents.len(), segment_count, dimensions })
    }

    /// Answer one question: retrieve → generate.
    ///
    /// Each question is independent; the orchestrator keeps no conversation
    /// history. `sources` lists the retrieved segments that made it into the
    /// prompt, most similar first. Over an empty index, `sources` is empty
    /// and the answer is the model's reply to an empty context.
    ///
    /// # Errors
    ///
    /// - [`RagError::NotReady`] unless the index was built successfully.
    /// - [`RagError::InvalidQuestion`] for a blank question.
    /// - [`RagError::EmbeddingUnavailable`] / [`RagError::GenerationUnavailable`]
    ///   on upstream failure. The orchestrator stays ready.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        if self.phase != OrchestratorState::Ready {
            return Err(RagError::NotReady { state: self.state() });
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::InvalidQuestion("question must not be blank".to_string()));
        }

        let _in_flight = InFlight::enter(&self.in_flight);
        let span = info_span!("ask", k = self.config.retrieval_k);
        async {
            let hits = self.retriever.retrieve_scored(question, self.config.retrieval_k).await?;
            let context: Vec<Segment> = hits.iter().map(|hit| hit.segment.clone()).collect();
            let generated = self.generator.generate(question, &context).await?;

            let mut sources = hits;
            sources.truncate(generated.context_used);
            info!(source_count = sources.len(), "answered");
            Ok::<_, RagError>(Answer { answer: generated.answer, sources })
        }
        .instrument(span)
        .await
        .inspect_err(|e| error!(error = %e, "question failed"))
    }
}

/// Builder for constructing a [`QaOrchestrator`].
///
/// `embedding_provider` and `completion_model` are required. The index
/// defaults to [`InMemoryIndex`], the chunker to a [`CharacterChunker`] sized
/// from the config, and the document builder to the vehicle template.
#[derive(Default)]
pub struct QaOrchestratorBuilder {
    config: Option<QaConfig>,
    document_builder: Option<DocumentBuilder>,
    chunker: Option<Arc<dyn Chunker>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    completion_model: Option<Arc<dyn CompletionModel>>,
}

impl QaOrchestratorBuilder {
    /// Set the configuration. Defaults to [`QaConfig::default()`].
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document builder.
    pub fn document_builder(mut self, builder: DocumentBuilder) -> Self {
        self.document_builder = Some(builder);
        self
    }

    /// Set the chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector index backend.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the completion model used to generate answers.
    pub fn completion_model(mut self, model: Arc<dyn CompletionModel>) -> Self {
        self.completion_model = Some(model);
        self
    }

    /// Build an `Uninitialized` [`QaOrchestrator`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if a required component is missing
    /// or the default chunker cannot be sized from the config.
    pub fn build(self) -> Result<QaOrchestrator> {
        let config = self.config.unwrap_or_default();
        let embedder = self.embedding_provider.ok_or_else(|| {
            RagError::Configuration("embedding_provider is required".to_string())
        })?;
        let model = self
            .completion_model
            .ok_or_else(|| RagError::Configuration("completion_model is required".to_string()))?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(CharacterChunker::new(config.chunk_size, config.chunk_overlap)?),
        };
        let index = self.index.unwrap_or_else(|| Arc::new(InMemoryIndex::new()));
        let timeout = config.request_timeout();

        Ok(QaOrchestrator {
            retriever: Retriever::new(embedder.clone(), index.clone(), timeout),
            generator: AnswerGenerator::new(model, timeout),
            document_builder: self.document_builder.unwrap_or_default(),
            chunker,
            embedder,
            index,
            config,
            phase: OrchestratorState::Uninitialized,
            in_flight: AtomicUsize::new(0),
        })
    }
}

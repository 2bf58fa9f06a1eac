//! # evqa-rag
//!
//! Retrieval-augmented question answering over an electric-vehicle dataset.
//!
//! Each dataset row becomes one descriptive sentence, which is chunked,
//! embedded, and indexed once at startup. Questions are embedded, matched
//! against the index, and answered by a language model grounded in the
//! closest rows.
//!
//! The embedding model, the vector index and the language model sit behind
//! the [`EmbeddingProvider`], [`VectorIndex`] and [`CompletionModel`] traits.
//! [`InMemoryIndex`] is always available; OpenAI-compatible embedding and chat
//! backends are behind the `openai` feature.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use evqa_rag::{ColumnMapping, Dataset, QaConfig, QaOrchestrator};
//!
//! let dataset = Dataset::from_csv_path("ev_raw_data.csv", &ColumnMapping::default())?;
//! let mut qa = QaOrchestrator::builder()
//!     .config(QaConfig::from_env()?)
//!     .embedding_provider(Arc::new(embedder))
//!     .completion_model(Arc::new(model))
//!     .build()?;
//! qa.build(dataset.records()).await?;
//!
//! let answer = qa.ask("Which car has the longest range?").await?;
//! println!("{}", answer.answer);
//! ```
//!
//! The [`insights`] module holds the exploratory summaries and the
//! least-squares price model.

pub mod builder;
pub mod chunking;
pub mod config;
pub mod dataset;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod inmemory;
pub mod insights;
pub mod orchestrator;
pub mod retriever;

#[cfg(feature = "openai")]
pub mod openai;

pub use builder::{DocumentBuilder, DocumentTemplate, VEHICLE_TEMPLATE};
pub use chunking::{CharacterChunker, Chunker, Segments};
pub use config::{QaConfig, QaConfigBuilder};
pub use dataset::{ColumnMapping, Dataset};
pub use document::{Answer, Document, EmbeddedSegment, Record, ScoredSegment, Segment};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::{AnswerGenerator, CompletionModel, GeneratedAnswer};
pub use index::VectorIndex;
pub use inmemory::InMemoryIndex;
pub use orchestrator::{BuildReport, OrchestratorState, QaOrchestrator, QaOrchestratorBuilder};
pub use retriever::Retriever;

#[cfg(feature = "openai")]
pub use openai::{OpenAIChatModel, OpenAIEmbeddingProvider};

//! Retrieval-augmented answering over the FAQ knowledge base.
//!
//! The pipeline is wired from small, independently testable pieces:
//! - `loader`: reads the knowledge-base file
//! - `splitter`: fixed-size character chunking
//! - `embedder`: text -> vector via the provider's embeddings endpoint
//! - `index`: in-memory nearest-neighbour lookup over chunk vectors
//! - `generator`: answer synthesis via the provider's chat endpoint
//! - `pipeline`: initialize-once / query-many orchestration

pub mod embedder;
pub mod generator;
pub mod index;
pub mod loader;
pub mod pipeline;
pub mod splitter;

use thiserror::Error;

pub use embedder::{Embedder, HttpEmbedder};
pub use generator::{AnswerGenerator, HttpGenerator};
pub use index::VectorIndex;
pub use loader::KnowledgeDocument;
pub use pipeline::{RagPipeline, NOT_READY_MESSAGE};
pub use splitter::{Chunk, ChunkSplitter};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing configuration: {0}")]
    ConfigurationMissing(&'static str),
    #[error("knowledge base not readable: {0}")]
    NotFound(String),
    #[error("external service error: {0}")]
    ExternalService(String),
    #[error("vector index holds no entries")]
    NotInitialized,
}

impl PipelineError {
    pub fn external<E: std::fmt::Display>(err: E) -> Self {
        PipelineError::ExternalService(err.to_string())
    }
}

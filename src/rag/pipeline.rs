use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::config::RagSettings;

use super::embedder::{Embedder, HttpEmbedder};
use super::generator::{AnswerGenerator, HttpGenerator};
use super::index::VectorIndex;
use super::loader::load_document;
use super::splitter::{Chunk, ChunkSplitter};
use super::PipelineError;

/// Returned for every query while the pipeline is unavailable.
pub const NOT_READY_MESSAGE: &str = "System is not ready. Please check knowledge base setup.";

const ERROR_PREFIX: &str = "Error generating response: ";

enum PipelineState {
    /// No build attempted yet, or the last build failed transiently.
    Uninitialized,
    Ready(Arc<VectorIndex>),
    /// Credential or knowledge-base file missing. Sticky for the process
    /// lifetime; queries return the not-ready message without retrying.
    Unavailable,
}

/// Initialize-once, query-many orchestration of the answering pipeline.
///
/// `answer` never fails: configuration problems surface as the fixed
/// not-ready message and provider failures as an error-prefixed string,
/// so a single bad query cannot take the serving process down.
pub struct RagPipeline {
    settings: RagSettings,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn AnswerGenerator>,
    state: RwLock<PipelineState>,
}

impl RagPipeline {
    pub fn new(
        settings: RagSettings,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            settings,
            embedder,
            generator,
            state: RwLock::new(PipelineState::Uninitialized),
        }
    }

    pub fn from_settings(settings: &RagSettings) -> Self {
        let embedder = Arc::new(HttpEmbedder::new(
            &settings.base_url,
            &settings.api_key,
            &settings.embedding_model,
        ));
        let generator = Arc::new(HttpGenerator::new(
            &settings.base_url,
            &settings.api_key,
            &settings.generation_model,
        ));
        Self::new(settings.clone(), embedder, generator)
    }

    /// Answers a user question. Initializes the index lazily on the first
    /// call; the first caller pays the build latency.
    pub async fn answer(&self, query: &str) -> String {
        let index = match self.ensure_ready().await {
            Ok(Some(index)) => index,
            Ok(None) => return NOT_READY_MESSAGE.to_string(),
            Err(err) => return format!("{}{}", ERROR_PREFIX, err),
        };

        match self.run_query(&index, query).await {
            Ok(answer) => answer,
            Err(err) => format!("{}{}", ERROR_PREFIX, err),
        }
    }

    /// Resolves the current state, building the index if nobody has yet.
    /// The write lock doubles as the initialization guard, so concurrent
    /// first callers trigger a single build.
    async fn ensure_ready(&self) -> Result<Option<Arc<VectorIndex>>, PipelineError> {
        {
            let state = self.state.read().await;
            match &*state {
                PipelineState::Ready(index) => return Ok(Some(index.clone())),
                PipelineState::Unavailable => return Ok(None),
                PipelineState::Uninitialized => {}
            }
        }

        let mut state = self.state.write().await;
        if let PipelineState::Ready(index) = &*state {
            // Another caller finished the build while we waited.
            return Ok(Some(index.clone()));
        }
        if matches!(*state, PipelineState::Unavailable) {
            return Ok(None);
        }

        match self.build_index().await {
            Ok(index) => {
                let index = Arc::new(index);
                tracing::info!("pipeline initialized with {} chunks", index.len());
                *state = PipelineState::Ready(index.clone());
                Ok(Some(index))
            }
            Err(err @ PipelineError::ConfigurationMissing(_))
            | Err(err @ PipelineError::NotFound(_)) => {
                tracing::warn!("pipeline unavailable: {}", err);
                *state = PipelineState::Unavailable;
                Ok(None)
            }
            // Provider failures leave the state untouched so the next
            // query retries the build.
            Err(err) => Err(err),
        }
    }

    async fn build_index(&self) -> Result<VectorIndex, PipelineError> {
        if self.settings.api_key.trim().is_empty() {
            return Err(PipelineError::ConfigurationMissing("rag.api_key"));
        }

        let document = load_document(&self.settings.knowledge_base_path)?;

        let splitter = ChunkSplitter::new(self.settings.chunk_size, self.settings.chunk_overlap);
        let chunks: Vec<Chunk> = splitter.split(&document.text).collect();

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(PipelineError::ExternalService(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        Ok(VectorIndex::build(vectors.into_iter().zip(chunks)))
    }

    async fn run_query(&self, index: &VectorIndex, query: &str) -> Result<String, PipelineError> {
        let query_vector = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                PipelineError::ExternalService("provider returned no query embedding".to_string())
            })?;

        let context = index.retrieve(&query_vector, self.settings.top_k)?;
        self.generator.generate(query, &context).await
    }
}

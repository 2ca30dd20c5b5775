//! Query pipeline: embed → search every collection → merge → prompt → LLM.
//!
//! # Example
//!
//! ```rust,ignore
//! use aiconnect_rag::{Answer, QueryPipeline};
//!
//! let pipeline = QueryPipeline::builder()
//!     .embedding_provider(embedder)
//!     .vector_store(store)
//!     .llm(Arc::new(OpenAIClient::new(OpenAIConfig::new(api_key, "gpt-4"))?))
//!     .build()?;
//!
//! match pipeline.answer("Which cells are underutilized?").await? {
//!     Answer::Generated { text, .. } => println!("{text}"),
//!     Answer::NoRelevantDocuments => println!("{}", Answer::NoRelevantDocuments),
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use aiconnect_model::{GenerationConfig, Llm, LlmRequest};
use tracing::{debug, error, info};

use crate::config::RagConfig;
use crate::document::SearchHit;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::prompt::PromptTemplate;
use crate::vectorstore::VectorStore;

/// Reply shown when retrieval finds nothing to ground an answer on.
pub const NO_RELEVANT_DOCUMENTS: &str =
    "No relevant documents found or context is insufficient to answer your question.";

/// Result of [`QueryPipeline::answer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// The LLM's trimmed reply and the passages it was given.
    Generated { text: String, sources: Vec<SearchHit> },
    /// Nothing was retrieved; the LLM was not called.
    NoRelevantDocuments,
}

impl Answer {
    /// The text to show the user.
    pub fn text(&self) -> &str {
        match self {
            Answer::Generated { text, .. } => text,
            Answer::NoRelevantDocuments => NO_RELEVANT_DOCUMENTS,
        }
    }

    /// Passages used as context; empty when nothing was retrieved.
    pub fn sources(&self) -> &[SearchHit] {
        match self {
            Answer::Generated { sources, .. } => sources,
            Answer::NoRelevantDocuments => &[],
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Merge per-collection hits into one list ordered by descending score and
/// keep the first `limit`.
///
/// Hits with a NaN score are dropped. Ties keep their input order.
pub fn merge_hits(hits: Vec<SearchHit>, limit: usize) -> Vec<SearchHit> {
    let mut merged: Vec<SearchHit> = hits.into_iter().filter(|h| !h.score.is_nan()).collect();
    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged.truncate(limit);
    merged
}

/// Answers questions from every ingested collection.
///
/// Construct one via [`QueryPipeline::builder()`].
pub struct QueryPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    llm: Arc<dyn Llm>,
    prompt: PromptTemplate,
    generation: GenerationConfig,
}

impl QueryPipeline {
    /// Create a new [`QueryPipelineBuilder`].
    pub fn builder() -> QueryPipelineBuilder {
        QueryPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the prompt template.
    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    /// Search every collection and return the best
    /// `max_context_documents` hits overall.
    ///
    /// The question is embedded once, and only if the store has at least
    /// one collection.
    ///
    /// # Errors
    ///
    /// Returns the embedding or vector store error of the first failing call.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchHit>> {
        let collections = self.vector_store.list_collections().await?;
        if collections.is_empty() {
            debug!("no collections to search");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedding_provider.embed(question).await?;

        let mut hits = Vec::new();
        for collection in &collections {
            let found = self
                .vector_store
                .search(collection, &query_embedding, self.config.top_k_per_collection)
                .await?;
            debug!(collection = %collection, hit_count = found.len(), "searched collection");
            hits.extend(found);
        }

        let merged = merge_hits(hits, self.config.max_context_documents);
        debug!(
            collection_count = collections.len(),
            result_count = merged.len(),
            "retrieved context"
        );
        Ok(merged)
    }

    /// Answer a question from the stored documents.
    ///
    /// A blank question or an empty retrieval returns
    /// [`Answer::NoRelevantDocuments`] without calling the LLM.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::LlmError`] if the chat completion fails, or the
    /// error of a failing retrieval step. Errors are logged.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        if question.trim().is_empty() {
            return Ok(Answer::NoRelevantDocuments);
        }

        let sources = self.retrieve(question).await.inspect_err(|e| {
            error!(error = %e, "retrieval failed");
        })?;
        if sources.is_empty() {
            info!(result_count = 0, "no relevant documents");
            return Ok(Answer::NoRelevantDocuments);
        }

        let documents: Vec<&str> = sources.iter().map(|hit| hit.text.as_str()).collect();
        let prompt = self.prompt.render(question, &documents);
        let request = LlmRequest::from_prompt(prompt).with_config(self.generation);

        let response = self.llm.generate(request).await.map_err(|e| {
            error!(llm = self.llm.name(), error = %e, "generation failed");
            RagError::LlmError(e)
        })?;

        info!(llm = self.llm.name(), result_count = sources.len(), "answered question");
        Ok(Answer::Generated { text: response.text.trim().to_string(), sources })
    }
}

/// Builder for constructing a [`QueryPipeline`].
///
/// `embedding_provider`, `vector_store` and `llm` are required. The prompt
/// defaults to [`PromptTemplate::network_planning()`] and generation to
/// temperature 0.2 with at most 500 tokens.
#[derive(Default)]
pub struct QueryPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    llm: Option<Arc<dyn Llm>>,
    prompt: Option<PromptTemplate>,
    generation: Option<GenerationConfig>,
}

impl QueryPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider. It must be the one used at ingestion.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the chat model.
    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Replace the prompt template.
    pub fn prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Override sampling settings.
    pub fn generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Build the [`QueryPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<QueryPipeline> {
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let llm = self.llm.ok_or_else(|| RagError::ConfigError("llm is required".to_string()))?;

        Ok(QueryPipeline {
            config: self.config.unwrap_or_default(),
            embedding_provider,
            vector_store,
            llm,
            prompt: self.prompt.unwrap_or_default(),
            generation: self.generation.unwrap_or_default(),
        })
    }
}

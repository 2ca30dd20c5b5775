//! Ingestion pipeline: extract → embed → store.
//!
//! # Example
//!
//! ```rust,ignore
//! use aiconnect_rag::{IngestionPipeline, LocalVectorStore, UploadedDocument};
//!
//! let pipeline = IngestionPipeline::builder()
//!     .embedding_provider(Arc::new(HuggingFaceEmbeddingProvider::from_env()))
//!     .vector_store(Arc::new(LocalVectorStore::open("./vector_db").await?))
//!     .build()?;
//!
//! let document = UploadedDocument::new(bytes, "cells.csv").with_name("Cell load");
//! let report = pipeline.ingest(&document).await?;
//! println!("{report}");
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::RagConfig;
use crate::document::{EmbeddingRecord, RecordFields, UploadedDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::{DocumentFormat, extract};
use crate::schema::CollectionSchema;
use crate::vectorstore::VectorStore;

/// Outcome of a successful [`IngestionPipeline::ingest`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestReport {
    /// A new collection was created with one record per chunk.
    Processed { collection: String, chunk_count: usize },
    /// Content with this hash was ingested before; nothing was done.
    AlreadyProcessed { collection: String },
    /// The file is readable but yielded no text; no collection was created.
    NoTextExtracted { collection: String },
}

impl IngestReport {
    /// Collection derived from the document content.
    pub fn collection(&self) -> &str {
        match self {
            IngestReport::Processed { collection, .. }
            | IngestReport::AlreadyProcessed { collection }
            | IngestReport::NoTextExtracted { collection } => collection,
        }
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestReport::Processed { .. } => f.write_str("File processed successfully."),
            IngestReport::AlreadyProcessed { .. } => f.write_str("File already processed."),
            IngestReport::NoTextExtracted { .. } => {
                f.write_str("No text extracted from the file. Check the file content.")
            }
        }
    }
}

/// Turns uploaded documents into stored embedding collections.
///
/// Each distinct content gets its own collection named after its MD5 hash,
/// so uploading the same bytes twice is detected before any extraction or
/// embedding work. Construct one via [`IngestionPipeline::builder()`].
pub struct IngestionPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Ingest one document.
    ///
    /// # Errors
    ///
    /// - [`RagError::UnsupportedFormat`] if the file name has no supported suffix.
    /// - [`RagError::ExtractionError`] if the content cannot be parsed.
    /// - [`RagError::EmbeddingError`] if the provider fails or returns a vector
    ///   of the wrong width.
    /// - [`RagError::VectorStoreError`] if the store rejects any step.
    ///
    /// Every error is logged before it is returned.
    pub async fn ingest(&self, document: &UploadedDocument) -> Result<IngestReport> {
        let collection = document.collection_id();
        self.ingest_into(document, &collection).await.inspect_err(|e| {
            error!(
                file_name = %document.file_name,
                collection = %collection,
                error = %e,
                "ingestion failed"
            );
        })
    }

    async fn ingest_into(
        &self,
        document: &UploadedDocument,
        collection: &str,
    ) -> Result<IngestReport> {
        // 1. Duplicate content is detected before any work
        if self.vector_store.collection_exists(collection).await? {
            info!(collection, file_name = %document.file_name, "document already processed");
            return Ok(IngestReport::AlreadyProcessed { collection: collection.to_string() });
        }

        // 2. Extract
        let format = DocumentFormat::from_file_name(&document.file_name)?;
        let extraction = extract(&document.content, format)?;
        if extraction.is_empty() {
            info!(collection, %format, "no text extracted");
            return Ok(IngestReport::NoTextExtracted { collection: collection.to_string() });
        }

        // 3. Embed each chunk in order
        let fields = RecordFields::for_document(document, &extraction.metadatas()).map_err(|e| {
            RagError::ExtractionError { format: format.to_string(), message: e.to_string() }
        })?;
        let dimensions = self.embedding_provider.dimensions();
        let mut records = Vec::with_capacity(extraction.len());
        for (index, chunk) in extraction.into_chunks().into_iter().enumerate() {
            let vector = self.embedding_provider.embed(&chunk.text).await?;
            if vector.len() != dimensions {
                return Err(RagError::EmbeddingError {
                    provider: "ingestion".to_string(),
                    message: format!(
                        "chunk {index} embedded to {} dimensions, expected {dimensions}",
                        vector.len()
                    ),
                });
            }
            records.push(EmbeddingRecord {
                vector,
                text: chunk.text,
                metadata: chunk.metadata,
                fields,
            });
        }
        debug!(collection, count = records.len(), "embedded chunks");

        // 4. Store. The batch is checked before the collection exists, and a
        // collection whose insert or load fails is removed again.
        let schema = CollectionSchema::document_embeddings(dimensions, self.config.metric);
        schema.check_records("ingestion", collection, &records)?;
        self.vector_store.create_collection(collection, &schema).await?;
        let ids = match self.fill(collection, &records).await {
            Ok(ids) => ids,
            Err(e) => {
                self.roll_back(collection).await;
                return Err(e);
            }
        };

        info!(collection, %format, chunk_count = ids.len(), "ingested document");
        Ok(IngestReport::Processed { collection: collection.to_string(), chunk_count: ids.len() })
    }

    async fn fill(&self, collection: &str, records: &[EmbeddingRecord]) -> Result<Vec<u64>> {
        let ids = self.vector_store.insert(collection, records).await?;
        self.vector_store.load(collection).await?;
        Ok(ids)
    }

    async fn roll_back(&self, collection: &str) {
        match self.vector_store.delete_collection(collection).await {
            Ok(()) => debug!(collection, "removed partially ingested collection"),
            Err(e) => warn!(collection, error = %e, "failed to remove partial collection"),
        }
    }
}

/// Builder for constructing an [`IngestionPipeline`].
///
/// `embedding_provider` and `vector_store` are required; `config` defaults to
/// [`RagConfig::default()`].
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl IngestionPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Build the [`IngestionPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<IngestionPipeline> {
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;

        Ok(IngestionPipeline {
            config: self.config.unwrap_or_default(),
            embedding_provider,
            vector_store,
        })
    }
}

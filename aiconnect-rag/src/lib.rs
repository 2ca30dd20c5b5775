//! # aiconnect-rag
//!
//! Document ingestion and retrieval-augmented question answering for the
//! AI Connect network-planning assistant.
//!
//! ## Overview
//!
//! - [`extract`] - text extraction from PDF, DOCX, TXT, XLSX and CSV uploads
//! - [`EmbeddingProvider`] - text → vector, with HuggingFace and OpenAI backends
//! - [`VectorStore`] - collection storage and similarity search, with
//!   in-memory, local directory and Qdrant backends
//! - [`IngestionPipeline`] - extract → embed → store, one collection per
//!   distinct file content
//! - [`QueryPipeline`] - embed → search every collection → merge → prompt → LLM
//! - [`ChatSession`] - per-user transcript, access gate and status messages
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use aiconnect_model::MockLlm;
//! use aiconnect_rag::huggingface::HuggingFaceEmbeddingProvider;
//! use aiconnect_rag::*;
//!
//! let embedder = Arc::new(HuggingFaceEmbeddingProvider::from_env());
//! let store = Arc::new(LocalVectorStore::open("./vector_db").await?);
//!
//! let ingestion = IngestionPipeline::builder()
//!     .embedding_provider(embedder.clone())
//!     .vector_store(store.clone())
//!     .build()?;
//! ingestion.ingest(&UploadedDocument::new(std::fs::read("cells.csv")?, "cells.csv")).await?;
//!
//! let query = QueryPipeline::builder()
//!     .embedding_provider(embedder)
//!     .vector_store(store)
//!     .llm(Arc::new(MockLlm::new("mock").with_response("...")))
//!     .build()?;
//! println!("{}", query.answer("Where is latency highest?").await?);
//! ```
//!
//! ## Features
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `huggingface` (default) | [`huggingface::HuggingFaceEmbeddingProvider`] |
//! | `openai` (default) | [`openai::OpenAIEmbeddingProvider`] |
//! | `qdrant` | `qdrant::QdrantVectorStore` |

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
#[cfg(feature = "huggingface")]
pub mod huggingface;
pub mod ingest;
pub mod inmemory;
pub mod local;
#[cfg(feature = "openai")]
pub mod openai;
pub mod prompt;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod query;
pub mod schema;
pub mod session;
pub mod vectorstore;

pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    COLLECTION_PREFIX, ChunkMetadata, EmbeddingRecord, ExtractedChunk, RecordFields, SearchHit,
    UploadedDocument, bounded_hash, collection_id_for, content_hash,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::{DocumentFormat, Extraction, extract};
pub use ingest::{IngestReport, IngestionPipeline, IngestionPipelineBuilder};
pub use inmemory::InMemoryVectorStore;
pub use local::LocalVectorStore;
pub use prompt::PromptTemplate;
pub use query::{Answer, NO_RELEVANT_DOCUMENTS, QueryPipeline, QueryPipelineBuilder, merge_hits};
pub use schema::{CollectionSchema, FieldSchema, FieldType, Metric};
pub use session::{AccessGate, ChatSession, LOGIN_REQUIRED, upload_status};
pub use vectorstore::VectorStore;

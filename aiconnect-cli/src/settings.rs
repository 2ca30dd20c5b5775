//! Command-line arguments and the services built from them.
//!
//! Every setting can also come from the environment (or a `.env` file loaded
//! before parsing).

use std::path::PathBuf;
use std::sync::Arc;

use aiconnect_model::openai::{DEFAULT_MODEL, OpenAIConfig};
use aiconnect_model::{Llm, OpenAIClient};
use aiconnect_rag::huggingface::{self, HuggingFaceEmbeddingProvider};
use aiconnect_rag::openai::OpenAIEmbeddingProvider;
use aiconnect_rag::qdrant::QdrantVectorStore;
use aiconnect_rag::{AccessGate, EmbeddingProvider, LocalVectorStore, VectorStore};
use aiconnect_telemetry::LogFormat;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "aiconnect")]
#[command(version, about = "Ask questions about your network-planning documents")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract, embed and store a document
    Ingest {
        /// PDF, DOCX, TXT, XLSX or CSV file
        path: PathBuf,

        /// Display name of the document
        #[arg(long)]
        name: Option<String>,

        /// Short description of the document
        #[arg(long)]
        description: Option<String>,
    },

    /// Answer a single question from the stored documents
    Ask {
        /// The question; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Print the passages the answer was based on
        #[arg(long)]
        show_sources: bool,
    },

    /// Start an interactive session
    Chat,
}

/// Which service turns text into vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum EmbeddingBackend {
    #[default]
    #[value(name = "huggingface")]
    HuggingFace,
    #[value(name = "openai")]
    OpenAI,
}

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// OpenAI API key, used for answers and for OpenAI embeddings
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Chat-completion model
    #[arg(long, global = true, env = "AICONNECT_LLM_MODEL", default_value = DEFAULT_MODEL)]
    pub llm_model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, global = true, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    /// HuggingFace inference token
    #[arg(long, global = true, env = "HF_API_TOKEN", hide_env_values = true)]
    pub hf_api_token: Option<String>,

    /// Embedding service
    #[arg(
        long,
        global = true,
        env = "AICONNECT_EMBEDDING_BACKEND",
        value_enum,
        default_value_t = EmbeddingBackend::HuggingFace
    )]
    pub embedding_backend: EmbeddingBackend,

    /// Embedding model; the backend default when unset
    #[arg(long, global = true, env = "AICONNECT_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// Output width of a non-default embedding model
    #[arg(long, global = true, env = "AICONNECT_EMBEDDING_DIMENSIONS")]
    pub embedding_dimensions: Option<usize>,

    /// Directory of the local vector store
    #[arg(long, global = true, env = "VECTOR_DB_PATH", default_value = "./vector_db")]
    pub vector_db_path: PathBuf,

    /// Qdrant URL; replaces the local store when set
    #[arg(long, global = true, env = "QDRANT_URL")]
    pub qdrant_url: Option<String>,

    /// Password required by the interactive session
    #[arg(long, global = true, env = "AICONNECT_ACCESS_PASSWORD", hide_env_values = true)]
    pub access_password: Option<String>,

    /// `text` or `json`
    #[arg(long, global = true, env = "AICONNECT_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

impl Settings {
    pub fn access_gate(&self) -> AccessGate {
        AccessGate::from_password(self.access_password.clone())
    }

    pub fn embedding_provider(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        let provider: Arc<dyn EmbeddingProvider> = match self.embedding_backend {
            EmbeddingBackend::HuggingFace => {
                let mut provider = HuggingFaceEmbeddingProvider::new(self.hf_api_token.clone());
                if let Some(model) = &self.embedding_model {
                    let dimensions =
                        self.embedding_dimensions.unwrap_or(huggingface::DEFAULT_DIMENSIONS);
                    provider = provider.with_model(model, dimensions);
                }
                Arc::new(provider)
            }
            EmbeddingBackend::OpenAI => {
                let key = self
                    .openai_api_key
                    .as_deref()
                    .context("OPENAI_API_KEY must be set to use OpenAI embeddings")?;
                let mut provider = OpenAIEmbeddingProvider::new(key)?;
                if let Some(model) = &self.embedding_model {
                    provider = provider.with_model(model);
                }
                if let Some(dimensions) = self.embedding_dimensions {
                    provider = provider.with_dimensions(dimensions);
                }
                if let Some(base_url) = &self.openai_base_url {
                    provider = provider.with_base_url(base_url);
                }
                Arc::new(provider)
            }
        };
        info!(
            backend = ?self.embedding_backend,
            dimensions = provider.dimensions(),
            "embedding provider ready"
        );
        Ok(provider)
    }

    pub async fn vector_store(&self) -> Result<Arc<dyn VectorStore>> {
        if let Some(url) = &self.qdrant_url {
            info!(%url, "using qdrant vector store");
            return Ok(Arc::new(QdrantVectorStore::new(url)?));
        }
        let store = LocalVectorStore::open(&self.vector_db_path).await.with_context(|| {
            format!("cannot open vector store at {}", self.vector_db_path.display())
        })?;
        info!(path = %self.vector_db_path.display(), "using local vector store");
        Ok(Arc::new(store))
    }

    pub fn llm(&self) -> Result<Arc<dyn Llm>> {
        let key = self
            .openai_api_key
            .clone()
            .context("OPENAI_API_KEY must be set to answer questions")?;
        let mut config = OpenAIConfig::new(key, &self.llm_model);
        if let Some(base_url) = &self.openai_base_url {
            config = config.with_base_url(base_url);
        }
        Ok(Arc::new(OpenAIClient::new(config)?))
    }
}

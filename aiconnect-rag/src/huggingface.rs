//! HuggingFace embedding provider using the hosted feature-extraction
//! pipeline.
//!
//! This module is only available when the `huggingface` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The default HuggingFace inference endpoint.
const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference";

/// The default sentence-transformers model.
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// The dimensionality of `all-MiniLM-L6-v2`.
pub const DEFAULT_DIMENSIONS: usize = 384;

const PROVIDER: &str = "HuggingFace";

/// An [`EmbeddingProvider`] backed by the HuggingFace inference API.
///
/// Calls `{base_url}/models/{model}/pipeline/feature-extraction` with the
/// text as `inputs` and expects one pooled sentence vector back.
///
/// # Example
///
/// ```rust,ignore
/// use aiconnect_rag::huggingface::HuggingFaceEmbeddingProvider;
///
/// let provider = HuggingFaceEmbeddingProvider::new(Some("hf_...".into()));
/// let embedding = provider.embed("cell site utilisation").await?;
/// assert_eq!(embedding.len(), 384);
/// ```
pub struct HuggingFaceEmbeddingProvider {
    client: reqwest::Client,
    api_token: Option<String>,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl HuggingFaceEmbeddingProvider {
    /// Create a provider for `all-MiniLM-L6-v2`. The token is optional for
    /// public models on self-hosted endpoints.
    pub fn new(api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_token: api_token.filter(|t| !t.is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Create a provider using the `HF_API_TOKEN` environment variable.
    pub fn from_env() -> Self {
        Self::new(std::env::var("HF_API_TOKEN").ok())
    }

    /// Use another model; `dimensions` must match its output width.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Point at a different inference endpoint (self-hosted TEI, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}/pipeline/feature-extraction", self.base_url, self.model)
    }

    fn error(message: impl Into<String>) -> RagError {
        RagError::EmbeddingError { provider: PROVIDER.into(), message: message.into() }
    }
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
}

/// The pipeline returns a flat vector for a single sentence, but some
/// deployments wrap it in a batch of one.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Single(Vec<f32>),
    Batch(Vec<Vec<f32>>),
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, model = %self.model, text_len = text.len(), "embedding text");

        let mut request =
            self.client.post(self.endpoint()).json(&FeatureExtractionRequest { inputs: text });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "request failed");
            Self::error(format!("request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(Self::error(format!("API returned {status}: {detail}")));
        }

        let parsed: FeatureExtractionResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            Self::error(format!("failed to parse response: {e}"))
        })?;

        let embedding = match parsed {
            FeatureExtractionResponse::Single(vector) => vector,
            FeatureExtractionResponse::Batch(batch) => {
                batch.into_iter().next().ok_or_else(|| Self::error("API returned empty response"))?
            }
        };

        if embedding.len() != self.dimensions {
            return Err(Self::error(format!(
                "model '{}' returned {} dimensions, expected {}",
                self.model,
                embedding.len(),
                self.dimensions
            )));
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

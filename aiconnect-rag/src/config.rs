//! Configuration for the ingestion and query pipelines.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::schema::Metric;

/// Configuration parameters shared by the pipelines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Number of hits requested from each collection per question.
    pub top_k_per_collection: usize,
    /// Number of merged hits forwarded to the LLM as context.
    pub max_context_documents: usize,
    /// Similarity metric used for new collections.
    pub metric: Metric,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { top_k_per_collection: 100, max_context_documents: 5, metric: Metric::InnerProduct }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the number of hits requested from each collection.
    pub fn top_k_per_collection(mut self, k: usize) -> Self {
        self.config.top_k_per_collection = k;
        self
    }

    /// Set the number of merged hits placed in the prompt.
    pub fn max_context_documents(mut self, n: usize) -> Self {
        self.config.max_context_documents = n;
        self
    }

    /// Set the metric for newly created collections.
    pub fn metric(mut self, metric: Metric) -> Self {
        self.config.metric = metric;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `top_k_per_collection == 0`
    /// - `max_context_documents == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.top_k_per_collection == 0 {
            return Err(RagError::ConfigError(
                "top_k_per_collection must be greater than zero".to_string(),
            ));
        }
        if self.config.max_context_documents == 0 {
            return Err(RagError::ConfigError(
                "max_context_documents must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_settings() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config.top_k_per_collection, 100);
        assert_eq!(config.max_context_documents, 5);
        assert_eq!(config.metric, Metric::InnerProduct);
    }

    #[test]
    fn rejects_zero_limits() {
        assert!(matches!(
            RagConfig::builder().top_k_per_collection(0).build(),
            Err(RagError::ConfigError(_))
        ));
        assert!(matches!(
            RagConfig::builder().max_context_documents(0).build(),
            Err(RagError::ConfigError(_))
        ));
    }
}

//! OpenAI client implementation.

use async_openai::Client;
use async_openai::config::OpenAIConfig as AsyncOpenAIConfig;
use async_openai::types::CreateChatCompletionRequestArgs;
use async_trait::async_trait;
use tracing::{debug, error};

use super::config::OpenAIConfig;
use super::convert;
use crate::error::{ModelError, Result};
use crate::llm::Llm;
use crate::request::{LlmRequest, LlmResponse};

const PROVIDER: &str = "OpenAI";

/// OpenAI client for the standard OpenAI API and OpenAI-compatible APIs.
///
/// Sends one non-streaming chat-completion request per [`Llm::generate`]
/// call and returns the first choice's content.
pub struct OpenAIClient {
    client: Client<AsyncOpenAIConfig>,
    model: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the API key or model is empty.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ModelError::InvalidConfig("OpenAI API key must not be empty".into()));
        }
        if config.model.is_empty() {
            return Err(ModelError::InvalidConfig("OpenAI model must not be empty".into()));
        }

        let mut openai_config = AsyncOpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(org_id) = &config.organization_id {
            openai_config = openai_config.with_org_id(org_id);
        }

        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        Ok(Self { client: Client::with_config(openai_config), model: config.model })
    }

    /// Create a client for an OpenAI-compatible API.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Self::new(OpenAIConfig::compatible(api_key, base_url, model))
    }
}

#[async_trait]
impl Llm for OpenAIClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        let messages = request
            .messages
            .iter()
            .map(convert::to_openai_message)
            .collect::<Result<Vec<_>>>()?;

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model).messages(messages);

        if let Some(config) = &request.config {
            if let Some(temp) = config.temperature {
                request_builder.temperature(temp);
            }
            if let Some(max_tokens) = config.max_tokens {
                request_builder.max_tokens(max_tokens);
            }
        }

        let openai_request = request_builder
            .build()
            .map_err(|e| ModelError::InvalidRequest(format!("failed to build request: {e}")))?;

        debug!(provider = PROVIDER, model = %self.model, "sending chat completion");

        let response = self.client.chat().create(openai_request).await.map_err(|e| {
            error!(provider = PROVIDER, model = %self.model, error = %e, "chat completion failed");
            ModelError::Api { provider: PROVIDER.into(), message: e.to_string() }
        })?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::EmptyResponse { provider: PROVIDER.into() })?;

        Ok(LlmResponse { text, model: Some(response.model) })
    }
}

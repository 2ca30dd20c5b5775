//! Mock LLM for tests and offline runs.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::llm::Llm;
use crate::request::{LlmRequest, LlmResponse};

enum Reply {
    Text(String),
    Fail(String),
}

/// An [`Llm`] that returns a canned reply and records every request.
///
/// # Example
///
/// ```rust
/// use aiconnect_model::MockLlm;
///
/// let llm = MockLlm::new("mock").with_response("canned answer");
/// assert_eq!(llm.call_count(), 0);
/// ```
pub struct MockLlm {
    name: String,
    reply: Reply,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    /// Create a mock that answers with an empty string.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reply: Reply::Text(String::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with `text`.
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.reply = Reply::Text(text.into());
        self
    }

    /// Fail every request with an API error carrying `message`.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.reply = Reply::Fail(message.into());
        self
    }

    /// Number of `generate` calls received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Copies of the requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(request);
        match &self.reply {
            Reply::Text(text) => {
                Ok(LlmResponse { text: text.clone(), model: Some(self.name.clone()) })
            }
            Reply::Fail(message) => {
                Err(ModelError::Api { provider: "mock".into(), message: message.clone() })
            }
        }
    }
}

//! The [`Llm`] trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::request::{LlmRequest, LlmResponse};

/// A chat-completion backend.
///
/// Implementations send the whole request in one call and return the
/// generated text. They do not retry; a failed call surfaces as a
/// [`ModelError`](crate::ModelError).
///
/// # Example
///
/// ```rust,ignore
/// use aiconnect_model::{Llm, LlmRequest};
///
/// let response = model.generate(LlmRequest::from_prompt("Hello")).await?;
/// println!("{}", response.text);
/// ```
#[async_trait]
pub trait Llm: Send + Sync {
    /// Model identifier used for requests and logs.
    fn name(&self) -> &str;

    /// Generate a reply for the given messages.
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse>;
}

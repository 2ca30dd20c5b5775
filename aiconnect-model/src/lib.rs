//! # aiconnect-model
//!
//! Chat-completion clients for the AI Connect assistant.
//!
//! ## Overview
//!
//! - [`Llm`] - the trait every backend implements
//! - [`OpenAIClient`] - OpenAI and OpenAI-compatible APIs (`openai` feature)
//! - [`MockLlm`] - canned replies for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aiconnect_model::openai::{OpenAIClient, OpenAIConfig};
//! use aiconnect_model::{Llm, LlmRequest};
//!
//! let model = OpenAIClient::new(OpenAIConfig::new(
//!     std::env::var("OPENAI_API_KEY")?,
//!     "gpt-4",
//! ))?;
//! let reply = model.generate(LlmRequest::from_prompt("Hello")).await?;
//! ```

pub mod error;
pub mod llm;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;
pub mod request;

pub use error::{ModelError, Result};
pub use llm::Llm;
pub use mock::MockLlm;
#[cfg(feature = "openai")]
pub use openai::{OpenAIClient, OpenAIConfig};
pub use request::{ChatMessage, GenerationConfig, LlmRequest, LlmResponse, Role};

//! OpenAI chat-completion client.
//!
//! Only available with the `openai` feature (enabled by default).

mod client;
mod config;
mod convert;

pub use client::OpenAIClient;
pub use config::{DEFAULT_MODEL, OpenAIConfig};

//! # aiconnect-cli
//!
//! The `aiconnect` command: ingest documents, ask one-off questions, or chat
//! interactively with the network-planning assistant.
//!
//! ```text
//! aiconnect ingest ./site-survey.pdf --name "Site survey" --description "Q3 drive test"
//! aiconnect ask "Which cells show the highest latency?" --show-sources
//! aiconnect chat
//! ```

pub mod console;
pub mod settings;

pub use console::{Console, ConsoleCommand, read_document};
pub use settings::{Cli, Command, EmbeddingBackend, Settings};

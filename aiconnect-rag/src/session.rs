//! Per-user chat state and the text shown for each action.
//!
//! The pipelines return typed results; this is the layer that turns them
//! (and their errors) into the messages a user sees.

use aiconnect_model::ChatMessage;
use tracing::warn;

use crate::document::UploadedDocument;
use crate::error::Result;
use crate::ingest::{IngestReport, IngestionPipeline};
use crate::query::QueryPipeline;

/// Reply given to every question before a successful login.
pub const LOGIN_REQUIRED: &str = "Please log in to use the assistant.";

/// Controls access to a [`ChatSession`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccessGate {
    /// Everyone is let in.
    #[default]
    Open,
    /// A shared password must be entered first.
    Password(String),
}

impl AccessGate {
    /// A password gate, or an open one if `password` is `None` or empty.
    pub fn from_password(password: Option<String>) -> Self {
        match password {
            Some(p) if !p.is_empty() => AccessGate::Password(p),
            _ => AccessGate::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, AccessGate::Open)
    }
}

/// One user's conversation: access state and the append-only transcript.
#[derive(Debug, Clone)]
pub struct ChatSession {
    gate: AccessGate,
    authenticated: bool,
    transcript: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(gate: AccessGate) -> Self {
        let authenticated = gate.is_open();
        Self { gate, authenticated, transcript: Vec::new() }
    }

    /// Try to unlock the session. Returns whether it is now authenticated.
    pub fn login(&mut self, password: &str) -> bool {
        if let AccessGate::Password(expected) = &self.gate {
            if expected == password {
                self.authenticated = true;
            } else {
                warn!("rejected login attempt");
            }
        }
        self.authenticated
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Every user and assistant message so far, oldest first.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Answer `question` and record both sides in the transcript.
    ///
    /// Never fails: pipeline errors are returned as `"Error: <message>"`.
    pub async fn ask(&mut self, pipeline: &QueryPipeline, question: &str) -> String {
        if !self.authenticated {
            return LOGIN_REQUIRED.to_string();
        }

        self.transcript.push(ChatMessage::user(question));
        let reply = match pipeline.answer(question).await {
            Ok(answer) => answer.to_string(),
            Err(e) => format!("Error: {e}"),
        };
        self.transcript.push(ChatMessage::assistant(reply.clone()));
        reply
    }

    /// Ingest `document` and describe the outcome.
    pub async fn upload(
        &self,
        pipeline: &IngestionPipeline,
        document: &UploadedDocument,
    ) -> String {
        if !self.authenticated {
            return LOGIN_REQUIRED.to_string();
        }
        upload_status(&pipeline.ingest(document).await)
    }
}

/// The status line shown after an upload.
pub fn upload_status(result: &Result<IngestReport>) -> String {
    match result {
        Ok(report) => report.to_string(),
        Err(e) => format!("Error processing file: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RagError;

    #[test]
    fn open_gate_starts_authenticated() {
        assert!(ChatSession::new(AccessGate::from_password(None)).is_authenticated());
        let blank = AccessGate::from_password(Some(String::new()));
        assert!(ChatSession::new(blank).is_authenticated());
    }

    #[test]
    fn password_gate_requires_the_right_password() {
        let mut session = ChatSession::new(AccessGate::Password("s3cret".into()));
        assert!(!session.is_authenticated());
        assert!(!session.login("guess"));
        assert!(session.login("s3cret"));
    }

    #[test]
    fn status_messages() {
        let ok = Ok(IngestReport::AlreadyProcessed { collection: "c".into() });
        assert_eq!(upload_status(&ok), "File already processed.");

        let err = Err(RagError::UnsupportedFormat { file_name: "a.doc".into() });
        assert!(upload_status(&err).starts_with("Error processing file: Unsupported file format"));
    }
}

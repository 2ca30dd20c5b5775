//! Interactive chat console.

use std::path::Path;

use aiconnect_model::Role;
use aiconnect_rag::{
    ChatSession, IngestionPipeline, LOGIN_REQUIRED, QueryPipeline, UploadedDocument,
};
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

const HELP: &str = "\
Type a question to ask the assistant, or one of:
  /upload <path>     add a PDF, DOCX, TXT, XLSX or CSV document
  /login <password>  unlock the session
  /history           show the conversation so far
  /help              show this message
  /quit              leave";

/// One line of console input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand<'a> {
    Ask(&'a str),
    Upload(&'a str),
    Login(&'a str),
    History,
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

impl<'a> ConsoleCommand<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return if line.is_empty() { Self::Empty } else { Self::Ask(line) };
        };
        let (name, argument) = match rest.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (rest, ""),
        };
        match name {
            "upload" if !argument.is_empty() => Self::Upload(argument),
            "login" => Self::Login(argument),
            "history" => Self::History,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line),
        }
    }
}

/// A chat session wired to the pipelines.
pub struct Console {
    session: ChatSession,
    ingestion: IngestionPipeline,
    query: QueryPipeline,
}

impl Console {
    pub fn new(session: ChatSession, ingestion: IngestionPipeline, query: QueryPipeline) -> Self {
        Self { session, ingestion, query }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Handle one line of input. Returns `None` when the user wants to leave.
    pub async fn handle(&mut self, line: &str) -> Option<String> {
        let reply = match ConsoleCommand::parse(line) {
            ConsoleCommand::Quit => return None,
            ConsoleCommand::Empty => String::new(),
            ConsoleCommand::Ask(question) => self.session.ask(&self.query, question).await,
            ConsoleCommand::Upload(path) => self.upload(Path::new(path)).await,
            ConsoleCommand::Login(password) => self.login(password).to_string(),
            ConsoleCommand::History => self.history(),
            ConsoleCommand::Help => HELP.to_string(),
            ConsoleCommand::Unknown(input) => format!("Unknown command: {input}. Try /help."),
        };
        Some(reply)
    }

    fn login(&mut self, password: &str) -> &'static str {
        if self.session.login(password) { "Logged in." } else { "Incorrect password." }
    }

    async fn upload(&self, path: &Path) -> String {
        if !self.session.is_authenticated() {
            return LOGIN_REQUIRED.to_string();
        }
        match read_document(path, None, None).await {
            Ok(document) => self.session.upload(&self.ingestion, &document).await,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read upload");
                format!("Error processing file: {e}")
            }
        }
    }

    fn history(&self) -> String {
        if self.session.transcript().is_empty() {
            return "No messages yet.".to_string();
        }
        self.session
            .transcript()
            .iter()
            .map(|message| {
                let speaker = match message.role {
                    Role::User => "You",
                    Role::Assistant | Role::System => "Assistant",
                };
                format!("{speaker}: {}", message.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Read lines until `/quit`, end of input or Ctrl-C.
    pub async fn run(mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;
        println!("AI Connect assistant. Type /help for commands.\n");

        if !self.session.is_authenticated() {
            match editor.readline("Password: ") {
                Ok(password) => println!("{}\n", self.login(&password)),
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }

        loop {
            let line = match editor.readline("You > ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };
            if !line.trim().is_empty() {
                let _ = editor.add_history_entry(line.as_str());
            }
            match self.handle(&line).await {
                Some(reply) if reply.is_empty() => {}
                Some(reply) => println!("\n{reply}\n"),
                None => break,
            }
        }
        Ok(())
    }
}

/// Load a file from disk as an upload, named after the file unless `name`
/// is given.
pub async fn read_document(
    path: &Path,
    name: Option<String>,
    description: Option<String>,
) -> std::io::Result<UploadedDocument> {
    let content = tokio::fs::read(path).await?;
    let file_name =
        path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let mut document = UploadedDocument::new(content, file_name.clone());
    document = document.with_name(name.unwrap_or(file_name));
    if let Some(description) = description {
        document = document.with_description(description);
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            ConsoleCommand::parse("  where is latency high? "),
            ConsoleCommand::Ask("where is latency high?")
        );
        assert_eq!(
            ConsoleCommand::parse("/upload  ./cells.csv"),
            ConsoleCommand::Upload("./cells.csv")
        );
        assert_eq!(ConsoleCommand::parse("/login s3cret"), ConsoleCommand::Login("s3cret"));
        assert_eq!(ConsoleCommand::parse("/history"), ConsoleCommand::History);
        assert_eq!(ConsoleCommand::parse("/exit"), ConsoleCommand::Quit);
        assert_eq!(ConsoleCommand::parse("   "), ConsoleCommand::Empty);
        assert_eq!(ConsoleCommand::parse("/upload"), ConsoleCommand::Unknown("/upload"));
        assert_eq!(ConsoleCommand::parse("/dance"), ConsoleCommand::Unknown("/dance"));
    }
}

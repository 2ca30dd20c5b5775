use std::sync::Arc;

use aiconnect_cli::Console;
use aiconnect_model::MockLlm;
use aiconnect_rag::{
    AccessGate, ChatSession, EmbeddingProvider, IngestionPipeline, InMemoryVectorStore,
    LOGIN_REQUIRED, QueryPipeline, Result, VectorStore,
};
use async_trait::async_trait;

/// Two-axis embedder: "latency" lines point one way, everything else the other.
struct LatencyEmbedder;

#[async_trait]
impl EmbeddingProvider for LatencyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(if text.contains("latency") { vec![1.0, 0.1] } else { vec![0.1, 1.0] })
    }

    fn dimensions(&self) -> usize {
        2
    }
}

fn console(gate: AccessGate, store: Arc<InMemoryVectorStore>, llm: MockLlm) -> Console {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(LatencyEmbedder);
    let ingestion = IngestionPipeline::builder()
        .embedding_provider(embedder.clone())
        .vector_store(store.clone())
        .build()
        .unwrap();
    let query = QueryPipeline::builder()
        .embedding_provider(embedder)
        .vector_store(store)
        .llm(Arc::new(llm))
        .build()
        .unwrap();
    Console::new(ChatSession::new(gate), ingestion, query)
}

#[tokio::test]
async fn upload_then_ask_then_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cells.csv");
    std::fs::write(&path, "cell,latency_ms\nA1,12\nB7,48\n").unwrap();

    let store = Arc::new(InMemoryVectorStore::new());
    let mut console =
        console(AccessGate::Open, store.clone(), MockLlm::new("mock").with_response("Check B7."));

    let status = console.handle(&format!("/upload {}", path.display())).await.unwrap();
    assert_eq!(status, "File processed successfully.");
    assert_eq!(store.list_collections().await.unwrap().len(), 1);

    let again = console.handle(&format!("/upload {}", path.display())).await.unwrap();
    assert_eq!(again, "File already processed.");

    let reply = console.handle("Which cell has the worst latency?").await.unwrap();
    assert_eq!(reply, "Check B7.");

    let history = console.handle("/history").await.unwrap();
    assert_eq!(history, "You: Which cell has the worst latency?\nAssistant: Check B7.");
}

#[tokio::test]
async fn missing_file_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let mut console =
        console(AccessGate::Open, Arc::new(InMemoryVectorStore::new()), MockLlm::new("mock"));

    let missing = dir.path().join("absent.pdf");
    let status = console.handle(&format!("/upload {}", missing.display())).await.unwrap();
    assert!(status.starts_with("Error processing file: "), "{status}");
}

#[tokio::test]
async fn locked_console_requires_login() {
    let mut console = console(
        AccessGate::Password("letmein".into()),
        Arc::new(InMemoryVectorStore::new()),
        MockLlm::new("mock"),
    );

    assert_eq!(console.handle("hello?").await.unwrap(), LOGIN_REQUIRED);
    assert_eq!(console.handle("/upload ./nowhere.txt").await.unwrap(), LOGIN_REQUIRED);
    assert_eq!(console.handle("/login nope").await.unwrap(), "Incorrect password.");
    assert_eq!(console.handle("/login letmein").await.unwrap(), "Logged in.");
    assert!(console.session().is_authenticated());
    assert_eq!(console.handle("/history").await.unwrap(), "No messages yet.");
}

#[tokio::test]
async fn quit_ends_the_loop() {
    let mut console =
        console(AccessGate::Open, Arc::new(InMemoryVectorStore::new()), MockLlm::new("mock"));
    assert!(console.handle("/quit").await.is_none());
    assert_eq!(console.handle("").await.unwrap(), "");
}

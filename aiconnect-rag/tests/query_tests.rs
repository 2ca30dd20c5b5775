//! Query pipeline and chat session behavior.

mod common;

use std::sync::Arc;

use aiconnect_model::{MockLlm, Role};
use aiconnect_rag::{
    AccessGate, Answer, ChatSession, ChunkMetadata, IngestionPipeline, InMemoryVectorStore,
    LOGIN_REQUIRED, NO_RELEVANT_DOCUMENTS, QueryPipeline, RagConfig, RecordFields, SearchHit,
    UploadedDocument, merge_hits,
};
use common::CountingEmbedder;
use proptest::prelude::*;

const KEYWORDS: &[&str] = &["latency", "handover", "backhaul"];

struct Fixture {
    embedder: Arc<CountingEmbedder>,
    store: Arc<InMemoryVectorStore>,
    llm: Arc<MockLlm>,
    query: QueryPipeline,
}

fn fixture(llm: MockLlm) -> Fixture {
    let embedder = Arc::new(CountingEmbedder::new(KEYWORDS));
    let store = Arc::new(InMemoryVectorStore::new());
    let llm = Arc::new(llm);
    let query = QueryPipeline::builder()
        .embedding_provider(embedder.clone())
        .vector_store(store.clone())
        .llm(llm.clone())
        .build()
        .unwrap();
    Fixture { embedder, store, llm, query }
}

async fn ingest(fixture: &Fixture, content: &str, file_name: &str) {
    let ingestion = IngestionPipeline::builder()
        .embedding_provider(fixture.embedder.clone())
        .vector_store(fixture.store.clone())
        .build()
        .unwrap();
    ingestion.ingest(&UploadedDocument::new(content.as_bytes(), file_name)).await.unwrap();
}

#[tokio::test]
async fn empty_store_returns_the_sentinel_without_calls() {
    let f = fixture(MockLlm::new("mock").with_response("should not be used"));

    let answer = f.query.answer("Where is latency high?").await.unwrap();

    assert_eq!(answer, Answer::NoRelevantDocuments);
    assert_eq!(answer.to_string(), NO_RELEVANT_DOCUMENTS);
    assert_eq!(f.embedder.calls(), 0);
    assert_eq!(f.llm.call_count(), 0);
}

#[tokio::test]
async fn blank_question_returns_the_sentinel_without_calls() {
    let f = fixture(MockLlm::new("mock"));
    ingest(&f, "latency is high in sector 4\n", "notes.txt").await;
    let calls_after_ingest = f.embedder.calls();

    for question in ["", "   ", "\n\t"] {
        assert_eq!(f.query.answer(question).await.unwrap(), Answer::NoRelevantDocuments);
    }
    assert_eq!(f.embedder.calls(), calls_after_ingest);
    assert_eq!(f.llm.call_count(), 0);
}

#[tokio::test]
async fn best_five_passages_across_collections_reach_the_prompt() {
    let f = fixture(MockLlm::new("mock").with_response("  Rebalance sector 4.\n"));
    ingest(
        &f,
        "latency spikes at site 1\nlatency spikes at site 2\nhandover failures at site 3\n",
        "radio.txt",
    )
    .await;
    ingest(
        &f,
        "latency budget exceeded on link 7\nbackhaul saturated on link 8\nlatency ok on link 9\n",
        "transport.txt",
    )
    .await;

    let answer = f.query.answer("Where is latency worst?").await.unwrap();

    let Answer::Generated { text, sources } = &answer else {
        panic!("expected a generated answer, got {answer:?}");
    };
    assert_eq!(text, "Rebalance sector 4.");
    assert_eq!(sources.len(), 5);
    assert!(sources.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(sources[..4].iter().all(|hit| hit.text.contains("latency")));
    let collections: std::collections::HashSet<&str> =
        sources.iter().map(|hit| hit.collection.as_str()).collect();
    assert_eq!(collections.len(), 2);

    // Query embedded once, LLM called once with a single user message.
    assert_eq!(f.embedder.calls(), 6 + 1);
    let requests = f.llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages.len(), 1);
    assert_eq!(requests[0].messages[0].role, Role::User);
    let prompt = &requests[0].messages[0].content;
    assert!(prompt.contains("### Question:\nWhere is latency worst?"));
    assert!(prompt.contains("Document 5:"));
    assert!(!prompt.contains("Document 6:"));
    let config = requests[0].config.unwrap();
    assert_eq!(config.max_tokens, Some(500));
}

#[tokio::test]
async fn context_size_follows_the_config() {
    let embedder = Arc::new(CountingEmbedder::new(KEYWORDS));
    let store = Arc::new(InMemoryVectorStore::new());
    let llm = Arc::new(MockLlm::new("mock").with_response("ok"));
    let query = QueryPipeline::builder()
        .config(RagConfig::builder().max_context_documents(2).build().unwrap())
        .embedding_provider(embedder.clone())
        .vector_store(store.clone())
        .llm(llm.clone())
        .build()
        .unwrap();
    let f = Fixture { embedder, store, llm, query };
    ingest(&f, "a latency\nb latency\nc latency\n", "a.txt").await;

    let answer = f.query.answer("latency?").await.unwrap();
    assert_eq!(answer.sources().len(), 2);
}

#[tokio::test]
async fn llm_failure_is_reported_as_text_by_the_session() {
    let f = fixture(MockLlm::new("mock").with_error("rate limit reached"));
    ingest(&f, "backhaul saturated\n", "links.txt").await;

    assert!(f.query.answer("backhaul?").await.is_err());

    let mut session = ChatSession::new(AccessGate::Open);
    let reply = session.ask(&f.query, "backhaul?").await;
    assert!(reply.starts_with("Error: "), "{reply}");
    assert!(reply.contains("rate limit reached"), "{reply}");
    assert_eq!(session.transcript().len(), 2);
}

#[tokio::test]
async fn session_records_the_conversation_in_order() {
    let f = fixture(MockLlm::new("mock").with_response("Add a small cell."));
    ingest(&f, "handover failures near the stadium\n", "events.txt").await;

    let mut session = ChatSession::new(AccessGate::Open);
    session.ask(&f.query, "handover issues?").await;
    session.ask(&f.query, "").await;

    let roles: Vec<Role> = session.transcript().iter().map(|m| m.role).collect();
    assert_eq!(roles, [Role::User, Role::Assistant, Role::User, Role::Assistant]);
    assert_eq!(session.transcript()[1].content, "Add a small cell.");
    assert_eq!(session.transcript()[3].content, NO_RELEVANT_DOCUMENTS);
}

#[tokio::test]
async fn locked_session_answers_nothing_until_login() {
    let f = fixture(MockLlm::new("mock").with_response("ok"));
    let mut session = ChatSession::new(AccessGate::Password("letmein".to_string()));

    assert_eq!(session.ask(&f.query, "anything").await, LOGIN_REQUIRED);
    assert!(session.transcript().is_empty());

    assert!(session.login("letmein"));
    assert_eq!(session.ask(&f.query, "anything").await, NO_RELEVANT_DOCUMENTS);
}

fn arb_hit() -> impl Strategy<Value = SearchHit> {
    ("[a-c]", 0u64..1000, -10.0f32..10.0f32).prop_map(|(collection, id, score)| SearchHit {
        collection,
        id,
        score,
        text: format!("passage {id}"),
        metadata: ChunkMetadata::None,
        fields: RecordFields::default(),
    })
}

/// Merging never returns more than the limit and never drops a better hit
/// in favor of a worse one.
mod prop_merge_ordering {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn merged_hits_are_descending_bounded_and_best(
            hits in proptest::collection::vec(arb_hit(), 0..40),
            limit in 1usize..10,
        ) {
            let merged = merge_hits(hits.clone(), limit);

            prop_assert!(merged.len() <= limit);
            prop_assert_eq!(merged.len(), hits.len().min(limit));
            for window in merged.windows(2) {
                prop_assert!(window[0].score >= window[1].score);
            }
            if let Some(last) = merged.last() {
                let strictly_better = hits.iter().filter(|h| h.score > last.score).count();
                prop_assert!(strictly_better < merged.len());
            }
        }
    }
}

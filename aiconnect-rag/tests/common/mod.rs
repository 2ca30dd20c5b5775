//! Shared test doubles.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use aiconnect_rag::{
    CollectionSchema, EmbeddingProvider, EmbeddingRecord, InMemoryVectorStore, RagError, Result,
    SearchHit, VectorStore,
};
use async_trait::async_trait;

/// Deterministic embedder that counts its calls.
///
/// Texts containing a known keyword map to that keyword's axis, so tests
/// can steer which passages rank highest.
pub struct CountingEmbedder {
    calls: AtomicUsize,
    dimensions: usize,
    keywords: Vec<&'static str>,
}

impl CountingEmbedder {
    pub fn new(keywords: &[&'static str]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            dimensions: keywords.len() + 1,
            keywords: keywords.to_vec(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vector = vec![0.0; self.dimensions];
        for (axis, keyword) in self.keywords.iter().enumerate() {
            if text.contains(keyword) {
                vector[axis] += 1.0;
            }
        }
        // Small constant component keeps every vector non-zero.
        vector[self.dimensions - 1] = 0.1;
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Embedder that always fails.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::EmbeddingError {
            provider: "failing".to_string(),
            message: "service unavailable".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        4
    }
}

/// Embedder whose vectors are narrower than it claims.
pub struct ShortEmbedder;

#[async_trait]
impl EmbeddingProvider for ShortEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        3
    }
}

/// Which store call a [`FlakyStore`] refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Insert,
    Load,
}

/// In-memory store that fails one step of filling a collection.
pub struct FlakyStore {
    pub inner: InMemoryVectorStore,
    fail_at: FailAt,
}

impl FlakyStore {
    pub fn new(fail_at: FailAt) -> Self {
        Self { inner: InMemoryVectorStore::new(), fail_at }
    }

    fn refuse(&self, step: FailAt) -> Result<()> {
        if self.fail_at == step {
            return Err(RagError::VectorStoreError {
                backend: "flaky".to_string(),
                message: format!("{step:?} rejected"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for FlakyStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        self.inner.collection_exists(name).await
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        self.inner.list_collections().await
    }

    async fn create_collection(&self, name: &str, schema: &CollectionSchema) -> Result<()> {
        self.inner.create_collection(name, schema).await
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.inner.delete_collection(name).await
    }

    async fn insert(&self, collection: &str, records: &[EmbeddingRecord]) -> Result<Vec<u64>> {
        self.refuse(FailAt::Insert)?;
        self.inner.insert(collection, records).await
    }

    async fn load(&self, collection: &str) -> Result<()> {
        self.refuse(FailAt::Load)?;
        self.inner.load(collection).await
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        self.inner.search(collection, vector, top_k).await
    }
}

//! In-memory vector store.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency vector store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is suitable
//! for development, testing, and single-process use. The collection logic is
//! shared with the [local directory store](crate::local).

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::document::{EmbeddingRecord, SearchHit};
use crate::error::{RagError, Result};
use crate::schema::CollectionSchema;
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

/// A record plus the primary key it was assigned on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredRecord {
    pub id: u64,
    #[serde(flatten)]
    pub record: EmbeddingRecord,
}

/// The contents of one collection: schema, load state and records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredCollection {
    pub schema: CollectionSchema,
    #[serde(default)]
    pub loaded: bool,
    pub next_id: u64,
    #[serde(default)]
    pub records: Vec<StoredRecord>,
}

impl StoredCollection {
    pub fn new(schema: CollectionSchema) -> Self {
        Self { schema, loaded: false, next_id: 1, records: Vec::new() }
    }

    /// Append `records` with consecutive ids. The batch is validated first so
    /// a bad vector leaves the collection untouched.
    pub fn insert(
        &mut self,
        backend: &str,
        name: &str,
        records: &[EmbeddingRecord],
    ) -> Result<Vec<u64>> {
        self.schema.check_records(backend, name, records)?;

        let ids: Vec<u64> = (self.next_id..self.next_id + records.len() as u64).collect();
        self.next_id += records.len() as u64;
        self.records.extend(
            ids.iter()
                .zip(records)
                .map(|(id, record)| StoredRecord { id: *id, record: record.clone() }),
        );
        Ok(ids)
    }

    /// Score every record with the collection's metric and keep the best
    /// `top_k`. A collection that was never loaded yields no hits.
    pub fn search(
        &self,
        backend: &str,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        if !self.loaded {
            return Ok(Vec::new());
        }
        let dimensions = self.schema.validate()?;
        if vector.len() != dimensions {
            return Err(RagError::store(
                backend,
                format!(
                    "query vector has {} dimensions, collection '{name}' expects {dimensions}",
                    vector.len()
                ),
            ));
        }

        let metric = self.schema.metric;
        let mut scored: Vec<SearchHit> = self
            .records
            .iter()
            .map(|stored| SearchHit {
                collection: name.to_string(),
                id: stored.id,
                score: metric.score(&stored.record.vector, vector),
                text: stored.record.text.clone(),
                metadata: stored.record.metadata.clone(),
                fields: stored.record.fields,
            })
            .filter(|hit| !hit.score.is_nan())
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}

pub(crate) fn missing_collection(backend: &str, name: &str) -> RagError {
    RagError::store(backend, format!("collection '{name}' does not exist"))
}

pub(crate) fn duplicate_collection(backend: &str, name: &str) -> RagError {
    RagError::store(backend, format!("collection '{name}' already exists"))
}

/// An in-memory vector store.
///
/// Collections are stored in a `HashMap` keyed by name. All operations are
/// async-safe via `tokio::sync::RwLock`.
///
/// # Example
///
/// ```rust,ignore
/// use aiconnect_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// assert!(store.list_collections().await?.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, StoredCollection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection, if it exists.
    pub async fn record_count(&self, collection: &str) -> Option<usize> {
        self.collections.read().await.get(collection).map(|c| c.records.len())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collections.read().await.contains_key(name))
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_collection(&self, name: &str, schema: &CollectionSchema) -> Result<()> {
        schema.validate()?;
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Err(duplicate_collection(BACKEND, name));
        }
        collections.insert(name.to_string(), StoredCollection::new(schema.clone()));
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.write().await.remove(name);
        Ok(())
    }

    async fn insert(&self, collection: &str, records: &[EmbeddingRecord]) -> Result<Vec<u64>> {
        let mut collections = self.collections.write().await;
        let stored =
            collections.get_mut(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;
        stored.insert(BACKEND, collection, records)
    }

    async fn load(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        let stored =
            collections.get_mut(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;
        stored.loaded = true;
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let collections = self.collections.read().await;
        let stored =
            collections.get(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;
        stored.search(BACKEND, collection, vector, top_k)
    }
}

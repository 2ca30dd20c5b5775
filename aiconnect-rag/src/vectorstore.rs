//! Vector store trait for storing and searching vector embeddings.

use async_trait::async_trait;

use crate::document::{EmbeddingRecord, SearchHit};
use crate::error::Result;
use crate::schema::CollectionSchema;

/// A storage backend for vector embeddings with similarity search.
///
/// Implementations manage named collections of [`EmbeddingRecord`]s. A
/// collection is created once with a [`CollectionSchema`], filled with one
/// [`insert`](VectorStore::insert) batch, [`load`](VectorStore::load)ed, and
/// from then on only searched.
///
/// # Example
///
/// ```rust,ignore
/// use aiconnect_rag::{CollectionSchema, InMemoryVectorStore, Metric, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// let schema = CollectionSchema::document_embeddings(384, Metric::InnerProduct);
/// store.create_collection("collection_abc", &schema).await?;
/// store.insert("collection_abc", &records).await?;
/// store.load("collection_abc").await?;
/// let hits = store.search("collection_abc", &query_embedding, 100).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Whether a collection with this name exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Names of every collection in the store, in a stable order.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Create a named collection.
    ///
    /// Fails if the schema is invalid or the collection already exists.
    async fn create_collection(&self, name: &str, schema: &CollectionSchema) -> Result<()>;

    /// Remove a collection and its records. Removing a missing collection
    /// is not an error.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Insert records and return the primary keys the store assigned.
    ///
    /// Every vector must have the schema's dimension; a mismatch rejects the
    /// whole batch.
    async fn insert(&self, collection: &str, records: &[EmbeddingRecord]) -> Result<Vec<u64>>;

    /// Make a collection searchable. Backends that serve queries straight
    /// away keep the default no-op.
    async fn load(&self, _collection: &str) -> Result<()> {
        Ok(())
    }

    /// Search for the `top_k` most similar records to the given vector using
    /// the collection's metric.
    ///
    /// Returns hits ordered by descending score.
    async fn search(&self, collection: &str, vector: &[f32], top_k: usize)
    -> Result<Vec<SearchHit>>;
}

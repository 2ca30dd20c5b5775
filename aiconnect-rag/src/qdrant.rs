//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`] which implements [`VectorStore`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//!
//! # Example
//!
//! ```rust,ignore
//! use aiconnect_rag::qdrant::QdrantVectorStore;
//!
//! let store = QdrantVectorStore::new("http://localhost:6334")?;
//! store.create_collection("collection_abc", &schema).await?;
//! store.insert("collection_abc", &records).await?;
//! let hits = store.search("collection_abc", &query_embedding, 100).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use tracing::debug;

use crate::document::{ChunkMetadata, EmbeddingRecord, RecordFields, SearchHit};
use crate::error::{RagError, Result};
use crate::inmemory::duplicate_collection;
use crate::schema::{CollectionSchema, Metric};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "qdrant";

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// Wraps a [`qdrant_client::Qdrant`] client. Each collection becomes a Qdrant
/// collection whose distance follows the schema metric; chunk text, metadata
/// and the scalar record fields are stored as point payload. Point ids are
/// numeric and continue from the collection's point count.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Create a new Qdrant vector store connecting to the given URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Create a new Qdrant vector store with default URL (`http://localhost:6334`).
    pub fn default_url() -> Result<Self> {
        Self::new("http://localhost:6334")
    }

    /// Create a new Qdrant vector store from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::store(BACKEND, e.to_string())
    }

    fn distance(metric: Metric) -> Distance {
        match metric {
            Metric::InnerProduct => Distance::Dot,
            Metric::Cosine => Distance::Cosine,
        }
    }

    fn payload(record: &EmbeddingRecord) -> Result<Payload> {
        let metadata = serde_json::to_string(&record.metadata)
            .map_err(|e| RagError::store(BACKEND, format!("failed to encode metadata: {e}")))?;
        let fields = record.fields;
        let value = json!({
            "text": record.text,
            "metadata": metadata,
            "file_name_hash": fields.file_name_hash,
            "document_name_hash": fields.document_name_hash,
            "document_description_hash": fields.document_description_hash,
            "metadata_hash": fields.metadata_hash,
            "file_size": fields.file_size,
        });
        Payload::try_from(value).map_err(Self::map_err)
    }

    /// Extract a string from a Qdrant payload value.
    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn extract_integer(payload: &HashMap<String, QdrantValue>, key: &str) -> i64 {
        match payload.get(key).and_then(|v| v.kind.as_ref()) {
            Some(Kind::IntegerValue(n)) => *n,
            _ => 0,
        }
    }

    async fn point_count(&self, collection: &str) -> Result<u64> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(Self::map_err)?;
        Ok(response.result.map(|r| r.count).unwrap_or_default())
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        Ok(collections.collections.iter().any(|c| c.name == name))
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        let mut names: Vec<String> = collections.collections.into_iter().map(|c| c.name).collect();
        names.sort();
        Ok(names)
    }

    async fn create_collection(&self, name: &str, schema: &CollectionSchema) -> Result<()> {
        let dimensions = schema.validate()?;
        if self.collection_exists(name).await? {
            return Err(duplicate_collection(BACKEND, name));
        }

        self.client
            .create_collection(CreateCollectionBuilder::new(name).vectors_config(
                VectorParamsBuilder::new(dimensions as u64, Self::distance(schema.metric)),
            ))
            .await
            .map_err(Self::map_err)?;

        debug!(collection = name, dimensions, metric = %schema.metric, "created qdrant collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        if !self.collection_exists(name).await? {
            return Ok(());
        }
        self.client.delete_collection(name).await.map_err(Self::map_err)?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn insert(&self, collection: &str, records: &[EmbeddingRecord]) -> Result<Vec<u64>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let first_id = self.point_count(collection).await? + 1;
        let ids: Vec<u64> = (first_id..first_id + records.len() as u64).collect();
        let points = ids
            .iter()
            .zip(records)
            .map(|(id, record)| {
                Ok(PointStruct::new(*id, record.vector.clone(), Self::payload(record)?))
            })
            .collect::<Result<Vec<_>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count = records.len(), "inserted records into qdrant");
        Ok(ids)
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let hits = response
            .result
            .into_iter()
            .map(|scored| {
                let id = match scored.id.as_ref().and_then(|pid| pid.point_id_options.as_ref()) {
                    Some(PointIdOptions::Num(n)) => *n,
                    _ => 0,
                };

                let text =
                    scored.payload.get("text").and_then(Self::extract_string).unwrap_or_default();

                let metadata: ChunkMetadata = scored
                    .payload
                    .get("metadata")
                    .and_then(Self::extract_string)
                    .and_then(|s| serde_json::from_str(&s).ok())
                    .unwrap_or_default();

                let payload = &scored.payload;
                let fields = RecordFields {
                    file_name_hash: Self::extract_integer(payload, "file_name_hash"),
                    document_name_hash: Self::extract_integer(payload, "document_name_hash"),
                    document_description_hash: Self::extract_integer(
                        payload,
                        "document_description_hash",
                    ),
                    metadata_hash: Self::extract_integer(payload, "metadata_hash"),
                    file_size: Self::extract_integer(payload, "file_size").max(0) as u64,
                };

                SearchHit {
                    collection: collection.to_string(),
                    id,
                    score: scored.score,
                    text,
                    metadata,
                    fields,
                }
            })
            .collect();

        Ok(hits)
    }
}

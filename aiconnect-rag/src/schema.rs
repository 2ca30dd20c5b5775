//! Collection schemas and similarity metrics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::EmbeddingRecord;
use crate::error::{RagError, Result};

/// Similarity metric used to score a stored vector against a query vector.
///
/// Both metrics produce "higher is more relevant" scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Plain dot product. Equals cosine similarity for unit-length vectors.
    #[default]
    InnerProduct,
    /// Dot product of the L2-normalized vectors.
    Cosine,
}

impl Metric {
    /// Score `a` against `b`. Vectors of different length only contribute
    /// their common prefix.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::InnerProduct => dot(a, b),
            Metric::Cosine => cosine_similarity(a, b),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::InnerProduct => f.write_str("inner_product"),
            Metric::Cosine => f.write_str("cosine"),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

/// Data type of one schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FieldType {
    Int64,
    FloatVector { dimensions: usize },
    VarChar { max_length: usize },
    Json,
}

/// One named field of a [`CollectionSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(flatten)]
    pub field_type: FieldType,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub auto_id: bool,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self { name: name.into(), field_type, is_primary: false, auto_id: false }
    }

    /// An auto-incrementing `Int64` primary key.
    pub fn auto_primary_key(name: impl Into<String>) -> Self {
        Self { name: name.into(), field_type: FieldType::Int64, is_primary: true, auto_id: true }
    }
}

/// Field layout and metric of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub description: String,
    pub fields: Vec<FieldSchema>,
    pub metric: Metric,
}

impl CollectionSchema {
    /// Largest chunk text accepted by the `text` field.
    pub const MAX_TEXT_LENGTH: usize = 65_535;

    /// The fixed layout used for every ingested document: auto-id primary
    /// key, the embedding vector, chunk text and metadata, and the scalar
    /// [`RecordFields`](crate::RecordFields).
    pub fn document_embeddings(dimensions: usize, metric: Metric) -> Self {
        Self {
            description: "Document embeddings".to_string(),
            fields: vec![
                FieldSchema::auto_primary_key("pk"),
                FieldSchema::new("embedding", FieldType::FloatVector { dimensions }),
                FieldSchema::new("text", FieldType::VarChar { max_length: Self::MAX_TEXT_LENGTH }),
                FieldSchema::new("metadata", FieldType::Json),
                FieldSchema::new("file_name_hash", FieldType::Int64),
                FieldSchema::new("document_name_hash", FieldType::Int64),
                FieldSchema::new("document_description_hash", FieldType::Int64),
                FieldSchema::new("metadata_hash", FieldType::Int64),
                FieldSchema::new("file_size", FieldType::Int64),
            ],
            metric,
        }
    }

    /// Width of the vector field.
    pub fn dimensions(&self) -> Option<usize> {
        self.fields.iter().find_map(|f| match f.field_type {
            FieldType::FloatVector { dimensions } => Some(dimensions),
            _ => None,
        })
    }

    /// Check the schema has exactly one primary key and exactly one non-empty
    /// vector field.
    pub fn validate(&self) -> Result<usize> {
        let primaries = self.fields.iter().filter(|f| f.is_primary).count();
        if primaries != 1 {
            return Err(RagError::ConfigError(format!(
                "schema must have exactly one primary key, found {primaries}"
            )));
        }
        let vectors: Vec<usize> = self
            .fields
            .iter()
            .filter_map(|f| match f.field_type {
                FieldType::FloatVector { dimensions } => Some(dimensions),
                _ => None,
            })
            .collect();
        match vectors.as_slice() {
            [dimensions] if *dimensions > 0 => Ok(*dimensions),
            [_] => Err(RagError::ConfigError("vector field must have dimensions > 0".to_string())),
            other => Err(RagError::ConfigError(format!(
                "schema must have exactly one vector field, found {}",
                other.len()
            ))),
        }
    }

    /// Check a batch against the vector width and the text limit. Returns the
    /// width. Any bad record rejects the whole batch.
    pub fn check_records(
        &self,
        backend: &str,
        collection: &str,
        records: &[EmbeddingRecord],
    ) -> Result<usize> {
        let dimensions = self.validate()?;
        for (position, record) in records.iter().enumerate() {
            if record.vector.len() != dimensions {
                return Err(RagError::store(
                    backend,
                    format!(
                        "record {position} of '{collection}' has {} dims, expected {dimensions}",
                        record.vector.len()
                    ),
                ));
            }
            if record.text.len() > Self::MAX_TEXT_LENGTH {
                return Err(RagError::store(
                    backend,
                    format!(
                        "record {position} for collection '{collection}' exceeds {} bytes of text",
                        Self::MAX_TEXT_LENGTH
                    ),
                ));
            }
        }
        Ok(dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_schema_is_valid() {
        let schema = CollectionSchema::document_embeddings(384, Metric::InnerProduct);
        assert_eq!(schema.validate().unwrap(), 384);
        assert_eq!(schema.dimensions(), Some(384));
    }

    #[test]
    fn zero_dimension_schema_is_rejected() {
        let schema = CollectionSchema::document_embeddings(0, Metric::Cosine);
        assert!(schema.validate().is_err());
    }

    #[test]
    fn metrics_score_higher_for_closer_vectors() {
        let q = [1.0, 0.0];
        for metric in [Metric::InnerProduct, Metric::Cosine] {
            assert!(metric.score(&q, &[0.9, 0.1]) > metric.score(&q, &[0.1, 0.9]));
        }
        assert_eq!(Metric::Cosine.score(&q, &[0.0, 0.0]), 0.0);
    }
}

//! Data types for uploaded documents, extracted chunks, stored records and
//! search hits.

use serde::{Deserialize, Serialize};

/// Prefix of every collection name derived from document content.
pub const COLLECTION_PREFIX: &str = "collection_";

/// One uploaded file plus the name and description the user gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    /// Raw file bytes.
    pub content: Vec<u8>,
    /// Original file name; its suffix selects the extractor.
    pub file_name: String,
    /// User-supplied document name.
    pub name: String,
    /// User-supplied free-text description.
    pub description: String,
}

impl UploadedDocument {
    /// Create a document with an empty name and description.
    pub fn new(content: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            file_name: file_name.into(),
            name: String::new(),
            description: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Lowercase hex MD5 of the raw content.
    pub fn content_hash(&self) -> String {
        content_hash(&self.content)
    }

    /// Collection that holds (or will hold) this content's embeddings.
    pub fn collection_id(&self) -> String {
        collection_id_for(&self.content)
    }

    pub fn file_size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Lowercase hex MD5 digest of `content`.
pub fn content_hash(content: &[u8]) -> String {
    format!("{:x}", md5::compute(content))
}

/// Deterministic collection name for `content`: `collection_<md5 hex>`.
///
/// Identical bytes always map to the same collection, whatever the file is
/// called.
pub fn collection_id_for(content: &[u8]) -> String {
    format!("{COLLECTION_PREFIX}{}", content_hash(content))
}

/// Map a string onto a non-negative `i64` taken from the first eight bytes
/// of its MD5 digest.
pub fn bounded_hash(value: &str) -> i64 {
    let digest = md5::compute(value.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.0[..8]);
    i64::from_be_bytes(prefix) & i64::MAX
}

/// Where a chunk came from inside its document.
///
/// Serialized with the external tag as key, e.g. `{"page_number": 3}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkMetadata {
    /// No positional information (plain text lines).
    #[default]
    None,
    /// 1-based PDF page number.
    PageNumber(u32),
    /// 1-based DOCX body paragraph number.
    ParagraphNumber(u32),
    /// Spreadsheet sheet the row was read from.
    SheetName(String),
    /// 0-based data-row index in a CSV file.
    RowIndex(usize),
}

/// One unit of extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl ExtractedChunk {
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self { text: text.into(), metadata }
    }
}

/// Scalar fields stored alongside every vector of a document.
///
/// All records of one document carry the same values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub file_name_hash: i64,
    pub document_name_hash: i64,
    pub document_description_hash: i64,
    /// Hash of the serialized metadata list of the whole extraction.
    pub metadata_hash: i64,
    /// Byte length of the uploaded file.
    pub file_size: u64,
}

impl RecordFields {
    /// Derive the fields for `document` given the metadata of all its chunks.
    pub fn for_document(
        document: &UploadedDocument,
        metadatas: &[&ChunkMetadata],
    ) -> serde_json::Result<Self> {
        let serialized = serde_json::to_string(metadatas)?;
        Ok(Self {
            file_name_hash: bounded_hash(&document.file_name),
            document_name_hash: bounded_hash(&document.name),
            document_description_hash: bounded_hash(&document.description),
            metadata_hash: bounded_hash(&serialized),
            file_size: document.file_size(),
        })
    }
}

/// One vector to persist, with the text and metadata it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub fields: RecordFields,
}

/// A stored record returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Collection the hit was found in.
    pub collection: String,
    /// Primary key assigned by the store.
    pub id: u64,
    /// Similarity score (higher is more relevant).
    pub score: f32,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub fields: RecordFields,
}

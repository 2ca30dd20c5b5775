//! Text extraction from uploaded files.
//!
//! [`DocumentFormat`] picks the handler from the file name; [`extract`] turns
//! the raw bytes into ordered [`ExtractedChunk`]s:
//!
//! | Format | Chunk | Metadata |
//! |--------|-------|----------|
//! | PDF    | one page with text | page number |
//! | DOCX   | one non-blank body paragraph | paragraph number |
//! | TXT    | one non-blank line | none |
//! | XLSX   | one row of a sheet, `"col: value, …"` | sheet name |
//! | CSV    | one row, `"col: value, …"` | row index |
//!
//! An empty [`Extraction`] is a normal outcome, not an error.

mod docx;
mod pdf;
mod table;
mod text;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{ChunkMetadata, ExtractedChunk};
use crate::error::{RagError, Result};

/// Per-format handler output; the error string becomes an
/// [`RagError::ExtractionError`] message.
type ChunkResult = std::result::Result<Vec<ExtractedChunk>, String>;

/// A supported upload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
    Xlsx,
    Csv,
}

impl DocumentFormat {
    /// Every supported format.
    pub const ALL: [DocumentFormat; 5] = [
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
        DocumentFormat::Txt,
        DocumentFormat::Xlsx,
        DocumentFormat::Csv,
    ];

    /// File name suffix, including the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => ".pdf",
            DocumentFormat::Docx => ".docx",
            DocumentFormat::Txt => ".txt",
            DocumentFormat::Xlsx => ".xlsx",
            DocumentFormat::Csv => ".csv",
        }
    }

    /// Select the format from a file name suffix. Matching is case-sensitive,
    /// so `REPORT.PDF` is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::UnsupportedFormat`] for any other suffix.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|format| file_name.ends_with(format.extension()))
            .ok_or_else(|| RagError::UnsupportedFormat { file_name: file_name.to_string() })
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension()[1..])
    }
}

/// The ordered chunks extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    chunks: Vec<ExtractedChunk>,
}

impl Extraction {
    pub fn new(chunks: Vec<ExtractedChunk>) -> Self {
        Self { chunks }
    }

    pub fn chunks(&self) -> &[ExtractedChunk] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<ExtractedChunk> {
        self.chunks
    }

    /// Chunk texts, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }

    /// Chunk metadata, parallel to [`texts`](Self::texts).
    pub fn metadatas(&self) -> Vec<&ChunkMetadata> {
        self.chunks.iter().map(|c| &c.metadata).collect()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Extract the text chunks of `content` interpreted as `format`.
///
/// # Errors
///
/// Returns [`RagError::ExtractionError`] when the bytes are not a readable
/// document of that format (corrupt archive, invalid UTF-8, …).
pub fn extract(content: &[u8], format: DocumentFormat) -> Result<Extraction> {
    let chunks = match format {
        DocumentFormat::Pdf => pdf::extract_pages(content),
        DocumentFormat::Docx => docx::extract_paragraphs(content),
        DocumentFormat::Txt => text::extract_lines(content),
        DocumentFormat::Xlsx => table::extract_workbook(content),
        DocumentFormat::Csv => table::extract_csv(content),
    }
    .map_err(|message| RagError::ExtractionError { format: format.to_string(), message })?;

    debug!(%format, chunk_count = chunks.len(), bytes = content.len(), "extracted document");
    Ok(Extraction::new(chunks))
}

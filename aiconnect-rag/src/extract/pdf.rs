//! PDF extraction with `lopdf`, one chunk per page.

use lopdf::Document;
use tracing::debug;

use super::ChunkResult;
use crate::document::{ChunkMetadata, ExtractedChunk};

/// Extract each page's text. Pages without extractable text are skipped and
/// keep their number out of the sequence.
pub(super) fn extract_pages(content: &[u8]) -> ChunkResult {
    let document = Document::load_mem(content).map_err(|e| format!("failed to parse PDF: {e}"))?;

    let mut chunks = Vec::new();
    for page_number in document.get_pages().into_keys() {
        match document.extract_text(&[page_number]) {
            Ok(text) if !text.trim().is_empty() => {
                chunks.push(ExtractedChunk::new(text, ChunkMetadata::PageNumber(page_number)));
            }
            Ok(_) => debug!(page_number, "PDF page has no text"),
            Err(e) => debug!(page_number, error = %e, "skipping unextractable PDF page"),
        }
    }
    Ok(chunks)
}

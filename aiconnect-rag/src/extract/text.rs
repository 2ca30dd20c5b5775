use super::ChunkResult;
use crate::document::{ChunkMetadata, ExtractedChunk};

/// One chunk per non-blank line of UTF-8 text.
pub(super) fn extract_lines(content: &[u8]) -> ChunkResult {
    let text = std::str::from_utf8(content).map_err(|e| format!("invalid UTF-8: {e}"))?;
    Ok(text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(|line| ExtractedChunk::new(line, ChunkMetadata::None))
        .collect())
}

//! DOCX extraction: read `word/document.xml` from the zip container and
//! collect the text of every top-level body paragraph.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use super::ChunkResult;
use crate::document::{ChunkMetadata, ExtractedChunk};

const DOCUMENT_PART: &str = "word/document.xml";

pub(super) fn extract_paragraphs(content: &[u8]) -> ChunkResult {
    let mut archive =
        ZipArchive::new(Cursor::new(content)).map_err(|e| format!("not a DOCX archive: {e}"))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| format!("missing {DOCUMENT_PART}: {e}"))?
        .read_to_string(&mut xml)
        .map_err(|e| format!("failed to read {DOCUMENT_PART}: {e}"))?;

    paragraphs_from_xml(&xml)
}

/// Walk the WordprocessingML body. Paragraphs inside tables are not body
/// paragraphs and are neither numbered nor emitted. Paragraphs nested in a
/// body paragraph (text boxes, alternate content) add nothing to it.
fn paragraphs_from_xml(xml: &str) -> ChunkResult {
    let mut reader = Reader::from_str(xml);
    let mut chunks = Vec::new();
    let mut paragraph_number = 0u32;
    let mut table_depth = 0usize;
    let mut paragraph_depth = 0usize;
    let mut in_text = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"p" if table_depth == 0 => {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 {
                        current.clear();
                    }
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                let collecting = paragraph_depth == 1 && table_depth == 0;
                match e.local_name().as_ref() {
                    b"p" if table_depth == 0 && paragraph_depth == 0 => paragraph_number += 1,
                    b"tab" if collecting => current.push('\t'),
                    b"br" | b"cr" if collecting => current.push('\n'),
                    _ => {}
                }
            }
            Ok(Event::Text(e)) if in_text && paragraph_depth == 1 && table_depth == 0 => {
                let text = e.unescape().map_err(|e| format!("invalid XML text: {e}"))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"p" if table_depth == 0 && paragraph_depth > 0 => {
                    paragraph_depth -= 1;
                    if paragraph_depth > 0 {
                        continue;
                    }
                    paragraph_number += 1;
                    if !current.trim().is_empty() {
                        chunks.push(ExtractedChunk::new(
                            std::mem::take(&mut current),
                            ChunkMetadata::ParagraphNumber(paragraph_number),
                        ));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed {DOCUMENT_PART} at byte {}: {e}",
                    reader.buffer_position()
                ));
            }
            _ => {}
        }
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{inner}</w:body></w:document>"#
        )
    }

    #[test]
    fn numbers_every_body_paragraph() {
        let xml = body(
            "<w:p><w:r><w:t>Intro</w:t></w:r></w:p>\
             <w:p/>\
             <w:p><w:r><w:t xml:space=\"preserve\">   </w:t></w:r></w:p>\
             <w:p><w:r><w:t>Cell </w:t></w:r><w:r><w:tab/><w:t>sites &amp; nodes</w:t></w:r></w:p>",
        );
        let chunks = paragraphs_from_xml(&xml).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "Intro");
        assert_eq!(chunks[0].metadata, ChunkMetadata::ParagraphNumber(1));
        assert_eq!(chunks[1].text, "Cell \tsites & nodes");
        assert_eq!(chunks[1].metadata, ChunkMetadata::ParagraphNumber(4));
    }

    #[test]
    fn skips_table_paragraphs() {
        let xml = body(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>in table</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>after</w:t></w:r></w:p>",
        );
        let chunks = paragraphs_from_xml(&xml).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "after");
        assert_eq!(chunks[0].metadata, ChunkMetadata::ParagraphNumber(1));
    }

    #[test]
    fn text_box_paragraphs_do_not_replace_the_outer_text() {
        let xml = body(
            "<w:p><w:r><w:t>Outer before</w:t></w:r>\
             <w:r><w:txbxContent><w:p><w:r><w:t>Inner box</w:t></w:r></w:p><w:p/></w:txbxContent></w:r>\
             <w:r><w:t xml:space=\"preserve\"> outer after</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Next</w:t></w:r></w:p>",
        );
        let chunks = paragraphs_from_xml(&xml).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "Outer before outer after");
        assert_eq!(chunks[0].metadata, ChunkMetadata::ParagraphNumber(1));
        assert_eq!(chunks[1].text, "Next");
        assert_eq!(chunks[1].metadata, ChunkMetadata::ParagraphNumber(2));
    }

    #[test]
    fn rejects_non_zip_content() {
        assert!(extract_paragraphs(b"plain text, not a zip").is_err());
    }
}

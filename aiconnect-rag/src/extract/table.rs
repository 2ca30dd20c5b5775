//! Spreadsheet-like extraction (XLSX via `calamine`, CSV via `csv`).
//!
//! Both formats go through [`Table`]: drop rows that are entirely empty, then
//! columns that are entirely empty, fill the remaining holes with `N/A` and
//! render each row as `"column: value, column: value"`.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};

use super::ChunkResult;
use crate::document::{ChunkMetadata, ExtractedChunk};

/// Placeholder for an empty cell in a row that has other values.
pub(crate) const MISSING_VALUE: &str = "N/A";

struct Row {
    /// Position of the row among the data rows of its source.
    index: usize,
    cells: Vec<Option<String>>,
}

struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    fn new(headers: Vec<String>) -> Self {
        let headers = headers
            .into_iter()
            .enumerate()
            .map(|(i, h)| if h.trim().is_empty() { format!("Unnamed: {i}") } else { h })
            .collect();
        Self { headers, rows: Vec::new() }
    }

    /// Add a data row. Short rows are padded with empty cells; long rows grow
    /// extra unnamed columns.
    fn push_row(&mut self, index: usize, cells: Vec<Option<String>>) {
        while self.headers.len() < cells.len() {
            let i = self.headers.len();
            self.headers.push(format!("Unnamed: {i}"));
        }
        self.rows.push(Row { index, cells });
    }

    fn prune(&mut self) {
        let width = self.headers.len();
        for row in &mut self.rows {
            row.cells.resize(width, None);
        }
        self.rows.retain(|row| row.cells.iter().any(Option::is_some));

        let keep: Vec<bool> =
            (0..width).map(|col| self.rows.iter().any(|row| row.cells[col].is_some())).collect();
        let mut col = 0;
        self.headers.retain(|_| {
            col += 1;
            keep[col - 1]
        });
        for row in &mut self.rows {
            let mut col = 0;
            row.cells.retain(|_| {
                col += 1;
                keep[col - 1]
            });
        }
    }

    /// Prune, then render each surviving row with its source index.
    fn into_rendered_rows(mut self) -> Vec<(usize, String)> {
        self.prune();
        let headers = self.headers;
        self.rows
            .into_iter()
            .map(|row| {
                let text = headers
                    .iter()
                    .zip(row.cells)
                    .map(|(header, cell)| {
                        format!("{header}: {}", cell.as_deref().unwrap_or(MISSING_VALUE))
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                (row.index, text)
            })
            .collect()
    }
}

/// Whitespace-only cells count as empty.
fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

/// One chunk per CSV row; the first line holds the column names.
pub(super) fn extract_csv(content: &[u8]) -> ChunkResult {
    let mut reader =
        csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(content);

    let headers = reader
        .headers()
        .map_err(|e| format!("failed to read CSV header: {e}"))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut table = Table::new(headers);

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| format!("failed to read CSV row {index}: {e}"))?;
        table.push_row(index, record.iter().map(|cell| non_blank(cell.to_string())).collect());
    }

    Ok(table
        .into_rendered_rows()
        .into_iter()
        .map(|(index, text)| ExtractedChunk::new(text, ChunkMetadata::RowIndex(index)))
        .collect())
}

/// One chunk per row of every sheet; each sheet's first used row holds the
/// column names.
pub(super) fn extract_workbook(content: &[u8]) -> ChunkResult {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(content))
        .map_err(|e| format!("failed to open workbook: {e}"))?;

    let mut chunks = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| format!("failed to read sheet '{sheet_name}': {e}"))?;

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            continue;
        };
        let mut table = Table::new(header_row.iter().map(cell_text).collect());
        for (index, row) in rows.enumerate() {
            table.push_row(index, row.iter().map(|cell| non_blank(cell_text(cell))).collect());
        }

        chunks.extend(table.into_rendered_rows().into_iter().map(|(_, text)| {
            ExtractedChunk::new(text, ChunkMetadata::SheetName(sheet_name.clone()))
        }));
    }
    Ok(chunks)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_rows_as_key_value_pairs() {
        let chunks = extract_csv(b"name,age\nAlice,30\nBob,25\n").unwrap();
        assert_eq!(chunks[0].text, "name: Alice, age: 30");
        assert_eq!(chunks[1].text, "name: Bob, age: 25");
        assert_eq!(chunks[1].metadata, ChunkMetadata::RowIndex(1));
    }

    #[test]
    fn drops_empty_rows_and_columns_and_fills_gaps() {
        let csv = b"site,unused,load\nA,,0.9\n,,\nB,,\n";
        let chunks = extract_csv(csv).unwrap();

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["site: A, load: 0.9", "site: B, load: N/A"]);
        // The dropped blank row keeps its slot in the numbering.
        assert_eq!(chunks[1].metadata, ChunkMetadata::RowIndex(2));
    }

    #[test]
    fn whitespace_cells_render_as_missing() {
        let chunks = extract_csv(b"site,load\nA,   \nB,0.4\n").unwrap();
        assert_eq!(chunks[0].text, "site: A, load: N/A");
    }

    #[test]
    fn names_blank_and_extra_columns() {
        let chunks = extract_csv(b"a,\n1,2,3\n").unwrap();
        assert_eq!(chunks[0].text, "a: 1, Unnamed: 1: 2, Unnamed: 2: 3");
    }

    #[test]
    fn empty_and_header_only_csv_yield_nothing() {
        assert!(extract_csv(b"").unwrap().is_empty());
        assert!(extract_csv(b"name,age\n").unwrap().is_empty());
        assert!(extract_csv(b"  \n \n\t\n").unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage_workbook() {
        assert!(extract_workbook(b"not an xlsx").is_err());
    }
}

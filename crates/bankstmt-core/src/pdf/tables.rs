//! Whitespace-stream table detection over page text.
//!
//! Statement PDFs usually lay tables out as aligned columns, which survive
//! text extraction as lines with wide gaps between cells. A run of
//! consecutive lines that all split into enough cells is treated as a table.

use tracing::{debug, trace};

use crate::models::config::TableConfig;
use crate::models::transaction::{RawTable, RawTableRow};

/// Detects column-aligned tables in extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTableDetector {
    min_columns: usize,
    min_rows: usize,
    column_gap: usize,
}

impl StreamTableDetector {
    pub fn new() -> Self {
        Self::from_config(&TableConfig::default())
    }

    pub fn from_config(config: &TableConfig) -> Self {
        Self {
            min_columns: config.min_columns.max(1),
            min_rows: config.min_rows.max(1),
            column_gap: config.column_gap.max(1),
        }
    }

    /// Split a line into cells on tabs or runs of at least `column_gap` blanks.
    pub fn split_line(&self, line: &str) -> RawTableRow {
        let mut cells = Vec::new();
        let mut current = String::new();
        let mut blanks = 0;

        for c in line.chars() {
            match c {
                '\t' => {
                    blanks = 0;
                    push_cell(&mut cells, &mut current);
                }
                ' ' | '\u{00a0}' => blanks += 1,
                _ => {
                    if blanks >= self.column_gap {
                        push_cell(&mut cells, &mut current);
                    } else if blanks > 0 && !current.is_empty() {
                        current.push(' ');
                    }
                    blanks = 0;
                    current.push(c);
                }
            }
        }
        push_cell(&mut cells, &mut current);

        cells
    }

    /// Detect tables in the text of one page.
    pub fn detect(&self, page: u32, text: &str) -> Vec<RawTable> {
        let mut tables = Vec::new();
        let mut run: Vec<RawTableRow> = Vec::new();

        for line in text.lines() {
            let cells = self.split_line(line);
            if cells.len() >= self.min_columns {
                trace!("Page {} table row: {:?}", page, cells);
                run.push(cells);
            } else {
                self.flush(page, &mut run, &mut tables);
            }
        }
        self.flush(page, &mut run, &mut tables);

        debug!("Detected {} tables on page {}", tables.len(), page);
        tables
    }

    /// Detect tables across pages (1-indexed in order).
    pub fn detect_pages<'a>(&self, pages: impl IntoIterator<Item = &'a str>) -> Vec<RawTable> {
        pages
            .into_iter()
            .enumerate()
            .flat_map(|(i, text)| self.detect(i as u32 + 1, text))
            .collect()
    }

    fn flush(&self, page: u32, run: &mut Vec<RawTableRow>, tables: &mut Vec<RawTable>) {
        if run.len() >= self.min_rows {
            tables.push(RawTable::new(page, std::mem::take(run)));
        } else {
            run.clear();
        }
    }
}

impl Default for StreamTableDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn push_cell(cells: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        cells.push(std::mem::take(current));
    }
}

//! Mapping raw table columns onto transaction fields.
//!
//! Bank layouts differ, so columns are located either from a header row
//! (keyword match) or from an explicit per-format [`ColumnMapping`] supplied
//! through configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::models::transaction::{RawTableRow, TransactionRecord};

use super::amounts::parse_cell_amount;

/// 0-based column indices for each transaction field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debit: Option<usize>,
}

/// Transaction field a header cell names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Date,
    Description,
    Amount,
    Credit,
    Debit,
}

const CREDIT_WORDS: &[&str] = &["credit", "credits", "deposit", "deposits", "paid in", "money in", "cr"];
const DEBIT_WORDS: &[&str] = &[
    "debit", "debits", "withdrawal", "withdrawals", "paid out", "money out", "dr",
];
const AMOUNT_WORDS: &[&str] = &["amount", "amt", "value"];
const DESCRIPTION_WORDS: &[&str] = &[
    "description",
    "details",
    "narration",
    "particulars",
    "memo",
    "payee",
    "remarks",
    "transaction",
];

/// Classify a header cell. Balance and reference columns yield `None`.
pub fn classify_header(cell: &str) -> Option<HeaderField> {
    let normalized: String = cell
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = normalized.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let phrase = words.join(" ");

    let has = |keywords: &[&str]| {
        keywords.iter().any(|k| {
            if k.contains(' ') {
                phrase.contains(k)
            } else {
                words.contains(k)
            }
        })
    };

    if words.contains(&"balance") {
        None
    } else if words.contains(&"date") {
        Some(HeaderField::Date)
    } else if has(CREDIT_WORDS) {
        Some(HeaderField::Credit)
    } else if has(DEBIT_WORDS) {
        Some(HeaderField::Debit)
    } else if has(AMOUNT_WORDS) {
        Some(HeaderField::Amount)
    } else if has(DESCRIPTION_WORDS) {
        Some(HeaderField::Description)
    } else {
        None
    }
}

impl ColumnMapping {
    /// Build a mapping from a header row; the first column naming a field wins.
    pub fn from_header(row: &[String]) -> Self {
        let mut mapping = Self::default();

        for (col, cell) in row.iter().enumerate() {
            let slot = match classify_header(cell) {
                Some(HeaderField::Date) => &mut mapping.date,
                Some(HeaderField::Description) => &mut mapping.description,
                Some(HeaderField::Amount) => &mut mapping.amount,
                Some(HeaderField::Credit) => &mut mapping.credit,
                Some(HeaderField::Debit) => &mut mapping.debit,
                None => continue,
            };
            if slot.is_none() {
                *slot = Some(col);
            }
        }

        mapping
    }

    /// A mapping is usable when it locates a date and some money column.
    pub fn is_usable(&self) -> bool {
        self.date.is_some() && (self.amount.is_some() || self.credit.is_some() || self.debit.is_some())
    }

    /// Find the first header row in `rows`, returning its mapping and index.
    pub fn detect(rows: &[RawTableRow]) -> Option<(Self, usize)> {
        rows.iter().enumerate().find_map(|(i, row)| {
            let mapping = Self::from_header(row);
            mapping.is_usable().then_some((mapping, i))
        })
    }

    /// Convert one data row into a record, or `None` if it is not a transaction.
    pub fn map_row(&self, row: &[String]) -> Option<TransactionRecord> {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(|s| s.trim()).unwrap_or("");

        let date = cell(self.date);
        if date.is_empty() || !date.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }

        let amount = if self.amount.is_some() {
            parse_cell_amount(cell(self.amount))?
        } else {
            let credit = parse_cell_amount(cell(self.credit)).map(|d| d.abs());
            let debit = parse_cell_amount(cell(self.debit)).map(|d| d.abs());
            if credit.is_none() && debit.is_none() {
                return None;
            }
            credit.unwrap_or(Decimal::ZERO) - debit.unwrap_or(Decimal::ZERO)
        };

        Some(TransactionRecord::new(date, cell(self.description), amount))
    }
}

/// Outcome of mapping a row sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedRows {
    /// Records in row order.
    pub records: Vec<TransactionRecord>,
    /// Mapping that was applied, if any.
    pub mapping: Option<ColumnMapping>,
    /// Index of the detected header row.
    pub header_row: Option<usize>,
    /// Data rows that did not yield a record.
    pub skipped: usize,
}

/// Maps table rows to records using configuration or header detection.
#[derive(Debug, Clone, Default)]
pub struct TableMapper {
    configured: Option<ColumnMapping>,
}

impl TableMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed mapping instead of header detection.
    pub fn with_mapping(mut self, mapping: Option<ColumnMapping>) -> Self {
        self.configured = mapping;
        self
    }

    /// Map rows to records, best effort.
    pub fn map(&self, rows: &[RawTableRow]) -> MappedRows {
        let (mapping, header_row, start) = match &self.configured {
            Some(mapping) => (mapping.clone(), None, 0),
            None => match ColumnMapping::detect(rows) {
                Some((mapping, idx)) => (mapping, Some(idx), idx + 1),
                None => {
                    debug!("No header row found in {} table rows", rows.len());
                    return MappedRows::default();
                }
            },
        };

        debug!("Mapping table rows with {:?} (header row {:?})", mapping, header_row);

        let mut records = Vec::new();
        let mut skipped = 0;

        for row in &rows[start.min(rows.len())..] {
            match mapping.map_row(row) {
                Some(record) => records.push(record),
                None => {
                    trace!("Skipping non-transaction row: {:?}", row);
                    skipped += 1;
                }
            }
        }

        MappedRows {
            records,
            mapping: Some(mapping),
            header_row,
            skipped,
        }
    }
}

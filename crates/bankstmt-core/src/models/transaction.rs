//! Transaction data models shared by the parser, table mapping, and export.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single normalized statement transaction.
///
/// `credit` and `debit` are always derived from `amount`, so
/// `credit - debit == amount` holds for every record. Deserialization goes
/// through [`TransactionRecord::new`] as well; serialized credit/debit values
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordFields")]
pub struct TransactionRecord {
    date: String,
    description: String,
    amount: Decimal,
    credit: Decimal,
    debit: Decimal,
}

#[derive(Deserialize)]
struct RecordFields {
    date: String,
    description: String,
    amount: Decimal,
}

impl From<RecordFields> for TransactionRecord {
    fn from(fields: RecordFields) -> Self {
        Self::new(fields.date, fields.description, fields.amount)
    }
}

impl TransactionRecord {
    /// Create a record, deriving credit and debit from the sign of `amount`.
    pub fn new(date: impl Into<String>, description: impl AsRef<str>, amount: Decimal) -> Self {
        let credit = if amount > Decimal::ZERO { amount } else { Decimal::ZERO };
        let debit = if amount < Decimal::ZERO { -amount } else { Decimal::ZERO };

        Self {
            date: date.into(),
            description: description.as_ref().trim().to_string(),
            amount,
            credit,
            debit,
        }
    }

    /// Date exactly as it appeared in the source.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Transaction description, trimmed.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Signed amount (negative for money leaving the account).
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Money in; zero unless `amount > 0`.
    pub fn credit(&self) -> Decimal {
        self.credit
    }

    /// Money out; zero unless `amount < 0`.
    pub fn debit(&self) -> Decimal {
        self.debit
    }

    /// Check that credit/debit agree with the amount.
    pub fn is_balanced(&self) -> bool {
        self.credit >= Decimal::ZERO
            && self.debit >= Decimal::ZERO
            && (self.credit.is_zero() || self.debit.is_zero())
            && self.credit - self.debit == self.amount
    }
}

/// One row of a detected table, as raw cell strings.
pub type RawTableRow = Vec<String>;

/// A table detected on a PDF page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// Page number (1-indexed) the table was found on.
    pub page: u32,
    /// Rows in top-to-bottom order.
    pub rows: Vec<RawTableRow>,
}

impl RawTable {
    pub fn new(page: u32, rows: Vec<RawTableRow>) -> Self {
        Self { page, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Which strategy (and stage) produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Detected tables, mapped to records.
    Table,
    /// Pattern parsing of the extracted text.
    Text,
    /// Pattern parsing of enhanced text.
    TextEnhanced,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Text => "text",
            Self::TextEnhanced => "text-enhanced",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running one extraction strategy on one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Records in document order.
    pub records: Vec<TransactionRecord>,

    /// Strategy/stage that produced `records`.
    pub provenance: Provenance,

    /// Concatenated table rows (table strategy only).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub raw_rows: Vec<RawTableRow>,

    /// Text fed to the parser (text strategy only).
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub raw_text: String,

    /// Non-fatal issues noticed along the way.
    #[serde(default)]
    pub warnings: Vec<String>,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    pub fn new(records: Vec<TransactionRecord>, provenance: Provenance) -> Self {
        Self {
            records,
            provenance,
            raw_rows: Vec::new(),
            raw_text: String::new(),
            warnings: Vec::new(),
            processing_time_ms: 0,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all credits, or `None` if it overflows a `Decimal`.
    pub fn total_credit(&self) -> Option<Decimal> {
        checked_total(self.records.iter().map(TransactionRecord::credit))
    }

    /// Sum of all debits, or `None` if it overflows a `Decimal`.
    pub fn total_debit(&self) -> Option<Decimal> {
        checked_total(self.records.iter().map(TransactionRecord::debit))
    }
}

fn checked_total(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    values.fold(Some(Decimal::ZERO), |total, value| total?.checked_add(value))
}

//! WASM bindings for bank statement transaction parsing.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! PDF text extraction happens on the JS side (e.g. pdf.js); these bindings
//! take the extracted text or table cells.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use bankstmt_core::statement::amounts;
use bankstmt_core::{ExtractionResult, IdentityEnhancer, StrategySelector, TableMapper, TransactionRecord};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// A record with numeric amounts for JS consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct RecordJs {
    date: String,
    description: String,
    amount: f64,
    credit: f64,
    debit: f64,
}

impl From<&TransactionRecord> for RecordJs {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            date: record.date().to_string(),
            description: record.description().to_string(),
            amount: record.amount().to_f64().unwrap_or_default(),
            credit: record.credit().to_f64().unwrap_or_default(),
            debit: record.debit().to_f64().unwrap_or_default(),
        }
    }
}

fn records_js(records: &[TransactionRecord]) -> Vec<RecordJs> {
    records.iter().map(RecordJs::from).collect()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse transactions from statement text (no enhancement).
#[wasm_bindgen]
pub fn parse_transactions(text: &str) -> Result<JsValue, JsValue> {
    let records = bankstmt_core::parse_transactions(text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&records_js(&records))
}

/// Parse an amount token (e.g., "-1,234.56").
#[wasm_bindgen]
pub fn parse_amount(token: &str) -> Option<f64> {
    amounts::parse_amount(token).ok().and_then(|d| d.to_f64())
}

/// Format an amount with thousands separators and two decimals.
#[wasm_bindgen]
pub fn format_amount(amount: f64) -> String {
    Decimal::from_f64(amount)
        .map(amounts::format_amount)
        .unwrap_or_else(|| format!("{:.2}", amount))
}

/// Map table rows (array of string arrays) to transactions.
#[wasm_bindgen]
pub fn map_table(rows: JsValue) -> Result<JsValue, JsValue> {
    let rows: Vec<Vec<String>> =
        serde_wasm_bindgen::from_value(rows).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let mapped = TableMapper::new().map(&rows);
    to_js(&records_js(&mapped.records))
}

#[derive(Serialize)]
struct ExtractResultJs {
    records: Vec<RecordJs>,
    provenance: String,
    warnings: Vec<String>,
    processing_time_ms: u64,
}

impl From<ExtractionResult> for ExtractResultJs {
    fn from(result: ExtractionResult) -> Self {
        Self {
            records: records_js(&result.records),
            provenance: result.provenance.to_string(),
            warnings: result.warnings,
            processing_time_ms: result.processing_time_ms,
        }
    }
}

/// Text strategy runner for browser use.
#[wasm_bindgen]
pub struct StatementParser {
    min_records: usize,
    prefix_length: usize,
}

#[wasm_bindgen]
impl StatementParser {
    /// Create a parser with default escalation settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            min_records: 3,
            prefix_length: 1000,
        }
    }

    /// Records below which enhancement is attempted.
    #[wasm_bindgen]
    pub fn set_min_records(&mut self, min_records: usize) {
        self.min_records = min_records;
    }

    /// Characters handed to the enhancer.
    #[wasm_bindgen]
    pub fn set_prefix_length(&mut self, length: usize) {
        self.prefix_length = length;
    }

    fn selector(&self) -> StrategySelector {
        StrategySelector::new(std::sync::Arc::new(IdentityEnhancer))
            .with_min_records(self.min_records)
            .with_prefix_length(self.prefix_length)
            .with_timeout(None)
    }

    /// Run the text strategy, returning records, provenance, and warnings.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self
            .selector()
            .extract_text(text)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        for warning in &result.warnings {
            web_sys::console::warn_1(&JsValue::from_str(warning));
        }

        to_js(&ExtractResultJs::from(result))
    }
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

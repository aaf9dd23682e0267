//! Pattern-based transaction parser for extracted statement text.

use tracing::{debug, trace};

use crate::models::transaction::TransactionRecord;

use super::amounts::parse_amount;
use super::patterns::TRANSACTION_LINE;
use super::Result;

/// Turns raw statement text into transaction records.
///
/// Implementations must be pure: the same text always yields the same
/// records, in document order. Text without recognizable transactions
/// yields an empty vector rather than an error.
pub trait TransactionParser: Send + Sync {
    /// Parse all transactions from text.
    fn parse(&self, text: &str) -> Result<Vec<TransactionRecord>>;
}

/// Regex-driven parser matching `date description amount` runs.
///
/// Matches are non-overlapping and scanned left to right; a match may span
/// line breaks because the description accepts any whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternParser;

impl PatternParser {
    pub fn new() -> Self {
        Self
    }
}

impl TransactionParser for PatternParser {
    fn parse(&self, text: &str) -> Result<Vec<TransactionRecord>> {
        if text.trim().is_empty() {
            debug!("No text to parse");
            return Ok(Vec::new());
        }

        let mut records = Vec::new();

        for caps in TRANSACTION_LINE.captures_iter(text) {
            let amount = parse_amount(&caps["amount"])?;
            trace!(
                "Matched transaction: date={:?} description={:?} amount={}",
                &caps["date"], &caps["description"], amount
            );
            records.push(TransactionRecord::new(&caps["date"], &caps["description"], amount));
        }

        debug!("Parsed {} transactions from {} characters", records.len(), text.len());
        Ok(records)
    }
}

/// Parse transactions with the default [`PatternParser`].
pub fn parse_transactions(text: &str) -> Result<Vec<TransactionRecord>> {
    PatternParser::new().parse(text)
}

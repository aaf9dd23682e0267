//! Regex grammar for statement transaction lines.

use lazy_static::lazy_static;
use regex::Regex;

/// Numeric dates (`2025-08-15`, `15/08/25`, `15 08 2025`) or day + month
/// abbreviation + year (`15 Aug 2025`, `15-aug-25`, `15AUG2025`).
pub const DATE_TOKEN: &str = concat!(
    r"\d{2,4}[-/ ]\d{2}[-/ ]\d{2,4}",
    r"|\d{1,2}[-/ ]?(?i:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[-/ ]?\d{2,4}",
);

/// Letters, digits, whitespace, commas, periods and hyphens.
pub const DESCRIPTION_TOKEN: &str = r"[A-Za-z0-9\s,.\-]+?";

/// Optional sign, digits optionally grouped by commas, up to two decimals.
///
/// At most 26 integer digits, so every match fits a `Decimal`. The trailing
/// `\b` keeps a longer digit run from matching as a truncated prefix.
pub const AMOUNT_TOKEN: &str = r"[-+]?(?:\d{1,3}(?:,\d{3}){1,7}|\d{1,26})(?:\.\d{1,2})?\b";

lazy_static! {
    /// A full transaction line: date, description, amount.
    pub static ref TRANSACTION_LINE: Regex = Regex::new(&format!(
        r"(?P<date>{DATE_TOKEN})\s+(?P<description>{DESCRIPTION_TOKEN})\s+(?P<amount>{AMOUNT_TOKEN})"
    )).unwrap();
}

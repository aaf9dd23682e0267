//! Amount normalization for statement text and table cells.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ExtractionError;

/// Convert a matched amount token (`-1,234.56`, `+20`, `2000`) to a decimal.
///
/// Grouping commas and a leading `+` are stripped. Anything the decimal
/// parser still rejects is a [`ExtractionError::MalformedAmountToken`].
pub fn parse_amount(token: &str) -> Result<Decimal, ExtractionError> {
    let cleaned = token.trim().replace(',', "");
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    Decimal::from_str(cleaned).map_err(|_| ExtractionError::MalformedAmountToken(token.to_string()))
}

/// Parse an amount from a free-form table cell.
///
/// Accepts currency symbols and codes, `(12.00)` and trailing-minus negatives,
/// `CR`/`DR` suffixes, and a decimal comma when it is the last separator
/// (`1.234,56`, `12,5`). Returns `None` for cells without digits.
pub fn parse_cell_amount(cell: &str) -> Option<Decimal> {
    let mut text = cell.trim().to_uppercase();
    if text.is_empty() || !text.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut negative = false;

    if let Some(rest) = text.strip_suffix("DR") {
        negative = true;
        text = rest.trim_end().to_string();
    } else if let Some(rest) = text.strip_suffix("CR") {
        text = rest.trim_end().to_string();
    }

    if text.starts_with('(') && text.ends_with(')') {
        negative = true;
        text = text[1..text.len() - 1].to_string();
    }

    if text.ends_with('-') {
        negative = true;
        text.pop();
    }

    // Leading minus, possibly after a currency symbol (`-$5`, `$-5`)
    let first_digit = text.find(|c: char| c.is_ascii_digit()).unwrap_or(0);
    if text[..first_digit].contains('-') {
        negative = true;
    }

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = normalize_separators(&cleaned);
    let value = Decimal::from_str(&normalized).ok()?;

    Some(if negative { -value } else { value })
}

fn normalize_separators(cleaned: &str) -> String {
    match (cleaned.rfind(','), cleaned.rfind('.')) {
        // 1.234,56
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        // 1,234.56
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // 12,5 or 12,50 is a decimal comma; 1,234 is grouping
        (Some(c), None) => {
            let fraction = cleaned.len() - c - 1;
            if cleaned.matches(',').count() == 1 && (1..=2).contains(&fraction) {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        _ => cleaned.to_string(),
    }
}

/// Format an amount with comma grouping and two decimals (`-1,234.50`).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((&s, "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    if amount.is_sign_negative() && !amount.is_zero() {
        formatted.push('-');
    }

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{}.{}", formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56").unwrap(), dec("1234.56"));
        assert_eq!(parse_amount("-500.00").unwrap(), dec("-500.00"));
        assert_eq!(parse_amount("+20").unwrap(), dec("20"));
        assert_eq!(parse_amount("2000").unwrap(), dec("2000"));
        assert_eq!(parse_amount("12,345,678.9").unwrap(), dec("12345678.9"));
    }

    #[test]
    fn test_parse_amount_malformed() {
        let err = parse_amount("12..3").unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedAmountToken(ref t) if t == "12..3"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_parse_cell_amount() {
        assert_eq!(parse_cell_amount("$1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_cell_amount(" -45.00 "), Some(dec("-45.00")));
        assert_eq!(parse_cell_amount("(12.00)"), Some(dec("-12.00")));
        assert_eq!(parse_cell_amount("500.00-"), Some(dec("-500.00")));
        assert_eq!(parse_cell_amount("250.00 DR"), Some(dec("-250.00")));
        assert_eq!(parse_cell_amount("250.00 CR"), Some(dec("250.00")));
        assert_eq!(parse_cell_amount("1.234,56 EUR"), Some(dec("1234.56")));
        assert_eq!(parse_cell_amount("12,5"), Some(dec("12.5")));
        assert_eq!(parse_cell_amount("1,234"), Some(dec("1234")));
        assert_eq!(parse_cell_amount(""), None);
        assert_eq!(parse_cell_amount("Balance"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("1234.56")), "1,234.56");
        assert_eq!(format_amount(dec("-500")), "-500.00");
        assert_eq!(format_amount(dec("12345678.9")), "12,345,678.90");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }
}

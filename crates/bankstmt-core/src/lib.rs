//! Core library for bank statement extraction.
//!
//! This crate provides:
//! - PDF loading with per-page text extraction and table detection
//! - Pattern-based transaction parsing with enhancement escalation
//! - Column mapping for tabular statements
//! - XLSX export of transaction records (feature `xlsx`)

pub mod error;
pub mod export;
pub mod models;
pub mod pdf;
pub mod statement;

pub use error::{EnhancementError, ExportError, ExtractionError, PdfError, Result, StatementError};
pub use models::config::{EnhancerKind, StatementConfig};
pub use models::transaction::{ExtractionResult, Provenance, RawTable, RawTableRow, TransactionRecord};
pub use pdf::{DocumentSource, PdfSource, StreamTableDetector, TextSource};
pub use statement::{
    create_enhancer, parse_transactions, CleanupEnhancer, ColumnMapping, IdentityEnhancer, PatternParser, Strategy,
    StrategySelector, TableMapper, TextEnhancer, TransactionParser,
};

#[cfg(feature = "xlsx")]
pub use export::{export, export_rows, XlsxExporter};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_source_end_to_end() {
        let source = TextSource::new("2025-08-15 ATM Withdrawal -500.00\n2025-08-16 Salary 2000");
        let selector = StrategySelector::new(create_enhancer(EnhancerKind::Identity));

        let result = selector.extract(Strategy::Text, &source).unwrap();
        assert_eq!(result.provenance, Provenance::Text);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_table_strategy_without_tables() {
        let source = TextSource::new("just one line of prose");
        let err = StrategySelector::default().extract(Strategy::Table, &source).unwrap_err();
        assert!(matches!(err, StatementError::Extraction(ExtractionError::NoTablesDetected)));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_table_strategy_to_xlsx() {
        let source = TextSource::new(
            "Date        Narration         Withdrawal   Deposit\n\
             05/08/2025  Coffee            4.50         0.00\n\
             06/08/2025  Salary            0.00         2,000.00",
        );

        let result = StrategySelector::default().extract(Strategy::Table, &source).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.total_debit().unwrap().to_string(), "4.50");

        let bytes = export(&result.records).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}

//! Error types for the bankstmt-core library.

use std::time::Duration;

use thiserror::Error;

/// Main error type for the bankstmt library.
#[derive(Error, Debug)]
pub enum StatementError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Transaction extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Spreadsheet export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors produced while turning a document into transaction records.
///
/// Everything except [`ExtractionError::MalformedAmountToken`] is a
/// user-facing condition: the same document can be retried with the other
/// strategy.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Text strategy selected but the document yielded no text.
    #[error("no text detected with the text strategy; the PDF may be scanned, try the table strategy")]
    NoTextExtracted,

    /// Text was present but no transaction lines were recognized.
    #[error("could not parse any transactions with the text strategy; try the table strategy")]
    NoTransactionsParsed,

    /// Table strategy selected but no tables were detected.
    #[error("no tables detected with the table strategy; try the text strategy")]
    NoTablesDetected,

    /// The enhancement collaborator failed or timed out.
    #[error("text enhancement failed: {0}")]
    Enhancement(#[from] EnhancementError),

    /// A pattern-matched amount token could not be converted to a number.
    #[error("malformed amount token: {0:?}")]
    MalformedAmountToken(String),
}

impl ExtractionError {
    /// Whether the caller may retry the same document with another strategy.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MalformedAmountToken(_))
    }
}

/// Errors raised by text enhancement collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnhancementError {
    /// The collaborator ran and reported a failure.
    #[error("enhancer failed: {0}")]
    Failed(String),

    /// The collaborator did not answer before the deadline.
    #[error("enhancer timed out after {0:?}")]
    Timeout(Duration),

    /// The collaborator could not be reached at all.
    #[error("enhancer unavailable")]
    Unavailable,
}

/// Errors related to spreadsheet export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The XLSX writer rejected the workbook.
    #[error("failed to write workbook: {0}")]
    Xlsx(String),
}

/// Result type for the bankstmt library.
pub type Result<T> = std::result::Result<T, StatementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_suggest_other_strategy() {
        assert!(ExtractionError::NoTextExtracted.to_string().contains("table strategy"));
        assert!(ExtractionError::NoTransactionsParsed.to_string().contains("table strategy"));
        assert!(ExtractionError::NoTablesDetected.to_string().contains("text strategy"));
    }

    #[test]
    fn test_recoverable() {
        assert!(ExtractionError::NoTablesDetected.is_recoverable());
        assert!(ExtractionError::Enhancement(EnhancementError::Unavailable).is_recoverable());
        assert!(!ExtractionError::MalformedAmountToken("1..2".to_string()).is_recoverable());
    }
}

//! Document sources: PDF loading, text extraction, and table detection.

mod source;
mod tables;

pub use source::{PdfSource, TextSource};
pub use tables::StreamTableDetector;

use crate::error::PdfError;
use crate::models::transaction::RawTable;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Supplies the two views of a document that extraction strategies consume.
pub trait DocumentSource {
    /// Full document text, one page after another joined by `\n`.
    /// Pages without text contribute an empty string.
    fn text(&self) -> Result<String>;

    /// Tables detected on all pages, in page order.
    fn tables(&self) -> Result<Vec<RawTable>>;
}

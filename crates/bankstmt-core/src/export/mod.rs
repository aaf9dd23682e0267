//! Spreadsheet export of extracted records.

#[cfg(feature = "xlsx")]
mod xlsx;

#[cfg(feature = "xlsx")]
pub use xlsx::{export, export_rows, XlsxExporter};

/// MIME type of exported workbooks.
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Default download/output file name.
pub const DEFAULT_FILE_NAME: &str = "transactions.xlsx";

/// Default worksheet name.
pub const DEFAULT_SHEET_NAME: &str = "Transactions";

/// Header row of the transactions sheet, in column order.
pub const HEADERS: [&str; 5] = ["Date", "Description", "Amount", "Credit", "Debit"];

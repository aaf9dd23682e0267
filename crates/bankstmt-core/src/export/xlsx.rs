//! XLSX writer built on rust_xlsxwriter.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use super::{DEFAULT_SHEET_NAME, HEADERS};
use crate::error::ExportError;
use crate::models::config::ExportConfig;
use crate::models::transaction::{RawTableRow, TransactionRecord};

impl From<XlsxError> for ExportError {
    fn from(e: XlsxError) -> Self {
        ExportError::Xlsx(e.to_string())
    }
}

/// Writes records or raw rows into a single-sheet workbook.
#[derive(Debug, Clone)]
pub struct XlsxExporter {
    sheet_name: String,
}

impl XlsxExporter {
    pub fn new() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new().with_sheet_name(&config.sheet_name)
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Header row `Date, Description, Amount, Credit, Debit`, then one row
    /// per record. Amounts are written as numbers.
    pub fn export(&self, records: &[TransactionRecord]) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let sheet = self.add_sheet(&mut workbook)?;
        for (col, header) in HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, record.date())?;
            sheet.write_string(row, 1, record.description())?;
            sheet.write_number(row, 2, to_number(record.amount()))?;
            sheet.write_number(row, 3, to_number(record.credit()))?;
            sheet.write_number(row, 4, to_number(record.debit()))?;
        }
        sheet.set_column_width(1, 40)?;

        let bytes = workbook.save_to_buffer()?;
        debug!("Exported {} records ({} bytes)", records.len(), bytes.len());
        Ok(bytes)
    }

    /// Raw table rows, every cell as a string.
    pub fn export_rows(&self, rows: &[RawTableRow]) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();

        let sheet = self.add_sheet(&mut workbook)?;
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                sheet.write_string(r as u32, c as u16, cell)?;
            }
        }

        let bytes = workbook.save_to_buffer()?;
        debug!("Exported {} raw rows ({} bytes)", rows.len(), bytes.len());
        Ok(bytes)
    }

    fn add_sheet<'a>(&self, workbook: &'a mut Workbook) -> Result<&'a mut Worksheet, ExportError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name)?;
        Ok(sheet)
    }
}

impl Default for XlsxExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_number(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Export records with the default sheet name.
pub fn export(records: &[TransactionRecord]) -> Result<Vec<u8>, ExportError> {
    XlsxExporter::new().export(records)
}

/// Export raw table rows with the default sheet name.
pub fn export_rows(rows: &[RawTableRow]) -> Result<Vec<u8>, ExportError> {
    XlsxExporter::new().export_rows(rows)
}

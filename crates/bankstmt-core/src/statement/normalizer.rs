//! Table normalization: flatten detected tables into one row sequence.

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::transaction::{RawTable, RawTableRow};

use super::Result;

/// Concatenate all tables, preserving table order then row order.
///
/// Rows are passed through untouched. Returns
/// [`ExtractionError::NoTablesDetected`] when `tables` is empty; tables that
/// exist but have no rows produce an empty sequence.
pub fn normalize(tables: &[RawTable]) -> Result<Vec<RawTableRow>> {
    if tables.is_empty() {
        return Err(ExtractionError::NoTablesDetected);
    }

    let rows: Vec<RawTableRow> = tables.iter().flat_map(|t| t.rows.iter().cloned()).collect();

    debug!("Normalized {} tables into {} rows", tables.len(), rows.len());
    Ok(rows)
}

/// Pad rows to the widest row so every row has the same cell count.
pub fn pad_rows(rows: &mut [RawTableRow]) {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in rows.iter_mut() {
        row.resize(width, String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> RawTableRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_no_tables() {
        assert!(matches!(normalize(&[]), Err(ExtractionError::NoTablesDetected)));
    }

    #[test]
    fn test_empty_tables_are_not_missing_tables() {
        let tables = vec![RawTable::new(1, vec![]), RawTable::new(2, vec![])];
        assert_eq!(normalize(&tables).unwrap(), Vec::<RawTableRow>::new());
    }

    #[test]
    fn test_concatenates_in_order() {
        let tables = vec![
            RawTable::new(1, vec![row(&["Date", "Details", "Amount"]), row(&["01/08/2025", "Rent", "-900.00"])]),
            RawTable::new(2, vec![row(&["02/08/2025", "Salary", "3,000.00"])]),
        ];

        let rows = normalize(&tables).unwrap();
        assert_eq!(
            rows,
            vec![
                row(&["Date", "Details", "Amount"]),
                row(&["01/08/2025", "Rent", "-900.00"]),
                row(&["02/08/2025", "Salary", "3,000.00"]),
            ]
        );
    }

    #[test]
    fn test_pad_rows() {
        let mut rows = vec![row(&["a"]), row(&["b", "c", "d"])];
        pad_rows(&mut rows);
        assert_eq!(rows, vec![row(&["a", "", ""]), row(&["b", "c", "d"])]);
    }
}

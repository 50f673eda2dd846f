//! Worksheet table model
//!
//! A table names a rectangular cell region and its columns, the way XLSX
//! stores them in `xl/tables/tableN.xml`. The resolver here maps a column
//! offset to the single-column range of its data cells, skipping header
//! rows.

use crate::cell::CellRange;
use crate::error::{Error, Result};

/// A named table anchored to a rectangular range of a worksheet
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    range: CellRange,
    header_row_count: u32,
    columns: Vec<String>,
}

impl Table {
    /// Create a table from a range reference string (e.g., "B2:E5")
    ///
    /// Column names must be unique within the table.
    pub fn new<S: Into<String>>(
        name: S,
        range_ref: &str,
        header_row_count: u32,
        columns: Vec<String>,
    ) -> Result<Self> {
        let range = CellRange::parse(range_ref)?;
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c == col) {
                return Err(Error::DuplicateColumnName {
                    table: name.into(),
                    column: col.clone(),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            range,
            header_row_count,
            columns,
        })
    }

    /// The table's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full range covered by the table, headers included
    pub fn range(&self) -> CellRange {
        self.range
    }

    /// Number of header rows at the top of the range
    pub fn header_row_count(&self) -> u32 {
        self.header_row_count
    }

    /// Column names in left-to-right order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Find the zero-based offset of a column by name
    pub fn column_offset(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Resolve the data cells of the column at `offset`
    ///
    /// The result is a single-column range spanning the table's rows below
    /// the header. Fails if the offset lies outside the table's width or if
    /// the header rows consume the entire range.
    pub fn column_data_range(&self, offset: usize) -> Result<CellRange> {
        let width = self.range.col_count() as usize;
        if offset >= width {
            return Err(Error::InvalidRange(format!(
                "column offset {} is outside table '{}' (width {})",
                offset, self.name, width
            )));
        }
        // checked_add: headerRowCount comes from file input and may be huge
        let first_data_row = self
            .range
            .start
            .row
            .checked_add(self.header_row_count)
            .filter(|&row| row <= self.range.end.row)
            .ok_or_else(|| {
                Error::InvalidRange(format!(
                    "table '{}' has no data rows below its header",
                    self.name
                ))
            })?;
        let col = self.range.start.col + offset as u16;
        Ok(CellRange::from_indices(
            first_data_row,
            col,
            self.range.end.row,
            col,
        ))
    }

    /// Resolve the data cells of a column by name
    pub fn column_data_range_by_name(&self, name: &str) -> Result<CellRange> {
        let offset = self
            .column_offset(name)
            .ok_or_else(|| Error::ColumnNotFound {
                table: self.name.clone(),
                column: name.to_string(),
            })?;
        self.column_data_range(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_table() -> Table {
        Table::new(
            "Sales",
            "B2:E5",
            1,
            vec![
                "Region".to_string(),
                "Units".to_string(),
                "Price".to_string(),
                "Total".to_string(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_column_data_range() {
        let table = sample_table();
        // B2:E5, one header row: second column's data is C3:C5
        let range = table.column_data_range(1).unwrap();
        assert_eq!(range.to_string(), "C3:C5");
    }

    #[test]
    fn test_column_data_range_first_and_last() {
        let table = sample_table();
        assert_eq!(table.column_data_range(0).unwrap().to_string(), "B3:B5");
        assert_eq!(table.column_data_range(3).unwrap().to_string(), "E3:E5");
    }

    #[test]
    fn test_column_offset() {
        let table = sample_table();
        assert_eq!(table.column_offset("Units"), Some(1));
        assert_eq!(table.column_offset("Missing"), None);
    }

    #[test]
    fn test_column_data_range_by_name() {
        let table = sample_table();
        let range = table.column_data_range_by_name("Price").unwrap();
        assert_eq!(range.to_string(), "D3:D5");

        assert!(matches!(
            table.column_data_range_by_name("Missing"),
            Err(Error::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_offset_out_of_width() {
        let table = sample_table();
        assert!(matches!(
            table.column_data_range(4),
            Err(Error::InvalidRange(_))
        ));
    }

    #[test]
    fn test_header_consumes_all_rows() {
        let table = Table::new("T", "A1:B2", 2, vec!["X".into(), "Y".into()]).unwrap();
        assert!(matches!(
            table.column_data_range(0),
            Err(Error::InvalidRange(_))
        ));
    }

    #[test]
    fn test_huge_header_row_count() {
        // A headerRowCount near u32::MAX must not wrap past the end row
        let table = Table::new("T", "A1:B2", u32::MAX, vec!["X".into(), "Y".into()]).unwrap();
        assert!(matches!(
            table.column_data_range(0),
            Err(Error::InvalidRange(_))
        ));
    }

    #[test]
    fn test_no_header_rows() {
        let table = Table::new("T", "A1:A3", 0, vec!["X".into()]).unwrap();
        assert_eq!(table.column_data_range(0).unwrap().to_string(), "A1:A3");
    }

    #[test]
    fn test_duplicate_column_name() {
        let err = Table::new("T", "A1:B2", 1, vec!["X".into(), "X".into()]).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumnName { .. }));
    }

    #[test]
    fn test_invalid_range_ref() {
        assert!(Table::new("T", "not-a-range", 1, vec![]).is_err());
    }
}

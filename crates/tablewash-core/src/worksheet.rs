//! Worksheet implementation

use crate::cell::{CellAddress, CellData, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::style::Style;
use crate::table::Table;
use crate::{MAX_COLS, MAX_ROWS};

/// A single worksheet in a workbook
///
/// Holds the sheet's cells plus the tables anchored to it.
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
    tables: Vec<Table>,
}

impl Worksheet {
    /// Create a new empty worksheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            tables: Vec::new(),
        }
    }

    /// The worksheet's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the worksheet
    pub(crate) fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Get a cell's value, or Empty if the cell is not set
    pub fn cell_value(&self, addr: CellAddress) -> CellValue {
        self.cells
            .get(addr.row, addr.col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Get a cell's data if it is set
    pub fn cell(&self, addr: CellAddress) -> Option<&CellData> {
        self.cells.get(addr.row, addr.col)
    }

    /// Set a cell's value, keeping any existing style
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, addr: CellAddress, value: V) -> Result<()> {
        Self::validate_position(addr)?;
        let value = match value.into() {
            // Intern strings so repeated values share storage
            CellValue::String(s) => {
                CellValue::String(self.cells.string_pool_mut().intern(s.as_str()))
            }
            other => other,
        };
        self.cells.set_value(addr.row, addr.col, value);
        Ok(())
    }

    /// Get the resolved style of a cell
    ///
    /// Unset cells and cells with no explicit style resolve to the default
    /// style.
    pub fn cell_style(&self, addr: CellAddress) -> Style {
        let index = self
            .cells
            .get(addr.row, addr.col)
            .map(|c| c.style_index)
            .unwrap_or(0);
        self.cells
            .style_pool()
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    /// Set a cell's style, keeping any existing value
    pub fn set_cell_style(&mut self, addr: CellAddress, style: &Style) -> Result<()> {
        Self::validate_position(addr)?;
        let index = self.cells.style_pool_mut().get_or_insert(style);
        self.cells.set_style(addr.row, addr.col, index);
        Ok(())
    }

    /// Access the underlying cell storage
    pub fn cells(&self) -> &CellStorage {
        &self.cells
    }

    /// Access the underlying cell storage mutably
    pub fn cells_mut(&mut self) -> &mut CellStorage {
        &mut self.cells
    }

    /// Add a table to this worksheet
    ///
    /// Table names must be unique within the sheet.
    pub fn add_table(&mut self, table: Table) -> Result<()> {
        if self
            .tables
            .iter()
            .any(|t| t.name().eq_ignore_ascii_case(table.name()))
        {
            return Err(Error::DuplicateTableName(table.name().to_string()));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    /// All tables on this sheet, in insertion order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    fn validate_position(addr: CellAddress) -> Result<()> {
        if addr.row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(addr.row, MAX_ROWS - 1));
        }
        if addr.col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(addr.col, MAX_COLS - 1));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_roundtrip() {
        let mut sheet = Worksheet::new("Sheet1");
        let addr = CellAddress::parse("B2").unwrap();

        sheet.set_cell_value(addr, 42.0).unwrap();
        assert_eq!(sheet.cell_value(addr), CellValue::Number(42.0));

        // Unset cells read as Empty
        let other = CellAddress::parse("Z99").unwrap();
        assert_eq!(sheet.cell_value(other), CellValue::Empty);
    }

    #[test]
    fn test_style_survives_value_change() {
        let mut sheet = Worksheet::new("Sheet1");
        let addr = CellAddress::parse("A1").unwrap();

        let bold = Style::new().bold(true);
        sheet.set_cell_style(addr, &bold).unwrap();
        sheet.set_cell_value(addr, 10.0).unwrap();

        assert!(sheet.cell_style(addr).font.bold);
        assert_eq!(sheet.cell_value(addr), CellValue::Number(10.0));
    }

    #[test]
    fn test_default_style_for_unset_cell() {
        let sheet = Worksheet::new("Sheet1");
        let style = sheet.cell_style(CellAddress::parse("A1").unwrap());
        assert_eq!(style, Style::default());
    }

    #[test]
    fn test_tables() {
        let mut sheet = Worksheet::new("Sheet1");
        let table = Table::new("Data", "A1:B3", 1, vec!["X".into(), "Y".into()]).unwrap();
        sheet.add_table(table).unwrap();

        assert!(sheet.table("Data").is_some());
        assert!(sheet.table("Other").is_none());
        assert_eq!(sheet.tables().len(), 1);

        // Duplicate names are rejected, case-insensitively
        let dup = Table::new("data", "D1:E3", 1, vec!["X".into(), "Y".into()]).unwrap();
        assert!(matches!(
            sheet.add_table(dup),
            Err(Error::DuplicateTableName(_))
        ));
    }

    #[test]
    fn test_out_of_bounds_write() {
        let mut sheet = Worksheet::new("Sheet1");
        let addr = CellAddress::new(crate::MAX_ROWS, 0);
        assert!(sheet.set_cell_value(addr, 1.0).is_err());
    }
}

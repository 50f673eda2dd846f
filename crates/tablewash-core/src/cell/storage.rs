//! Cell storage implementation
//!
//! Sparse storage for worksheet cells. Only non-empty cells are stored,
//! using a row-based BTreeMap structure.

use std::collections::BTreeMap;

use super::{CellValue, StringPool};
use crate::style::StylePool;

/// Complete data for a single cell
#[derive(Debug, Clone)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Index into the style pool (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create a new cell with a value and default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// Create a new cell with a value and style
    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self { value, style_index }
    }

    /// Create an empty cell
    pub fn empty() -> Self {
        Self {
            value: CellValue::Empty,
            style_index: 0,
        }
    }

    /// Check if this cell is effectively empty (no value and default style)
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

impl Default for CellData {
    fn default() -> Self {
        Self::empty()
    }
}

/// Sparse row-based storage for worksheet cells
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, CellData>>`.
/// Row-major ordered iteration matches the XLSX on-disk layout.
#[derive(Debug, Default)]
pub struct CellStorage {
    /// Row index → column map
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,

    /// Shared string pool for deduplication
    pub(crate) string_pool: StringPool,

    /// Shared style pool for deduplication
    pub(crate) style_pool: StylePool,
}

impl CellStorage {
    /// Create a new empty cell storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell
    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Get a mutable cell
    pub fn get_mut(&mut self, row: u32, col: u16) -> Option<&mut CellData> {
        self.rows.get_mut(&row).and_then(|r| r.get_mut(&col))
    }

    /// Set a cell
    ///
    /// If the cell data is empty (no value, default style), the cell is
    /// removed instead.
    pub fn set(&mut self, row: u32, col: u16, data: CellData) {
        if data.is_empty() {
            // Remove empty cells to save memory
            if let Some(row_map) = self.rows.get_mut(&row) {
                row_map.remove(&col);
                if row_map.is_empty() {
                    self.rows.remove(&row);
                }
            }
        } else {
            self.rows.entry(row).or_default().insert(col, data);
        }
    }

    /// Set a cell's value, keeping any existing style
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let style_index = self.get(row, col).map(|c| c.style_index).unwrap_or(0);
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Set a cell's style index, keeping any existing value
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        let value = self
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty);
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Remove a cell
    pub fn remove(&mut self, row: u32, col: u16) {
        if let Some(row_map) = self.rows.get_mut(&row) {
            row_map.remove(&col);
            if row_map.is_empty() {
                self.rows.remove(&row);
            }
        }
    }

    /// Iterate over all stored cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, data)| (row, col, data)))
    }

    /// Get the bounds of all stored cells as (min_row, min_col, max_row, max_col)
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let mut bounds: Option<(u32, u16, u32, u16)> = None;
        for (row, col, _) in self.iter() {
            bounds = Some(match bounds {
                None => (row, col, row, col),
                Some((min_r, min_c, max_r, max_c)) => (
                    min_r.min(row),
                    min_c.min(col),
                    max_r.max(row),
                    max_c.max(col),
                ),
            });
        }
        bounds
    }

    /// Total number of stored cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Get the style pool
    pub fn style_pool(&self) -> &StylePool {
        &self.style_pool
    }

    /// Get the mutable style pool
    pub fn style_pool_mut(&mut self) -> &mut StylePool {
        &mut self.style_pool
    }

    /// Get the mutable string pool
    pub fn string_pool_mut(&mut self) -> &mut StringPool {
        &mut self.string_pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut storage = CellStorage::new();
        storage.set_value(1, 1, CellValue::Number(42.0));

        assert_eq!(
            storage.get(1, 1).map(|c| &c.value),
            Some(&CellValue::Number(42.0))
        );
        assert!(storage.get(0, 0).is_none());
    }

    #[test]
    fn test_set_value_keeps_style() {
        let mut storage = CellStorage::new();
        storage.set(2, 3, CellData::with_style(CellValue::Number(1.0), 5));
        storage.set_value(2, 3, CellValue::Number(2.0));

        let cell = storage.get(2, 3).unwrap();
        assert_eq!(cell.value, CellValue::Number(2.0));
        assert_eq!(cell.style_index, 5);
    }

    #[test]
    fn test_empty_cells_are_removed() {
        let mut storage = CellStorage::new();
        storage.set_value(0, 0, CellValue::Number(1.0));
        storage.set_value(0, 0, CellValue::Empty);

        assert!(storage.get(0, 0).is_none());
        assert_eq!(storage.cell_count(), 0);

        // An empty value with a non-default style is kept
        storage.set(0, 0, CellData::with_style(CellValue::Empty, 2));
        assert_eq!(storage.cell_count(), 1);
    }

    #[test]
    fn test_iter_row_major() {
        let mut storage = CellStorage::new();
        storage.set_value(1, 0, CellValue::Number(3.0));
        storage.set_value(0, 1, CellValue::Number(2.0));
        storage.set_value(0, 0, CellValue::Number(1.0));

        let order: Vec<(u32, u16)> = storage.iter().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_used_bounds() {
        let mut storage = CellStorage::new();
        assert!(storage.used_bounds().is_none());

        storage.set_value(1, 1, CellValue::Number(1.0));
        storage.set_value(4, 3, CellValue::Number(2.0));

        assert_eq!(storage.used_bounds(), Some((1, 1, 4, 3)));
    }
}

//! # tablewash-core
//!
//! Core data structures for the tablewash toolkit.
//!
//! This crate provides the fundamental types used throughout tablewash:
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`CellValue`] - Cell values (numbers, strings, booleans)
//! - [`Style`] and [`FontStyle`] - Cell formatting
//! - [`Table`] - A named tabular region with header rows and named columns
//! - [`Workbook`], [`Worksheet`] - The main document structures
//!
//! ## Example
//!
//! ```rust
//! use tablewash_core::{CellAddress, Table, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value(CellAddress::parse("B2").unwrap(), "Amount").unwrap();
//! sheet.set_cell_value(CellAddress::parse("B3").unwrap(), 12.5).unwrap();
//! sheet.set_cell_value(CellAddress::parse("B4").unwrap(), 7.25).unwrap();
//!
//! let table = Table::new("Costs", "B2:B4", 1, vec!["Amount".into()]).unwrap();
//! sheet.add_table(table).unwrap();
//!
//! // The data cells of column 0, excluding the header row:
//! let range = sheet.table("Costs").unwrap().column_data_range(0).unwrap();
//! assert_eq!(range.to_string(), "B3:B4");
//! ```

pub mod cell;
pub mod error;
pub mod style;
pub mod table;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellData, CellRange, CellValue, SharedString};
pub use error::{Error, Result};
pub use style::{FontStyle, NumberFormat, Style, StylePool};
pub use table::Table;
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

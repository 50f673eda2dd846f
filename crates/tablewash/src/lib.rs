//! # tablewash
//!
//! Batch perturbation of worksheet-table columns in Excel workbooks.
//!
//! Tablewash scans a directory of XLSX workbooks, reads the tables each
//! worksheet declares, and writes perturbed copies of every workbook:
//! bold numeric cells in table columns are multiplied by a factor drawn
//! from a Gaussian distribution, italic cells are cleared, and the
//! consumed font flags are removed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tablewash::prelude::*;
//!
//! let options = BatchOptions {
//!     copies_per_file: 3,
//!     seed: Some(42),
//!     ..BatchOptions::default()
//! };
//!
//! // Plan the run, then write every output
//! let structure = read_structure("./books", options.copies_per_file, options.out_suffix_start)?;
//! let summary = write_all(&structure, &options)?;
//! println!("wrote {} file(s)", summary.files_written);
//! # Ok::<(), tablewash::PipelineError>(())
//! ```

pub mod batch;
pub mod error;
pub mod perturb;
pub mod prelude;
pub mod structure;

// Re-export core types
pub use tablewash_core::{
    CellAddress,
    CellData,
    CellRange,
    // Cell types
    CellValue,
    // Error types
    Error,
    FontStyle,
    NumberFormat,
    Result,
    // Style types
    Style,
    StylePool,
    // Table type
    Table,
    // Main types
    Workbook,
    Worksheet,
    MAX_COLS,
    // Constants
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use tablewash_xlsx::{XlsxError, XlsxReader, XlsxWriter};

// Re-export pipeline types
pub use batch::{write_all, BatchOptions, BatchSummary};
pub use error::{PipelineError, PipelineResult};
pub use perturb::{max_decimal_places, perturb_column, GaussianFactor, PerturbStats};
pub use structure::{read_structure, BookPlan, SheetPlan, TablePlan, WorkbookStructure};

use std::path::Path;

/// Extension trait for Workbook to add file I/O
pub trait WorkbookExt {
    /// Open a workbook from a file
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;

    /// Save the workbook to a file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => {
                XlsxReader::read_file(path).map_err(|e| Error::other(e.to_string()))
            }
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") => {
                XlsxWriter::write_file(self, path).map_err(|e| Error::other(e.to_string()))
            }
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }
}

/// Plan a directory and write every output in one call
pub fn run_batch<P: AsRef<Path>>(
    in_dir: P,
    options: &BatchOptions,
) -> PipelineResult<BatchSummary> {
    let structure = read_structure(in_dir, options.copies_per_file, options.out_suffix_start)?;
    write_all(&structure, options)
}

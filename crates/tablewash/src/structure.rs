//! Workbook structure planning
//!
//! Scans an input directory for workbooks and records, per book, the
//! sheets, tables, and columns it contains plus the output paths its
//! copies will be written to. The plan is what the batch writer executes
//! and what callers can inspect or prune before running.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use tablewash_core::Workbook;
use tablewash_xlsx::XlsxReader;

/// The structure of every workbook found in an input directory
#[derive(Debug, Clone)]
pub struct WorkbookStructure {
    /// One plan per input workbook, in file name order
    pub books: Vec<BookPlan>,
}

impl WorkbookStructure {
    /// Number of input workbooks
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Check whether any workbooks were found
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

/// Plan for a single input workbook
#[derive(Debug, Clone)]
pub struct BookPlan {
    /// Input workbook path
    pub input: PathBuf,
    /// Output paths the perturbed copies will be written to
    pub outputs: Vec<PathBuf>,
    /// Sheets in the workbook, in workbook order
    pub sheets: Vec<SheetPlan>,
}

/// Plan for a single worksheet
#[derive(Debug, Clone)]
pub struct SheetPlan {
    /// Worksheet name
    pub name: String,
    /// Tables on the sheet, in insertion order
    pub tables: Vec<TablePlan>,
}

/// Plan for a single table
#[derive(Debug, Clone)]
pub struct TablePlan {
    /// Table name
    pub name: String,
    /// Column names to perturb, left to right
    pub columns: Vec<String>,
}

/// Scan `in_dir` and build the structure of every workbook in it
///
/// Workbooks whose file name starts with `~` or `$` (Office lock and temp
/// files) are skipped. Files are visited in name order so repeated runs
/// produce the same plan.
pub fn read_structure<P: AsRef<Path>>(
    in_dir: P,
    copies_per_file: usize,
    out_suffix_start: u32,
) -> PipelineResult<WorkbookStructure> {
    let in_dir = in_dir.as_ref();
    let inputs = scan_input_files(in_dir)?;

    let mut books = Vec::with_capacity(inputs.len());
    for input in inputs {
        let workbook = open_input(&input)?;

        let sheets = workbook
            .worksheets()
            .map(|sheet| SheetPlan {
                name: sheet.name().to_string(),
                tables: sheet
                    .tables()
                    .iter()
                    .map(|table| TablePlan {
                        name: table.name().to_string(),
                        columns: table.columns().to_vec(),
                    })
                    .collect(),
            })
            .collect();

        let outputs = output_paths(&input, copies_per_file, out_suffix_start);

        log::debug!(
            "planned {} with {} output(s)",
            input.display(),
            copies_per_file
        );

        books.push(BookPlan {
            input,
            outputs,
            sheets,
        });
    }

    Ok(WorkbookStructure { books })
}

/// Open an input workbook, tagging failures with the offending file
pub(crate) fn open_input(path: &Path) -> PipelineResult<Workbook> {
    XlsxReader::read_file(path).map_err(|source| PipelineError::OpenWorkbook {
        file: path.to_path_buf(),
        source,
    })
}

/// Find input workbooks in a directory, skipping lock and temp files
fn scan_input_files(in_dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for entry in fs::read_dir(in_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        if name.starts_with('~') || name.starts_with('$') {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("xlsx") {
            continue;
        }

        inputs.push(path);
    }

    inputs.sort();
    Ok(inputs)
}

/// Build the output paths for an input workbook
///
/// For `dir/book.xlsx` with a suffix start of 1001, the copies go to
/// `dir/book/book_1002.xlsx`, `dir/book/book_1003.xlsx`, and so on. The
/// first suffix in use is one past the start, matching the established
/// output naming of existing batch runs.
fn output_paths(input: &Path, copies: usize, suffix_start: u32) -> Vec<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("workbook");
    let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("xlsx");
    let dir = input.parent().unwrap_or_else(|| Path::new("")).join(stem);

    (0..copies)
        .map(|n| dir.join(format!("{}_{}.{}", stem, suffix_start + n as u32 + 1, ext)))
        .collect()
}

//! Batch writer
//!
//! Executes a [`WorkbookStructure`] plan: for every planned output, the
//! input workbook is reloaded fresh, every planned column is perturbed,
//! and the result is saved. Reloading per output keeps the copies
//! independent of one another.

use std::fs;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{PipelineError, PipelineResult};
use crate::perturb::{perturb_column, GaussianFactor, PerturbStats};
use crate::structure::{open_input, WorkbookStructure};
use tablewash_core::CellRange;
use tablewash_xlsx::XlsxWriter;

/// Settings for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Number of perturbed copies to write per input workbook
    pub copies_per_file: usize,
    /// Output suffix counter; the first copy gets `out_suffix_start + 1`
    pub out_suffix_start: u32,
    /// Mean of the Gaussian factor distribution
    pub factor_mean: f64,
    /// Standard deviation of the Gaussian factor distribution
    pub factor_std_dev: f64,
    /// Seed for the factor stream; None draws a fresh one per run
    pub seed: Option<u64>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            copies_per_file: 1,
            out_suffix_start: 1001,
            factor_mean: 1.0,
            factor_std_dev: 0.02,
            seed: None,
        }
    }
}

/// Outcome of a batch run
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchSummary {
    /// Output files written
    pub files_written: usize,
    /// Cells changed across all outputs
    pub stats: PerturbStats,
}

/// Write every planned output of a structure
///
/// Fails on the first output that cannot be produced; outputs already
/// written stay on disk.
pub fn write_all(
    structure: &WorkbookStructure,
    options: &BatchOptions,
) -> PipelineResult<BatchSummary> {
    let factor = GaussianFactor::new(options.factor_mean, options.factor_std_dev)?;
    let mut rng: StdRng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut summary = BatchSummary::default();

    for book in &structure.books {
        for output in &book.outputs {
            // Reload the input fresh for each output copy
            let mut workbook = open_input(&book.input)?;

            for sheet_plan in &book.sheets {
                let sheet = workbook
                    .worksheet_by_name_mut(&sheet_plan.name)
                    .ok_or_else(|| PipelineError::SheetNotFound {
                        file: book.input.clone(),
                        sheet: sheet_plan.name.clone(),
                    })?;

                // Resolve every column range before mutating any cell, so
                // a bad plan fails the output before it is half-perturbed.
                let mut ranges: Vec<CellRange> = Vec::new();
                for table_plan in &sheet_plan.tables {
                    let table = sheet.table(&table_plan.name).ok_or_else(|| {
                        PipelineError::TableNotFound {
                            sheet: sheet_plan.name.clone(),
                            table: table_plan.name.clone(),
                        }
                    })?;
                    for column in &table_plan.columns {
                        ranges.push(table.column_data_range_by_name(column)?);
                    }
                }

                for range in ranges {
                    let stats = perturb_column(sheet, range, &factor, &mut rng)?;
                    summary.stats.merge(stats);
                }
            }

            if let Some(dir) = output.parent() {
                fs::create_dir_all(dir)?;
            }
            XlsxWriter::write_file(&workbook, output).map_err(|source| {
                PipelineError::SaveWorkbook {
                    file: output.clone(),
                    source,
                }
            })?;
            summary.files_written += 1;

            log::info!("wrote {}", output.display());
        }
    }

    Ok(summary)
}

//! Pipeline error types

use std::path::PathBuf;

use thiserror::Error;

/// Result type for pipeline operations
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while planning or running a batch
#[derive(Debug, Error)]
pub enum PipelineError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] tablewash_core::Error),

    /// An input workbook could not be opened or parsed
    #[error("Failed to open {file}: {source}")]
    OpenWorkbook {
        /// Offending workbook file
        file: PathBuf,
        /// Underlying format error
        #[source]
        source: tablewash_xlsx::XlsxError,
    },

    /// An output workbook could not be written
    #[error("Failed to write {file}: {source}")]
    SaveWorkbook {
        /// Output file being written
        file: PathBuf,
        /// Underlying format error
        #[source]
        source: tablewash_xlsx::XlsxError,
    },

    /// A planned sheet disappeared between planning and writing
    #[error("Sheet not found in {file}: {sheet}")]
    SheetNotFound {
        /// Workbook file being processed
        file: PathBuf,
        /// Missing sheet name
        sheet: String,
    },

    /// A planned table disappeared between planning and writing
    #[error("Table not found on sheet '{sheet}': {table}")]
    TableNotFound {
        /// Sheet the table was planned on
        sheet: String,
        /// Missing table name
        table: String,
    },

    /// Invalid perturbation factor parameters
    #[error("Invalid perturbation factor: {0}")]
    Factor(String),
}

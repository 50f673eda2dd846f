//! Prelude module - common imports for tablewash users
//!
//! ```rust
//! use tablewash::prelude::*;
//! ```

pub use crate::{
    // Pipeline entry points
    read_structure,
    run_batch,
    write_all,

    // Pipeline types
    BatchOptions,
    BatchSummary,
    BookPlan,
    CellAddress,
    CellRange,
    // Cell types
    CellValue,
    // Error types
    Error,
    FontStyle,
    GaussianFactor,
    NumberFormat,
    PerturbStats,
    PipelineError,
    PipelineResult,
    Result,
    SheetPlan,
    // Style types
    Style,
    // Table type
    Table,
    TablePlan,
    // Main types
    Workbook,
    // Extension traits
    WorkbookExt,
    WorkbookStructure,
    Worksheet,
    // I/O types
    XlsxReader,
    XlsxWriter,
};

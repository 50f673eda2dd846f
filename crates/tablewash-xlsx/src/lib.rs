//! # tablewash-xlsx
//!
//! XLSX (Office Open XML) reader and writer for tablewash.
//!
//! Reads and writes the subset of the format tablewash works with: cell
//! values, fonts and number formats, and worksheet tables.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;
mod tables;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;

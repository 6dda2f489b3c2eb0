//! SheetLens - spreadsheet structure and formatting analyzer
//!
//! This library reads modern (`.xlsx`/`.xlsm`) and legacy (`.xls`) workbooks
//! and normalizes both into one canonical [`Workbook`] model, which the
//! report writers then render.
//!
//! # Features
//!
//! - Cell values, formulas with cached results, and number formats
//! - Resolved cell formatting (font, fill, border, alignment, protection)
//! - Merged ranges, dimensions, validations, conditional formats
//! - Charts, images, print settings, defined names
//! - JSON, YAML, HTML, text, CSV and Excel reports
//!
//! Extraction never fails on a single bad attribute: it is reported through
//! [`diagnostics::Diagnostics`] and left absent.
//!
//! # Example
//!
//! ```no_run
//! use royalbit_sheetlens::analyze_file;
//! use royalbit_sheetlens::diagnostics::TracingDiagnostics;
//! use std::path::Path;
//!
//! let workbook = analyze_file(Path::new("budget.xlsx"), &TracingDiagnostics)?;
//!
//! println!("Worksheets: {}", workbook.worksheets.len());
//! println!("Cells: {}", workbook.total_cells());
//! # Ok::<(), royalbit_sheetlens::error::LensError>(())
//! ```

pub mod assembler;
pub mod cli;
pub mod coords;
pub mod diagnostics;
pub mod error;
pub mod excel;
pub mod extract;
pub mod model;
pub mod source;
pub mod writer;

// Re-export commonly used types
pub use assembler::{analyze_file, detect_format, DocumentAssembler};
pub use error::{LensError, LensResult};
pub use model::{Cell, CellValue, SourceFormat, Workbook, Worksheet};

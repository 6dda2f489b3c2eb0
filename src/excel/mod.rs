//! Excel integration
//!
//! - Read: `.xlsx` / `.xlsm` / `.xls` → source views
//!   - values, formulas, merges, visibility (calamine)
//!   - styles, layout, rules, drawings, properties from the zip package (zip + roxmltree)
//!   - fonts, XF records, row and column dimensions from the BIFF stream (cfb)
//! - Export: Workbook model → `.xlsx` summary report (rust_xlsxwriter)

pub mod biff;
mod exporter;
pub mod ooxml;
pub mod reader;

pub use exporter::{analysis_sheet_name, ExcelExporter};
pub use reader::{read_legacy, read_modern};

//! Canonical workbook model.
//!
//! Both source formats are normalized into these types. Everything here is a
//! read-only snapshot: built once during assembly, then only traversed by the
//! writers.

mod cell;
mod chart;
mod formatting;
mod image;
mod workbook;
mod worksheet;

pub use cell::{Cell, CellValue, DataType};
pub use chart::{Axis, Chart, ChartPosition, ChartSeries, Legend};
pub use formatting::{Alignment, Border, BorderSide, CellFormatting, Color, Fill, Font, Protection};
pub use image::{Image, ImageFormat};
pub use workbook::{CalculationMode, DefinedName, Properties, SourceFormat, Workbook};
pub use worksheet::{
    BorderDelta, ColumnDimension, ConditionalFormatting, DataValidation, DifferentialFormat,
    FillDelta, FontDelta, HeaderFooter, PrintSettings, RowDimension, SheetState, SheetView,
    Worksheet,
};

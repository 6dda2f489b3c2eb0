use serde::Serialize;
use std::collections::BTreeMap;

use super::cell::Cell;
use super::chart::Chart;
use super::formatting::Color;
use super::image::Image;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDimension {
    pub column: String,
    pub width: f64,
    pub hidden: bool,
    pub custom_width: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDimension {
    pub row: u32,
    pub height: f64,
    pub hidden: bool,
    pub custom_height: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataValidation {
    pub sqref: String,
    pub validation_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula2: Option<String>,
    pub allow_blank: bool,
    pub show_input_message: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_message: Option<String>,
    pub show_error_message: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub error_style: String,
}

/// Font properties a differential format overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FontDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FillDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg_color: Option<Color>,
}

/// Per-side border styles a differential format overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BorderDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<String>,
}

/// Partial formatting: only the properties the rule actually sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DifferentialFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderDelta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalFormatting {
    pub sqref: String,
    pub rule_type: String,
    pub priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    pub stop_if_true: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dxf_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_description: Option<DifferentialFormat>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintSettings {
    pub orientation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_size: Option<u32>,
    pub scale: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_to_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_to_height: Option<u32>,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_header: f64,
    pub margin_footer: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_titles_rows: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_titles_cols: Option<String>,
    pub print_gridlines: bool,
    pub print_headings: bool,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            orientation: "portrait".to_string(),
            paper_size: None,
            scale: 100,
            fit_to_width: None,
            fit_to_height: None,
            margin_left: 0.7,
            margin_right: 0.7,
            margin_top: 0.75,
            margin_bottom: 0.75,
            margin_header: 0.3,
            margin_footer: 0.3,
            print_area: None,
            print_titles_rows: None,
            print_titles_cols: None,
            print_gridlines: false,
            print_headings: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderFooter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odd_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odd_footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub even_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub even_footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_footer: Option<String>,
    pub different_odd_even: bool,
    pub different_first: bool,
    pub scale_with_doc: bool,
    pub align_with_margins: bool,
}

impl Default for HeaderFooter {
    fn default() -> Self {
        Self {
            odd_header: None,
            odd_footer: None,
            even_header: None,
            even_footer: None,
            first_header: None,
            first_footer: None,
            different_odd_even: false,
            different_first: false,
            scale_with_doc: true,
            align_with_margins: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SheetState {
    #[default]
    #[serde(rename = "visible")]
    Visible,
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "veryHidden")]
    VeryHidden,
}

impl SheetState {
    /// Unknown tags fall back to visible.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "hidden" => SheetState::Hidden,
            "veryHidden" => SheetState::VeryHidden,
            _ => SheetState::Visible,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SheetState::Visible => "visible",
            SheetState::Hidden => "hidden",
            SheetState::VeryHidden => "veryHidden",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetView {
    pub zoom_scale: u32,
    pub zoom_scale_normal: u32,
    pub show_gridlines: bool,
    pub show_row_col_headers: bool,
}

impl Default for SheetView {
    fn default() -> Self {
        Self {
            zoom_scale: 100,
            zoom_scale_normal: 100,
            show_gridlines: true,
            show_row_col_headers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Worksheet {
    pub name: String,
    pub index: usize,
    /// Row-major scan order.
    pub cells: Vec<Cell>,
    pub merged_cells: Vec<String>,
    pub column_dimensions: BTreeMap<String, ColumnDimension>,
    pub row_dimensions: BTreeMap<u32, RowDimension>,
    pub data_validations: Vec<DataValidation>,
    pub conditional_formatting: Vec<ConditionalFormatting>,
    pub charts: Vec<Chart>,
    pub images: Vec<Image>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_settings: Option<PrintSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_footer: Option<HeaderFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeze_panes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_color: Option<Color>,
    pub sheet_state: SheetState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_view: Option<SheetView>,
}

impl Worksheet {
    /// An empty, visible sheet.
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            cells: Vec::new(),
            merged_cells: Vec::new(),
            column_dimensions: BTreeMap::new(),
            row_dimensions: BTreeMap::new(),
            data_validations: Vec::new(),
            conditional_formatting: Vec::new(),
            charts: Vec::new(),
            images: Vec::new(),
            print_settings: None,
            header_footer: None,
            freeze_panes: None,
            auto_filter: None,
            tab_color: None,
            sheet_state: SheetState::Visible,
            sheet_view: None,
        }
    }

    /// Look up a kept cell by coordinate.
    pub fn cell(&self, coordinate: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.coordinate == coordinate)
    }

    /// `(max_row, max_column)` over the kept cells.
    pub fn extent(&self) -> (u32, u32) {
        self.cells.iter().fold((0, 0), |(rows, cols), cell| {
            (rows.max(cell.row), cols.max(cell.column))
        })
    }
}

//! Source view of an XML-packaged workbook.

use super::{Probe, SourceBorder, SourceCell, SourceColor, SourceFill, SourceFont};
use crate::coords::CellRange;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    /// W3CDTF text as stored in the core properties part.
    pub created: Option<String>,
    pub modified: Option<String>,
    pub category: Option<String>,
    pub content_status: Option<String>,
    pub version: Option<String>,
    pub revision: Option<String>,
    pub application: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceDefinedName {
    pub name: String,
    /// `(sheet, reference)` pairs; the sheet is absent for workbook-wide targets.
    pub destinations: Probe<Vec<(Option<String>, String)>>,
    /// The raw definition text.
    pub attr_text: Option<String>,
    pub local_sheet_id: Option<u32>,
    pub hidden: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMargins {
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub header: Option<f64>,
    pub footer: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePageSetup {
    pub orientation: Option<String>,
    pub paper_size: Option<u32>,
    pub scale: Option<u32>,
    pub fit_to_width: Option<u32>,
    pub fit_to_height: Option<u32>,
    pub margins: Option<SourceMargins>,
    pub print_gridlines: Option<bool>,
    pub print_headings: Option<bool>,
    pub print_area: Option<String>,
    /// Raw repeat-rows/columns expression, e.g. `'Data'!$1:$2,'Data'!$A:$A`.
    pub print_titles: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceHeaderFooter {
    pub odd_header: Option<String>,
    pub odd_footer: Option<String>,
    pub even_header: Option<String>,
    pub even_footer: Option<String>,
    pub first_header: Option<String>,
    pub first_footer: Option<String>,
    pub different_odd_even: Option<bool>,
    pub different_first: Option<bool>,
    pub scale_with_doc: Option<bool>,
    pub align_with_margins: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSheetView {
    pub zoom_scale: Option<u32>,
    pub zoom_scale_normal: Option<u32>,
    pub show_gridlines: Option<bool>,
    pub show_row_col_headers: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceColumn {
    pub column: String,
    pub width: Option<f64>,
    pub hidden: Option<bool>,
    pub custom_width: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    pub row: u32,
    pub height: Option<f64>,
    pub hidden: Option<bool>,
    pub custom_height: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceValidation {
    pub sqref: Option<String>,
    pub validation_type: Option<String>,
    pub operator: Option<String>,
    pub formula1: Option<String>,
    pub formula2: Option<String>,
    pub allow_blank: Option<bool>,
    pub show_input_message: Option<bool>,
    pub prompt_title: Option<String>,
    pub prompt: Option<String>,
    pub show_error_message: Option<bool>,
    pub error_title: Option<String>,
    pub error: Option<String>,
    pub error_style: Option<String>,
}

/// Formula slot of a conditional rule; some writers store a bare scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFormula {
    Scalar(String),
    List(Vec<String>),
}

/// Differential format attached to a conditional rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceDxf {
    pub font: Option<SourceFont>,
    pub fill: Option<SourceFill>,
    pub border: Option<SourceBorder>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceRule {
    pub rule_type: Option<String>,
    pub priority: Option<i64>,
    pub formula: Option<SourceFormula>,
    pub operator: Option<String>,
    pub stop_if_true: Option<bool>,
    pub dxf_id: Option<u32>,
    pub dxf: Probe<Option<SourceDxf>>,
}

impl Default for SourceRule {
    fn default() -> Self {
        Self {
            rule_type: None,
            priority: None,
            formula: None,
            operator: None,
            stop_if_true: None,
            dxf_id: None,
            dxf: Ok(None),
        }
    }
}

/// Conditional rules in whichever shape the parser enumerates them.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleListing<R> {
    /// Range reference mapped to the rules sharing it.
    ByRange(Vec<(String, Vec<R>)>),
    /// One entry per rule, each carrying its own range.
    Flat(Vec<(String, R)>),
}

impl<R> Default for RuleListing<R> {
    fn default() -> Self {
        RuleListing::Flat(Vec::new())
    }
}

impl<R> RuleListing<R> {
    /// `(sqref, rule)` pairs in source order, whatever the shape.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (&str, &R)> + '_> {
        match self {
            RuleListing::ByRange(groups) => Box::new(
                groups
                    .iter()
                    .flat_map(|(sqref, rules)| rules.iter().map(move |r| (sqref.as_str(), r))),
            ),
            RuleListing::Flat(rules) => {
                Box::new(rules.iter().map(|(sqref, r)| (sqref.as_str(), r)))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRun {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RichText {
    pub paragraphs: Vec<Paragraph>,
}

/// Chart or axis title: `tx -> rich -> p -> r -> t`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTitle {
    pub rich: Option<RichText>,
}

impl SourceTitle {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            rich: Some(RichText {
                paragraphs: vec![Paragraph {
                    runs: vec![TextRun {
                        text: Some(text.into()),
                    }],
                }],
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSeries {
    pub title: Option<String>,
    pub values: Option<String>,
    pub categories: Option<String>,
    /// Present only when the series shape uses a solid fill.
    pub solid_fill: Option<SourceColor>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceAxis {
    pub title: Option<SourceTitle>,
    pub scaling_min: Option<f64>,
    pub scaling_max: Option<f64>,
    pub major_unit: Option<f64>,
    pub minor_unit: Option<f64>,
    pub number_format: Option<String>,
    pub position: Option<String>,
    pub deleted: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceLegend {
    pub position: Option<String>,
    pub overlay: Option<bool>,
}

/// 0-based drawing marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnchorMarker {
    pub col: u32,
    pub row: u32,
    pub col_offset: i64,
    pub row_offset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorExtent {
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceAnchor {
    pub from: Option<AnchorMarker>,
    pub to: Option<AnchorMarker>,
    /// Concrete size, when the anchor records one.
    pub extent: Option<AnchorExtent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceChart {
    /// Source class name, e.g. `BarChart3D`.
    pub class_name: String,
    pub title: Option<SourceTitle>,
    pub series: Probe<Vec<SourceSeries>>,
    pub x_axis: Option<Probe<SourceAxis>>,
    pub y_axis: Option<Probe<SourceAxis>>,
    pub legend: Option<Probe<SourceLegend>>,
    pub anchor: Option<SourceAnchor>,
    pub style: Option<u32>,
}

impl SourceChart {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            title: None,
            series: Ok(Vec::new()),
            x_axis: None,
            y_axis: None,
            legend: None,
            anchor: None,
            style: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub data: Probe<Vec<u8>>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub anchor: Option<SourceAnchor>,
    pub description: Option<String>,
}

/// One sheet as the shared extractors consume it. The legacy assembler
/// lowers its records into this shape too.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSheet {
    pub name: String,
    /// `visible`, `hidden` or `veryHidden`.
    pub state: Option<String>,
    pub cells: Vec<SourceCell>,
    pub merged: Vec<CellRange>,
    pub columns: Vec<SourceColumn>,
    pub rows: Vec<SourceRow>,
    pub page_setup: Option<SourcePageSetup>,
    pub header_footer: Option<SourceHeaderFooter>,
    pub freeze_panes: Option<String>,
    pub auto_filter: Option<String>,
    pub tab_color: Option<SourceColor>,
    pub view: Option<SourceSheetView>,
    pub validations: Vec<SourceValidation>,
    pub conditional_rules: RuleListing<SourceRule>,
    pub charts: Vec<SourceChart>,
    pub images: Vec<SourceImage>,
}

impl SourceSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: None,
            cells: Vec::new(),
            merged: Vec::new(),
            columns: Vec::new(),
            rows: Vec::new(),
            page_setup: None,
            header_footer: None,
            freeze_panes: None,
            auto_filter: None,
            tab_color: None,
            view: None,
            validations: Vec::new(),
            conditional_rules: RuleListing::default(),
            charts: Vec::new(),
            images: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModernWorkbook {
    pub properties: SourceProperties,
    pub defined_names: Vec<SourceDefinedName>,
    /// Index of the active tab, when recorded.
    pub active_sheet: Option<usize>,
    /// `calcPr/@calcMode`.
    pub calculation_mode: Option<String>,
    pub sheets: Vec<SourceSheet>,
}

//! Structure Extractor: sheet-level layout facts.

use regex::Regex;
use std::collections::BTreeMap;

use super::color::ColorResolver;
use super::Extraction;
use crate::coords::CellRange;
use crate::diagnostics::Diagnostics;
use crate::error::ExtractionWarning;
use crate::model::{
    Color, ColumnDimension, HeaderFooter, PrintSettings, RowDimension, SheetView,
};
use crate::source::{
    SourceColor, SourceColumn, SourceHeaderFooter, SourcePageSetup, SourceRow, SourceSheetView,
};

pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Repeat-rows and repeat-columns parsed out of a print-titles expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintTitles {
    pub rows: Option<String>,
    pub cols: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct StructureExtractor<'a> {
    colors: &'a ColorResolver,
}

impl<'a> StructureExtractor<'a> {
    pub fn new(colors: &'a ColorResolver) -> Self {
        Self { colors }
    }

    pub fn merged_ranges(&self, merged: &[CellRange]) -> Vec<String> {
        merged.iter().map(ToString::to_string).collect()
    }

    pub fn column_dimensions(&self, columns: &[SourceColumn]) -> BTreeMap<String, ColumnDimension> {
        columns
            .iter()
            .map(|col| {
                let dimension = ColumnDimension {
                    column: col.column.clone(),
                    width: col
                        .width
                        .filter(|w| w.is_finite() && *w > 0.0)
                        .unwrap_or(DEFAULT_COLUMN_WIDTH),
                    hidden: col.hidden.unwrap_or(false),
                    custom_width: col.custom_width.unwrap_or(false),
                };
                (col.column.clone(), dimension)
            })
            .collect()
    }

    pub fn row_dimensions(&self, rows: &[SourceRow]) -> BTreeMap<u32, RowDimension> {
        rows.iter()
            .map(|row| {
                let dimension = RowDimension {
                    row: row.row,
                    height: row
                        .height
                        .filter(|h| h.is_finite() && *h > 0.0)
                        .unwrap_or(DEFAULT_ROW_HEIGHT),
                    hidden: row.hidden.unwrap_or(false),
                    custom_height: row.custom_height.unwrap_or(false),
                };
                (row.row, dimension)
            })
            .collect()
    }

    /// `None` when the sheet carries no page setup at all.
    pub fn print_settings(
        &self,
        setup: Option<&SourcePageSetup>,
        sheet: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Option<PrintSettings> {
        let setup = setup?;
        let defaults = PrintSettings::default();
        let margins = setup.margins.clone().unwrap_or_default();

        let titles = match setup.print_titles.as_deref() {
            Some(expr) => parse_print_titles(expr, sheet)
                .settle(diagnostics)
                .unwrap_or_default(),
            None => PrintTitles::default(),
        };

        Some(PrintSettings {
            orientation: setup
                .orientation
                .clone()
                .filter(|o| !o.is_empty())
                .unwrap_or(defaults.orientation),
            paper_size: setup.paper_size,
            scale: setup.scale.filter(|s| *s > 0).unwrap_or(defaults.scale),
            fit_to_width: setup.fit_to_width,
            fit_to_height: setup.fit_to_height,
            margin_left: margins.left.unwrap_or(defaults.margin_left),
            margin_right: margins.right.unwrap_or(defaults.margin_right),
            margin_top: margins.top.unwrap_or(defaults.margin_top),
            margin_bottom: margins.bottom.unwrap_or(defaults.margin_bottom),
            margin_header: margins.header.unwrap_or(defaults.margin_header),
            margin_footer: margins.footer.unwrap_or(defaults.margin_footer),
            print_area: setup.print_area.clone().filter(|a| !a.is_empty()),
            print_titles_rows: titles.rows,
            print_titles_cols: titles.cols,
            print_gridlines: setup.print_gridlines.unwrap_or(false),
            print_headings: setup.print_headings.unwrap_or(false),
        })
    }

    pub fn header_footer(&self, source: Option<&SourceHeaderFooter>) -> Option<HeaderFooter> {
        let source = source?;
        Some(HeaderFooter {
            odd_header: source.odd_header.clone(),
            odd_footer: source.odd_footer.clone(),
            even_header: source.even_header.clone(),
            even_footer: source.even_footer.clone(),
            first_header: source.first_header.clone(),
            first_footer: source.first_footer.clone(),
            different_odd_even: source.different_odd_even.unwrap_or(false),
            different_first: source.different_first.unwrap_or(false),
            scale_with_doc: source.scale_with_doc.unwrap_or(true),
            align_with_margins: source.align_with_margins.unwrap_or(true),
        })
    }

    pub fn sheet_view(&self, view: Option<&SourceSheetView>) -> Option<SheetView> {
        let view = view?;
        let defaults = SheetView::default();
        Some(SheetView {
            zoom_scale: view.zoom_scale.unwrap_or(defaults.zoom_scale),
            zoom_scale_normal: view.zoom_scale_normal.unwrap_or(defaults.zoom_scale_normal),
            show_gridlines: view.show_gridlines.unwrap_or(defaults.show_gridlines),
            show_row_col_headers: view
                .show_row_col_headers
                .unwrap_or(defaults.show_row_col_headers),
        })
    }

    pub fn tab_color(&self, color: Option<&SourceColor>) -> Option<Color> {
        self.colors.resolve(color)
    }
}

/// Empty strings count as absent for pass-through anchors.
pub fn pass_through(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

/// Split a repeat-rows/columns expression into its row and column parts.
///
/// Each comma-separated part loses any `Sheet!` qualifier and is classified
/// as rows when its first reference character after `$` is a digit, columns
/// otherwise. Malformed parts, or two parts of the same kind, give no titles
/// at all.
pub fn parse_print_titles(expr: &str, sheet: &str) -> Extraction<PrintTitles> {
    let context = format!("print titles on '{}'", sheet);
    let part_pattern = match Regex::new(r"^\$?(\d+|[A-Za-z]{1,3}):\$?(\d+|[A-Za-z]{1,3})$") {
        Ok(re) => re,
        Err(e) => return Extraction::Recovered(ExtractionWarning::new(context, e.to_string())),
    };

    if expr.trim().is_empty() {
        return Extraction::Absent;
    }

    let mut titles = PrintTitles::default();
    for part in expr.split(',') {
        let part = part.trim();
        let reference = match part.rsplit_once('!') {
            Some((_, reference)) => reference,
            None => part,
        };

        let Some(caps) = part_pattern.captures(reference) else {
            return Extraction::Recovered(ExtractionWarning::new(
                context,
                format!("malformed expression '{}'", expr),
            ));
        };
        let start_is_row = caps[1].starts_with(|c: char| c.is_ascii_digit());
        let end_is_row = caps[2].starts_with(|c: char| c.is_ascii_digit());
        if start_is_row != end_is_row {
            return Extraction::Recovered(ExtractionWarning::new(
                context,
                format!("mixed row/column range '{}'", reference),
            ));
        }

        let slot = if start_is_row {
            &mut titles.rows
        } else {
            &mut titles.cols
        };
        if slot.is_some() {
            return Extraction::Recovered(ExtractionWarning::new(
                context,
                format!("ambiguous expression '{}'", expr),
            ));
        }
        *slot = Some(reference.to_string());
    }

    Extraction::Extracted(titles)
}

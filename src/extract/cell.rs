//! Cell Extractor.

use super::style::StyleExtractor;
use super::Extraction;
use crate::coords::{column_letter, coordinate, CellRange};
use crate::diagnostics::Diagnostics;
use crate::error::ExtractionWarning;
use crate::model::{Cell, CellFormatting, DataType};
use crate::source::SourceCell;

const DEFAULT_NUMBER_FORMAT: &str = "General";

pub struct CellExtractor<'a> {
    styles: StyleExtractor<'a>,
}

impl<'a> CellExtractor<'a> {
    pub fn new(styles: StyleExtractor<'a>) -> Self {
        Self { styles }
    }

    /// Kept cells of one sheet in row-major order.
    ///
    /// The used range is `A1` through the furthest populated row and column;
    /// records with a zero coordinate lie outside it and are ignored.
    pub fn extract(
        &self,
        cells: &[SourceCell],
        merged: &[CellRange],
        diagnostics: &dyn Diagnostics,
    ) -> Vec<Cell> {
        let mut ordered: Vec<&SourceCell> = cells
            .iter()
            .filter(|c| c.row >= 1 && c.column >= 1)
            .collect();
        ordered.sort_by_key(|c| (c.row, c.column));

        ordered
            .into_iter()
            .filter_map(|source| self.extract_cell(source, merged, diagnostics))
            .collect()
    }

    /// `None` when the cell has no value, no formula, no link or comment, and
    /// nothing visible in its style.
    pub fn extract_cell(
        &self,
        source: &SourceCell,
        merged: &[CellRange],
        diagnostics: &dyn Diagnostics,
    ) -> Option<Cell> {
        let coord = coordinate(source.row, source.column);

        let formatting = self.formatting(source, &coord).settle(diagnostics);
        let visible = formatting.as_ref().is_some_and(CellFormatting::is_visible);
        let annotated =
            matches!(source.hyperlink, Ok(Some(_))) || matches!(source.comment, Ok(Some(_)));
        if source.value.is_empty() && source.formula.is_none() && !visible && !annotated {
            return None;
        }

        let (data_type, calculated_value) = match source.formula {
            Some(_) => (DataType::Formula, Some(source.value.clone())),
            None => (source.value.data_type(), None),
        };

        let hyperlink = Extraction::from_probe(&source.hyperlink, &format!("{} hyperlink", coord))
            .settle(diagnostics);
        let comment = Extraction::from_probe(&source.comment, &format!("{} comment", coord))
            .settle(diagnostics);

        Some(Cell {
            is_merged: merged.iter().any(|r| r.contains(source.row, source.column)),
            coordinate: coord,
            row: source.row,
            column: source.column,
            column_letter: column_letter(source.column),
            value: source.value.clone(),
            data_type,
            number_format: source
                .number_format
                .clone()
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_NUMBER_FORMAT.to_string()),
            formula: source.formula.clone(),
            calculated_value,
            formatting,
            hyperlink,
            comment,
        })
    }

    /// A cell without a style record gets default formatting.
    pub fn formatting(&self, source: &SourceCell, coord: &str) -> Extraction<CellFormatting> {
        match &source.style {
            Ok(style) => Extraction::Extracted(self.styles.extract(style.as_ref())),
            Err(fault) => Extraction::Recovered(ExtractionWarning::new(
                format!("{} formatting", coord),
                &fault.message,
            )),
        }
    }
}

/// Used range as `(max_row, max_column)`, 1-based; `None` for an empty sheet.
pub fn used_range(cells: &[SourceCell]) -> Option<(u32, u32)> {
    cells
        .iter()
        .filter(|c| c.row >= 1 && c.column >= 1)
        .fold(None, |acc, c| match acc {
            None => Some((c.row, c.column)),
            Some((r, col)) => Some((r.max(c.row), col.max(c.column))),
        })
}

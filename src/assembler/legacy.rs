//! Legacy binary workbooks.
//!
//! Legacy records are lowered into the shared [`SourceSheet`] shape: twips
//! become points, 1/256 character units become widths, numeric codes become
//! style names and half-open merge tuples become inclusive ranges. The
//! shared extractors then run with the 8-color legacy palette.

use super::{assemble_sheet, DocumentAssembler};
use crate::coords::{column_letter, CellRange, CellRef};
use crate::diagnostics::Diagnostics;
use crate::extract::{ColorResolver, Palette};
use crate::model::{Properties, SourceFormat, Workbook};
use crate::source::{
    LegacyCell, LegacySheet, LegacyWorkbook, LegacyXf, Probe, SourceAlignment, SourceBorder,
    SourceBorderSide, SourceCell, SourceColor, SourceColumn, SourceFault, SourceFill, SourceFont,
    SourceProtection, SourceRow, SourceSheet, SourceStyle,
};

/// Pattern color index meaning "no fill".
const NO_FILL_INDEX: u32 = 64;

const BORDER_STYLES: [&str; 8] = [
    "none", "thin", "medium", "dashed", "dotted", "thick", "double", "hair",
];
const HORIZONTAL_ALIGN: [&str; 6] = ["general", "left", "center", "right", "fill", "justify"];
const VERTICAL_ALIGN: [&str; 4] = ["top", "center", "bottom", "justify"];

pub struct LegacyAssembler {
    source: LegacyWorkbook,
    colors: ColorResolver,
}

impl LegacyAssembler {
    pub fn new(source: LegacyWorkbook) -> Self {
        Self {
            source,
            colors: ColorResolver::new(Palette::Legacy),
        }
    }

    /// Shared-shape view of one legacy sheet.
    pub fn lower_sheet(&self, sheet: &LegacySheet, diagnostics: &dyn Diagnostics) -> SourceSheet {
        let mut lowered = SourceSheet::new(sheet.name.clone());
        lowered.state = Some(
            match sheet.visibility {
                1 => "hidden",
                2 => "veryHidden",
                _ => "visible",
            }
            .to_string(),
        );
        lowered.cells = sheet.cells.iter().map(|c| self.lower_cell(c)).collect();
        lowered.rows = sheet
            .rows
            .iter()
            .map(|r| SourceRow {
                row: r.row + 1,
                height: Some(r.height as f64 / 20.0),
                hidden: Some(r.hidden),
                custom_height: None,
            })
            .collect();
        lowered.columns = sheet
            .columns
            .iter()
            .map(|c| SourceColumn {
                column: column_letter(c.col + 1),
                width: Some(c.width as f64 / 256.0),
                hidden: Some(c.hidden),
                custom_width: None,
            })
            .collect();
        lowered.merged = sheet
            .merged
            .iter()
            .filter_map(|&(rlo, rhi, clo, chi)| {
                if rhi <= rlo || chi <= clo {
                    diagnostics.warn(&format!(
                        "merged range ({}, {}, {}, {}) on '{}' is empty, skipped",
                        rlo, rhi, clo, chi, sheet.name
                    ));
                    return None;
                }
                Some(CellRange::new(
                    CellRef::new(rlo + 1, clo + 1),
                    CellRef::new(rhi, chi),
                ))
            })
            .collect();
        lowered
    }

    fn lower_cell(&self, cell: &LegacyCell) -> SourceCell {
        let xf = cell.xf_index.map(|i| (i, self.source.xf_records.get(i)));
        let style: Probe<Option<SourceStyle>> = match xf {
            None => Ok(None),
            Some((_, Some(xf))) => Ok(Some(self.style(xf))),
            Some((i, None)) => Err(SourceFault::new(format!("XF record {} missing", i))),
        };
        let number_format = match xf {
            Some((_, Some(xf))) => self.source.number_format(xf.format_key).map(str::to_string),
            _ => None,
        };

        SourceCell {
            row: cell.row + 1,
            column: cell.col + 1,
            value: cell.value.clone(),
            formula: cell.formula.clone(),
            number_format,
            style,
            hyperlink: Ok(None),
            comment: Ok(None),
        }
    }

    /// XF record to the shared style record.
    pub fn style(&self, xf: &LegacyXf) -> SourceStyle {
        let font = self.source.fonts.get(xf.font_index).map(|font| SourceFont {
            name: Some(font.name.clone()),
            size: Some(font.height as f64 / 20.0),
            bold: Some(font.bold),
            italic: Some(font.italic),
            underline: Some(if font.underline_type != 0 { "single" } else { "none" }.to_string()),
            strike: Some(font.struck_out),
            color: font.colour_index.map(SourceColor::Indexed),
        });

        let fill = xf.background.map(|(pattern, background)| SourceFill {
            pattern_type: Some(
                if pattern != NO_FILL_INDEX { "solid" } else { "none" }.to_string(),
            ),
            fg_color: Some(SourceColor::Indexed(pattern)),
            bg_color: Some(SourceColor::Indexed(background)),
        });

        let side = |code: u8| {
            BORDER_STYLES
                .get(code as usize)
                .filter(|style| **style != "none")
                .map(|style| SourceBorderSide {
                    style: Some(style.to_string()),
                    color: None,
                })
        };
        let border = xf.border.map(|[left, right, top, bottom]| SourceBorder {
            left: side(left),
            right: side(right),
            top: side(top),
            bottom: side(bottom),
            ..Default::default()
        });

        let alignment = SourceAlignment {
            horizontal: HORIZONTAL_ALIGN
                .get(xf.hor_align as usize)
                .map(|s| s.to_string()),
            vertical: VERTICAL_ALIGN
                .get(xf.vert_align as usize)
                .map(|s| s.to_string()),
            text_rotation: Some(xf.rotation),
            wrap_text: Some(xf.text_wrapped),
            ..Default::default()
        };

        SourceStyle {
            font,
            fill,
            border,
            alignment: Some(alignment),
            protection: Some(SourceProtection {
                locked: Some(xf.cell_locked),
                hidden: Some(xf.formula_hidden),
            }),
        }
    }
}

impl DocumentAssembler for LegacyAssembler {
    fn format(&self) -> SourceFormat {
        SourceFormat::Legacy
    }

    /// Properties and defined names are not available for this format and
    /// stay empty.
    fn assemble(&self, file_path: &str, diagnostics: &dyn Diagnostics) -> Workbook {
        diagnostics.info(&format!(
            "Legacy workbook loaded with {} worksheets; charts, images and rules are not available",
            self.source.sheets.len()
        ));

        let worksheets = self
            .source
            .sheets
            .iter()
            .enumerate()
            .map(|(index, sheet)| {
                let lowered = self.lower_sheet(sheet, diagnostics);
                assemble_sheet(index, &lowered, &self.colors, diagnostics)
            })
            .collect::<Vec<_>>();

        let active_sheet_index = self
            .source
            .active_sheet
            .filter(|i| *i < worksheets.len())
            .unwrap_or(0);

        Workbook {
            file_path: file_path.to_string(),
            file_format: self.format(),
            properties: Properties::default(),
            defined_names: Vec::new(),
            worksheets,
            active_sheet_index,
            calculation_mode: Default::default(),
        }
    }
}

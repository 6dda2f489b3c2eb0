//! Source view of a legacy binary workbook.
//!
//! Units and codes are kept as stored: twips, 1/256 character widths,
//! palette indices, numeric alignment and border codes. The legacy assembler
//! translates them.

use crate::model::CellValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyFont {
    pub name: String,
    /// Twips (1/20 point).
    pub height: u32,
    pub bold: bool,
    pub italic: bool,
    /// 0 means no underline.
    pub underline_type: u8,
    pub struck_out: bool,
    pub colour_index: Option<u32>,
}

/// Extended-format record: one per distinct cell style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyXf {
    pub font_index: usize,
    pub format_key: u32,
    /// `(pattern_colour_index, background_colour_index)`.
    pub background: Option<(u32, u32)>,
    /// Line-style codes, left/right/top/bottom.
    pub border: Option<[u8; 4]>,
    pub hor_align: u8,
    pub vert_align: u8,
    pub rotation: i32,
    pub text_wrapped: bool,
    pub cell_locked: bool,
    pub formula_hidden: bool,
}

/// 0-based coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyCell {
    pub row: u32,
    pub col: u32,
    pub value: CellValue,
    pub formula: Option<String>,
    pub xf_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyRow {
    pub row: u32,
    /// Twips.
    pub height: u32,
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyColumn {
    pub col: u32,
    /// 1/256 of a character width.
    pub width: u32,
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacySheet {
    pub name: String,
    /// 0 visible, 1 hidden, 2 very hidden.
    pub visibility: u8,
    pub cells: Vec<LegacyCell>,
    pub rows: Vec<LegacyRow>,
    pub columns: Vec<LegacyColumn>,
    /// Half-open `(rlo, rhi, clo, chi)`, 0-based.
    pub merged: Vec<(u32, u32, u32, u32)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyWorkbook {
    pub xf_records: Vec<LegacyXf>,
    pub fonts: Vec<LegacyFont>,
    /// Number format strings keyed by format key.
    pub number_formats: Vec<(u32, String)>,
    pub active_sheet: Option<usize>,
    pub sheets: Vec<LegacySheet>,
}

impl LegacyWorkbook {
    pub fn number_format(&self, key: u32) -> Option<&str> {
        self.number_formats
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, fmt)| fmt.as_str())
    }
}

//! BIFF records of a legacy workbook stream that calamine reads past.
//!
//! calamine decodes values and formulas. This module walks the same
//! `Workbook` stream for the formatting side: FONT, FORMAT and XF records
//! from the globals substream, the active tab from WINDOW1, and ROW, COLINFO
//! and per-cell XF indices from each worksheet substream. BIFF5 and BIFF8
//! are both read; BIFF5 strings and compressed BIFF8 strings are decoded as
//! Windows-1252.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use thiserror::Error;

use crate::excel::ooxml::builtin_number_format;
use crate::source::{LegacyColumn, LegacyFont, LegacyRow, LegacyXf};

const BOF: u16 = 0x0809;
const EOF: u16 = 0x000A;
const FONT: u16 = 0x0031;
const FORMAT: u16 = 0x041E;
const XF: u16 = 0x00E0;
const BOUNDSHEET: u16 = 0x0085;
const WINDOW1: u16 = 0x003D;
const ROW: u16 = 0x0208;
const COLINFO: u16 = 0x007D;
const MULRK: u16 = 0x00BD;
const MULBLANK: u16 = 0x00BE;

/// Records whose first six bytes are `row, column, xf`.
const CELL_RECORDS: [u16; 8] = [
    0x0006, // FORMULA
    0x00D6, // RSTRING
    0x00FD, // LABELSST
    0x0201, // BLANK
    0x0203, // NUMBER
    0x0204, // LABEL
    0x0205, // BOOLERR
    0x027E, // RK
];

const BIFF8_VERSION: u16 = 0x0600;
const LAST_COLUMN: u32 = 255;
/// Palette slot 0x7FFF is the window-text system color.
const SYSTEM_TEXT_COLOR: u16 = 0x7FFF;
const NO_FILL_INDEX: u32 = 64;

#[derive(Error, Debug)]
pub enum BiffError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing workbook stream (expected `Workbook` or `Book`)")]
    MissingStream,

    #[error("truncated record at offset {0}")]
    Truncated(usize),

    #[error("stream does not start with a BOF record")]
    NotBiff,
}

/// Formatting records of one legacy workbook.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BiffView {
    pub fonts: Vec<LegacyFont>,
    pub xf_records: Vec<LegacyXf>,
    /// Built-in codes not overridden by a FORMAT record, then the FORMAT
    /// records in stream order.
    pub number_formats: Vec<(u32, String)>,
    /// Name of the active tab.
    pub active_sheet: Option<String>,
    pub sheets: Vec<BiffSheet>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BiffSheet {
    pub name: String,
    pub rows: Vec<LegacyRow>,
    pub columns: Vec<LegacyColumn>,
    /// 0-based `(row, column)` to XF index, blanks included.
    pub cell_xfs: BTreeMap<(u32, u32), usize>,
}

pub fn read_biff(path: &Path) -> Result<BiffView, BiffError> {
    let mut compound = cfb::open(path)?;
    let mut stream = None;
    for candidate in ["/Workbook", "/Book", "Workbook", "Book"] {
        if let Ok(found) = compound.open_stream(candidate) {
            stream = Some(found);
            break;
        }
    }
    let mut stream = stream.ok_or(BiffError::MissingStream)?;

    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    parse_workbook_stream(&bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Record<'a> {
    id: u16,
    data: &'a [u8],
}

/// Physical records from `offset`; a truncated record ends the walk with an
/// error.
struct Records<'a> {
    stream: &'a [u8],
    offset: usize,
}

impl<'a> Records<'a> {
    fn from_offset(stream: &'a [u8], offset: usize) -> Self {
        Self { stream, offset }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>, BiffError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.stream.len() {
            return None;
        }
        let start = self.offset;
        let Some(header) = self.stream.get(start..start + 4) else {
            self.offset = self.stream.len();
            return Some(Err(BiffError::Truncated(start)));
        };
        let id = u16::from_le_bytes([header[0], header[1]]);
        let len = u16::from_le_bytes([header[2], header[3]]) as usize;
        let Some(data) = self.stream.get(start + 4..start + 4 + len) else {
            self.offset = self.stream.len();
            return Some(Err(BiffError::Truncated(start)));
        };
        self.offset = start + 4 + len;
        Some(Ok(Record { id, data }))
    }
}

fn u16_at(data: &[u8], at: usize) -> Option<u16> {
    data.get(at..at + 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn u32_at(data: &[u8], at: usize) -> Option<u32> {
    data.get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    offset: usize,
    is_worksheet: bool,
}

fn parse_workbook_stream(stream: &[u8]) -> Result<BiffView, BiffError> {
    let mut records = Records::from_offset(stream, 0);
    let first = records.next().ok_or(BiffError::NotBiff)??;
    if first.id != BOF {
        return Err(BiffError::NotBiff);
    }
    let biff8 = u16_at(first.data, 0) == Some(BIFF8_VERSION);

    let mut view = BiffView::default();
    let mut custom_formats: Vec<(u32, String)> = Vec::new();
    let mut entries = Vec::new();
    let mut active_tab = None;

    for record in records {
        let record = record?;
        match record.id {
            EOF => break,
            FONT => {
                if let Some(font) = font(record.data, biff8) {
                    view.fonts.push(font);
                }
            }
            FORMAT => {
                if let Some(format) = format(record.data, biff8) {
                    custom_formats.push(format);
                }
            }
            XF => {
                let xf = if biff8 {
                    xf_biff8(record.data)
                } else {
                    xf_biff5(record.data)
                };
                if let Some(xf) = xf {
                    view.xf_records.push(xf);
                }
            }
            BOUNDSHEET => {
                if let Some(entry) = boundsheet(record.data, biff8) {
                    entries.push(entry);
                }
            }
            WINDOW1 => active_tab = u16_at(record.data, 10).map(usize::from),
            _ => {}
        }
    }

    view.active_sheet = active_tab
        .and_then(|tab| entries.get(tab))
        .map(|entry: &SheetEntry| entry.name.clone());

    let builtin = (0..=49u32).filter_map(|key| {
        let code = builtin_number_format(key)?;
        (!custom_formats.iter().any(|(k, _)| *k == key)).then(|| (key, code.to_string()))
    });
    view.number_formats = builtin.collect();
    view.number_formats.extend(custom_formats);

    for entry in entries.into_iter().filter(|e| e.is_worksheet) {
        let mut sheet = worksheet(stream, entry.offset)?;
        sheet.name = entry.name;
        view.sheets.push(sheet);
    }

    Ok(view)
}

/// Walk one worksheet substream from its BOF to its EOF.
fn worksheet(stream: &[u8], offset: usize) -> Result<BiffSheet, BiffError> {
    let mut sheet = BiffSheet::default();

    for record in Records::from_offset(stream, offset).skip(1) {
        let record = record?;
        let data = record.data;
        match record.id {
            EOF => break,
            ROW => {
                let (Some(row), Some(height), Some(flags)) =
                    (u16_at(data, 0), u16_at(data, 6), u16_at(data, 12))
                else {
                    continue;
                };
                sheet.rows.push(LegacyRow {
                    row: u32::from(row),
                    height: u32::from(height & 0x7FFF),
                    hidden: flags & 0x0020 != 0,
                });
            }
            COLINFO => {
                let (Some(first), Some(last), Some(width), Some(flags)) = (
                    u16_at(data, 0),
                    u16_at(data, 2),
                    u16_at(data, 4),
                    u16_at(data, 8),
                ) else {
                    continue;
                };
                let last = u32::from(last).min(LAST_COLUMN);
                for col in u32::from(first)..=last {
                    sheet.columns.push(LegacyColumn {
                        col,
                        width: u32::from(width),
                        hidden: flags & 0x0001 != 0,
                    });
                }
            }
            MULRK => spread_xfs(&mut sheet, data, 6),
            MULBLANK => spread_xfs(&mut sheet, data, 2),
            id if CELL_RECORDS.contains(&id) => {
                if let (Some(row), Some(col), Some(xf)) =
                    (u16_at(data, 0), u16_at(data, 2), u16_at(data, 4))
                {
                    sheet
                        .cell_xfs
                        .insert((u32::from(row), u32::from(col)), usize::from(xf));
                }
            }
            _ => {}
        }
    }

    Ok(sheet)
}

/// MULRK and MULBLANK: `row, first column`, then one XF per column in
/// `stride`-byte chunks, then the last column.
fn spread_xfs(sheet: &mut BiffSheet, data: &[u8], stride: usize) {
    let (Some(row), Some(first)) = (u16_at(data, 0), u16_at(data, 2)) else {
        return;
    };
    let Some(body) = data.get(4..data.len().saturating_sub(2)) else {
        return;
    };
    for (i, chunk) in body.chunks_exact(stride).enumerate() {
        let xf = u16::from_le_bytes([chunk[0], chunk[1]]);
        sheet
            .cell_xfs
            .insert((u32::from(row), u32::from(first) + i as u32), usize::from(xf));
    }
}

fn font(data: &[u8], biff8: bool) -> Option<LegacyFont> {
    let height = u16_at(data, 0)?;
    let flags = u16_at(data, 2)?;
    let color = u16_at(data, 4)?;
    let weight = u16_at(data, 6)?;
    let underline = *data.get(10)?;
    let name = if biff8 {
        short_unicode_string(data.get(14..)?)?
    } else {
        short_ansi_string(data.get(14..)?)?
    };
    Some(LegacyFont {
        name,
        height: u32::from(height),
        bold: weight >= 700,
        italic: flags & 0x0002 != 0,
        underline_type: underline,
        struck_out: flags & 0x0008 != 0,
        colour_index: (color != SYSTEM_TEXT_COLOR).then_some(u32::from(color)),
    })
}

fn format(data: &[u8], biff8: bool) -> Option<(u32, String)> {
    let key = u16_at(data, 0)?;
    let code = if biff8 {
        unicode_string(data.get(2..)?)?
    } else {
        short_ansi_string(data.get(2..)?)?
    };
    Some((u32::from(key), code))
}

fn boundsheet(data: &[u8], biff8: bool) -> Option<SheetEntry> {
    let offset = u32_at(data, 0)? as usize;
    let kind = *data.get(5)?;
    let name = if biff8 {
        short_unicode_string(data.get(6..)?)?
    } else {
        short_ansi_string(data.get(6..)?)?
    };
    Some(SheetEntry {
        name,
        offset,
        is_worksheet: kind == 0,
    })
}

/// BIFF8 font indices skip 4; the font table here has no gap.
fn font_slot(ifnt: u16) -> usize {
    let ifnt = usize::from(ifnt);
    if ifnt > 4 {
        ifnt - 1
    } else {
        ifnt
    }
}

/// 20-byte BIFF8 XF record.
fn xf_biff8(data: &[u8]) -> Option<LegacyXf> {
    let ifnt = u16_at(data, 0)?;
    let ifmt = u16_at(data, 2)?;
    let flags = u16_at(data, 4)?;
    let align = *data.get(6)?;
    let rotation = *data.get(7)?;
    let borders = u32_at(data, 10)?;
    let fill = u32_at(data, 14)?;
    let colors = u16_at(data, 18)?;

    let pattern = (fill >> 26) & 0x3F;
    let fore = u32::from(colors & 0x7F);
    let back = u32::from((colors >> 7) & 0x7F);

    Some(LegacyXf {
        font_index: font_slot(ifnt),
        format_key: u32::from(ifmt),
        background: Some((if pattern == 0 { NO_FILL_INDEX } else { fore }, back)),
        border: Some([
            (borders & 0x0F) as u8,
            ((borders >> 4) & 0x0F) as u8,
            ((borders >> 8) & 0x0F) as u8,
            ((borders >> 12) & 0x0F) as u8,
        ]),
        hor_align: align & 0x07,
        vert_align: (align >> 4) & 0x07,
        rotation: i32::from(rotation),
        text_wrapped: align & 0x08 != 0,
        cell_locked: flags & 0x0001 != 0,
        formula_hidden: flags & 0x0002 != 0,
    })
}

/// 16-byte BIFF5 XF record.
fn xf_biff5(data: &[u8]) -> Option<LegacyXf> {
    let ifnt = u16_at(data, 0)?;
    let ifmt = u16_at(data, 2)?;
    let flags = u16_at(data, 4)?;
    let align = *data.get(6)?;
    let fill = u32_at(data, 8)?;
    let sides = u32_at(data, 12)?;

    let pattern = (fill >> 16) & 0x3F;
    let fore = fill & 0x7F;
    let back = (fill >> 7) & 0x7F;

    Some(LegacyXf {
        font_index: font_slot(ifnt),
        format_key: u32::from(ifmt),
        background: Some((if pattern == 0 { NO_FILL_INDEX } else { fore }, back)),
        border: Some([
            ((sides >> 3) & 0x07) as u8,
            ((sides >> 6) & 0x07) as u8,
            (sides & 0x07) as u8,
            ((fill >> 22) & 0x07) as u8,
        ]),
        hor_align: align & 0x07,
        vert_align: (align >> 4) & 0x07,
        rotation: 0,
        text_wrapped: align & 0x08 != 0,
        cell_locked: flags & 0x0001 != 0,
        formula_hidden: flags & 0x0002 != 0,
    })
}

/// `ShortXLUnicodeString`: 8-bit count, flags, characters.
fn short_unicode_string(data: &[u8]) -> Option<String> {
    let count = usize::from(*data.first()?);
    let flags = *data.get(1)?;
    characters(data.get(2..)?, count, flags & 0x01 != 0)
}

/// `XLUnicodeString`: 16-bit count, flags, characters.
fn unicode_string(data: &[u8]) -> Option<String> {
    let count = usize::from(u16_at(data, 0)?);
    let flags = *data.get(2)?;
    characters(data.get(3..)?, count, flags & 0x01 != 0)
}

/// BIFF5 string: 8-bit count, code-page bytes.
fn short_ansi_string(data: &[u8]) -> Option<String> {
    let count = usize::from(*data.first()?);
    characters(data.get(1..)?, count, false)
}

fn characters(data: &[u8], count: usize, wide: bool) -> Option<String> {
    if wide {
        let units: Vec<u16> = data
            .get(..count * 2)?
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        Some(String::from_utf16_lossy(&units))
    } else {
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(data.get(..count)?);
        Some(text.into_owned())
    }
}

//! Container reader: opens a workbook with calamine and fills the source views.
//!
//! calamine supplies values, formulas, merges, sheet visibility and defined
//! names. The rest is overlaid from the container itself: the zip package
//! for modern workbooks ([`super::ooxml`]) and the BIFF stream for legacy
//! ones ([`super::biff`]). If the overlay cannot be read, the calamine view
//! is kept and the missing attributes stay absent.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, Data, Dimensions, Range, Reader, SheetType, SheetVisible, Xls, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};

use super::biff::{self, BiffView};
use super::ooxml::{self, PackageView};
use crate::coords::{CellRange, CellRef};
use crate::diagnostics::Diagnostics;
use crate::error::{LensError, LensResult};
use crate::model::CellValue;
use crate::source::{
    LegacyCell, LegacySheet, LegacyWorkbook, ModernWorkbook, Probe, SourceCell, SourceDefinedName,
    SourceFault, SourceSheet,
};

/// 0-based `(row, column)` to `(cached value, formula)`.
type CellMap = BTreeMap<(u32, u32), (CellValue, Option<String>)>;

pub fn read_modern(path: &Path, diagnostics: &dyn Diagnostics) -> LensResult<ModernWorkbook> {
    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook(path).map_err(|e: calamine::XlsxError| LensError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let defined_names = workbook
        .defined_names()
        .iter()
        .map(|(name, formula)| SourceDefinedName {
            name: name.clone(),
            destinations: destinations(formula),
            attr_text: Some(formula.clone()),
            local_sheet_id: None,
            hidden: None,
        })
        .collect();

    let mut sheets = Vec::new();
    for (name, visible) in worksheets(workbook.sheets_metadata()) {
        let values = workbook.worksheet_range(&name).unwrap_or_else(|e| {
            diagnostics.warn(&format!("worksheet '{}' unreadable: {}", name, e));
            Range::empty()
        });
        let formulas = workbook
            .worksheet_formula(&name)
            .map_err(|e| diagnostics.warn(&format!("formulas on '{}' unreadable: {}", name, e)))
            .ok();
        let merged = match workbook.worksheet_merge_cells(&name) {
            Some(Ok(dims)) => dims,
            Some(Err(e)) => {
                diagnostics.warn(&format!("merged cells on '{}' unreadable: {}", name, e));
                Vec::new()
            }
            None => Vec::new(),
        };

        let mut sheet = SourceSheet::new(name);
        sheet.state = Some(visibility_tag(visible).to_string());
        sheet.cells = cell_map(&values, formulas.as_ref())
            .into_iter()
            .map(|((row, col), (value, formula))| SourceCell {
                formula,
                ..SourceCell::new(row + 1, col + 1, value)
            })
            .collect();
        sheet.merged = merged
            .iter()
            .map(|d| {
                CellRange::new(
                    CellRef::new(d.start.0 + 1, d.start.1 + 1),
                    CellRef::new(d.end.0 + 1, d.end.1 + 1),
                )
            })
            .collect();
        sheets.push(sheet);
    }

    let mut modern = ModernWorkbook {
        defined_names,
        sheets,
        ..Default::default()
    };
    match ooxml::read_package(path, diagnostics) {
        Ok(package) => overlay_package(&mut modern, package),
        Err(e) => diagnostics.warn(&format!(
            "package parts of {} unreadable, formatting left at defaults: {}",
            path.display(),
            e
        )),
    }
    Ok(modern)
}

/// Package attributes on top of the calamine view. Package defined names
/// replace calamine's because they carry scope and visibility.
fn overlay_package(workbook: &mut ModernWorkbook, package: PackageView) {
    workbook.properties = package.properties;
    workbook.calculation_mode = package.calculation_mode;
    workbook.defined_names = package.defined_names;
    workbook.active_sheet = package
        .active_sheet
        .and_then(|name| workbook.sheets.iter().position(|s| s.name == name));

    for part in package.sheets {
        if let Some(sheet) = workbook.sheets.iter_mut().find(|s| s.name == part.name()) {
            part.apply_to(sheet);
        }
    }
}

pub fn read_legacy(path: &Path, diagnostics: &dyn Diagnostics) -> LensResult<LegacyWorkbook> {
    let mut workbook: Xls<BufReader<File>> =
        open_workbook(path).map_err(|e: calamine::XlsError| LensError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut sheets = Vec::new();
    for (name, visible) in worksheets(workbook.sheets_metadata()) {
        let values = workbook.worksheet_range(&name).unwrap_or_else(|e| {
            diagnostics.warn(&format!("worksheet '{}' unreadable: {}", name, e));
            Range::empty()
        });
        let formulas = workbook
            .worksheet_formula(&name)
            .map_err(|e| diagnostics.warn(&format!("formulas on '{}' unreadable: {}", name, e)))
            .ok();
        let merged = workbook
            .worksheet_merge_cells(&name)
            .unwrap_or_default()
            .iter()
            .map(half_open)
            .collect();

        sheets.push(LegacySheet {
            visibility: match visible {
                SheetVisible::Visible => 0,
                SheetVisible::Hidden => 1,
                SheetVisible::VeryHidden => 2,
            },
            cells: cell_map(&values, formulas.as_ref())
                .into_iter()
                .map(|((row, col), (value, formula))| LegacyCell {
                    row,
                    col,
                    value,
                    formula,
                    xf_index: None,
                })
                .collect(),
            merged,
            name,
            ..Default::default()
        });
    }

    let mut legacy = LegacyWorkbook {
        sheets,
        ..Default::default()
    };
    match biff::read_biff(path) {
        Ok(records) => overlay_biff(&mut legacy, records),
        Err(e) => diagnostics.warn(&format!(
            "BIFF records of {} unreadable, formatting left at defaults: {}",
            path.display(),
            e
        )),
    }
    Ok(legacy)
}

/// BIFF formatting records on top of the calamine view. Cells that only
/// carry an XF (blanks) are added with an empty value.
fn overlay_biff(workbook: &mut LegacyWorkbook, records: BiffView) {
    workbook.fonts = records.fonts;
    workbook.xf_records = records.xf_records;
    workbook.number_formats = records.number_formats;
    workbook.active_sheet = records
        .active_sheet
        .and_then(|name| workbook.sheets.iter().position(|s| s.name == name));

    for mut biff_sheet in records.sheets {
        let Some(sheet) = workbook.sheets.iter_mut().find(|s| s.name == biff_sheet.name) else {
            continue;
        };
        sheet.rows = biff_sheet.rows;
        sheet.columns = biff_sheet.columns;
        for cell in &mut sheet.cells {
            cell.xf_index = biff_sheet.cell_xfs.remove(&(cell.row, cell.col));
        }
        sheet
            .cells
            .extend(biff_sheet.cell_xfs.into_iter().map(|((row, col), xf)| LegacyCell {
                row,
                col,
                value: CellValue::Empty,
                formula: None,
                xf_index: Some(xf),
            }));
        sheet.cells.sort_by_key(|c| (c.row, c.col));
    }
}

/// Worksheets only, in tab order; chart sheets and macro sheets are skipped.
fn worksheets(metadata: &[calamine::Sheet]) -> Vec<(String, SheetVisible)> {
    metadata
        .iter()
        .filter(|s| s.typ == SheetType::WorkSheet)
        .map(|s| (s.name.clone(), s.visible))
        .collect()
}

fn visibility_tag(visible: SheetVisible) -> &'static str {
    match visible {
        SheetVisible::Visible => "visible",
        SheetVisible::Hidden => "hidden",
        SheetVisible::VeryHidden => "veryHidden",
    }
}

/// Inclusive dimensions to the legacy half-open `(rlo, rhi, clo, chi)` tuple.
fn half_open(dims: &Dimensions) -> (u32, u32, u32, u32) {
    (dims.start.0, dims.end.0 + 1, dims.start.1, dims.end.1 + 1)
}

/// Union of value and formula cells, keyed by absolute 0-based position.
///
/// A formula cell with no cached value keeps an empty value.
fn cell_map(values: &Range<Data>, formulas: Option<&Range<String>>) -> CellMap {
    let mut cells = CellMap::new();

    if let Some((row0, col0)) = values.start() {
        for (r, c, data) in values.used_cells() {
            let key = (row0 + r as u32, col0 + c as u32);
            cells.insert(key, (cell_value(data), None));
        }
    }

    if let Some(formulas) = formulas {
        if let Some((row0, col0)) = formulas.start() {
            for (r, c, text) in formulas.used_cells() {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let key = (row0 + r as u32, col0 + c as u32);
                let formula = if text.starts_with('=') {
                    text.to_string()
                } else {
                    format!("={}", text)
                };
                cells.entry(key).or_insert((CellValue::Empty, None)).1 = Some(formula);
            }
        }
    }

    cells
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => iso_datetime(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

fn iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Split a defined-name formula into `(sheet, reference)` destinations.
///
/// Anything that is not a list of sheet-qualified references (constants,
/// expressions, broken `#REF!` targets) is a fault; the caller falls back
/// to the raw text.
pub(crate) fn destinations(formula: &str) -> Probe<Vec<(Option<String>, String)>> {
    let formula = formula.trim().trim_start_matches('=');
    split_areas(formula)
        .into_iter()
        .map(|area| {
            let (sheet, reference) = area
                .rsplit_once('!')
                .ok_or_else(|| SourceFault::new(format!("'{}' has no sheet destination", area)))?;
            if reference.is_empty() || reference.contains("#REF") || sheet.contains("#REF") {
                return Err(SourceFault::new(format!("'{}' is a broken reference", area)));
            }
            Ok((Some(unquote_sheet(sheet)), reference.to_string()))
        })
        .collect()
}

/// Comma-separated areas, ignoring commas inside quoted sheet names.
pub(crate) fn split_areas(formula: &str) -> Vec<&str> {
    let mut areas = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, ch) in formula.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            ',' if !quoted => {
                areas.push(formula[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    areas.push(formula[start..].trim());
    areas.retain(|a| !a.is_empty());
    areas
}

fn unquote_sheet(sheet: &str) -> String {
    match sheet.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(inner) => inner.replace("''", "'"),
        None => sheet.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_destinations_from_qualified_references() {
        assert_eq!(
            destinations("Data!$B$10").unwrap(),
            vec![(Some("Data".to_string()), "$B$10".to_string())]
        );
        assert_eq!(
            destinations("'My, Sheet'!$A$1:$A$5,Other!$C$1").unwrap(),
            vec![
                (Some("My, Sheet".to_string()), "$A$1:$A$5".to_string()),
                (Some("Other".to_string()), "$C$1".to_string()),
            ]
        );
        assert_eq!(
            destinations("'It''s'!A1").unwrap()[0].0.as_deref(),
            Some("It's")
        );
    }

    #[test]
    fn test_destinations_fault_on_constants_and_broken_refs() {
        assert!(destinations("0.25").is_err());
        assert!(destinations("Data!#REF!").is_err());
        assert_eq!(destinations("").unwrap(), vec![]);
    }

    #[test]
    fn test_half_open_merge_tuple() {
        let dims = Dimensions {
            start: (0, 0),
            end: (0, 2),
        };
        assert_eq!(half_open(&dims), (0, 1, 0, 3));
    }

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(cell_value(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Boolean(true));
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(
            cell_value(&Data::Error(calamine::CellErrorType::Div0)),
            CellValue::Error("#DIV/0!".to_string())
        );
        assert_eq!(
            cell_value(&Data::DateTimeIso("2024-03-01".to_string())),
            CellValue::Date(
                NaiveDate::from_ymd_opt(2024, 3, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let diagnostics = crate::diagnostics::CollectedDiagnostics::new();
        let err = read_modern(Path::new("/no/such/book.xlsx"), &diagnostics).unwrap_err();
        assert_eq!(err.kind(), "open error");
    }

    #[test]
    fn test_missing_legacy_file_is_open_error() {
        let diagnostics = crate::diagnostics::CollectedDiagnostics::new();
        let err = read_legacy(Path::new("/no/such/book.xls"), &diagnostics).unwrap_err();
        assert_eq!(err.kind(), "open error");
    }
}

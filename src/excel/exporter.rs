//! Excel summary exporter: Workbook model → `.xlsx` report

use crate::error::{LensError, LensResult};
use crate::model::{Workbook, Worksheet};
use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook, Worksheet as XlsxWorksheet, XlsxError};
use std::collections::HashSet;
use std::path::Path;

/// Cells listed per analysis sheet.
const CELL_PREVIEW_LIMIT: usize = 100;
const MAX_SHEET_NAME: usize = 31;

const SECTION_FILL: u32 = 0xDDEBF7;
const HEADER_FILL: u32 = 0x4472C4;

fn export_error(what: &'static str) -> impl Fn(XlsxError) -> LensError {
    move |e| LensError::Export(format!("Failed to {}: {}", what, e))
}

/// Writes a Summary sheet plus one analysis sheet per worksheet.
pub struct ExcelExporter<'a> {
    workbook: &'a Workbook,
}

impl<'a> ExcelExporter<'a> {
    pub fn new(workbook: &'a Workbook) -> Self {
        Self { workbook }
    }

    pub fn export(&self, output_path: &Path) -> LensResult<()> {
        let mut report = XlsxWorkbook::new();

        self.write_summary(report.add_worksheet())?;

        let mut taken: HashSet<String> = HashSet::from(["summary".to_string()]);
        for ws in &self.workbook.worksheets {
            let name = analysis_sheet_name(&ws.name, &mut taken);
            let sheet = report.add_worksheet();
            sheet.set_name(&name).map_err(export_error("set worksheet name"))?;
            Self::write_analysis(sheet, ws)?;
        }

        report
            .save(output_path)
            .map_err(export_error("save Excel summary"))?;

        Ok(())
    }

    fn write_summary(&self, sheet: &mut XlsxWorksheet) -> LensResult<()> {
        let title = Format::new().set_bold().set_font_size(16);
        let label = Format::new().set_bold();
        let section = Format::new()
            .set_bold()
            .set_font_size(14)
            .set_background_color(Color::RGB(SECTION_FILL));
        let header = table_header();
        let err = export_error("write summary");

        sheet.set_name("Summary").map_err(export_error("set worksheet name"))?;
        sheet
            .merge_range(0, 0, 0, 1, "Excel Workbook Analysis Summary", &title)
            .map_err(&err)?;

        let wb = self.workbook;
        let mut row = 2;
        sheet.write_string_with_format(row, 0, "File Path:", &label).map_err(&err)?;
        sheet.write_string(row, 1, &wb.file_path).map_err(&err)?;
        row += 1;
        sheet.write_string_with_format(row, 0, "File Format:", &label).map_err(&err)?;
        sheet
            .write_string(row, 1, wb.file_format.as_str().to_uppercase())
            .map_err(&err)?;
        row += 1;
        sheet
            .write_string_with_format(row, 0, "Total Worksheets:", &label)
            .map_err(&err)?;
        sheet
            .write_number(row, 1, wb.worksheets.len() as f64)
            .map_err(&err)?;

        row += 2;
        sheet
            .write_string_with_format(row, 0, "Workbook Properties", &section)
            .map_err(&err)?;
        row += 1;
        let props = &wb.properties;
        let dated = |d: &Option<chrono::NaiveDateTime>| d.map(|d| d.to_string());
        for (name, value) in [
            ("Creator:", props.creator.clone()),
            ("Created:", dated(&props.created)),
            ("Modified:", dated(&props.modified)),
        ] {
            if let Some(value) = value {
                sheet.write_string_with_format(row, 0, name, &label).map_err(&err)?;
                sheet.write_string(row, 1, &value).map_err(&err)?;
                row += 1;
            }
        }

        row += 2;
        sheet
            .write_string_with_format(row, 0, "Worksheet Summary", &section)
            .map_err(&err)?;
        row += 1;
        for (col, name) in ["Name", "Cells", "Charts", "Images", "Merged Cells"]
            .iter()
            .enumerate()
        {
            sheet
                .write_string_with_format(row, col as u16, *name, &header)
                .map_err(&err)?;
        }
        for ws in &wb.worksheets {
            row += 1;
            sheet.write_string(row, 0, &ws.name).map_err(&err)?;
            sheet.write_number(row, 1, ws.cells.len() as f64).map_err(&err)?;
            sheet.write_number(row, 2, ws.charts.len() as f64).map_err(&err)?;
            sheet.write_number(row, 3, ws.images.len() as f64).map_err(&err)?;
            sheet
                .write_number(row, 4, ws.merged_cells.len() as f64)
                .map_err(&err)?;
        }

        sheet.set_column_width(0, 30).map_err(&err)?;
        sheet.set_column_width(1, 50).map_err(&err)?;
        Ok(())
    }

    fn write_analysis(sheet: &mut XlsxWorksheet, ws: &Worksheet) -> LensResult<()> {
        let label = Format::new().set_bold();
        let err = export_error("write worksheet analysis");

        sheet
            .write_string_with_format(
                0,
                0,
                format!("Analysis: {}", ws.name),
                &Format::new().set_bold().set_font_size(14),
            )
            .map_err(&err)?;

        let mut row = 2;
        for (name, count) in [
            ("Total Cells:", ws.cells.len()),
            ("Merged Cells:", ws.merged_cells.len()),
            ("Charts:", ws.charts.len()),
            ("Images:", ws.images.len()),
        ] {
            sheet.write_string_with_format(row, 0, name, &label).map_err(&err)?;
            sheet.write_number(row, 1, count as f64).map_err(&err)?;
            row += 1;
        }

        if !ws.cells.is_empty() {
            row += 1;
            sheet
                .write_string_with_format(
                    row,
                    0,
                    format!("Cell Data (First {} cells)", CELL_PREVIEW_LIMIT),
                    &Format::new().set_bold().set_font_size(12),
                )
                .map_err(&err)?;
            row += 1;

            let header = table_header();
            for (col, name) in ["Cell", "Type", "Value", "Formula", "Format"]
                .iter()
                .enumerate()
            {
                sheet
                    .write_string_with_format(row, col as u16, *name, &header)
                    .map_err(&err)?;
            }

            for cell in ws.cells.iter().take(CELL_PREVIEW_LIMIT) {
                row += 1;
                let value: String = cell.value.to_string().chars().take(100).collect();
                sheet.write_string(row, 0, &cell.coordinate).map_err(&err)?;
                sheet
                    .write_string(row, 1, cell.data_type.as_str())
                    .map_err(&err)?;
                sheet.write_string(row, 2, &value).map_err(&err)?;
                // Formula text is written as text so the report never recalculates.
                sheet
                    .write_string(row, 3, cell.formula.as_deref().unwrap_or(""))
                    .map_err(&err)?;
                sheet.write_string(row, 4, &cell.number_format).map_err(&err)?;
            }
        }

        for (col, width) in [15, 15, 30, 30, 20].into_iter().enumerate() {
            sheet.set_column_width(col as u16, width).map_err(&err)?;
        }
        Ok(())
    }
}

fn table_header() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
}

/// A legal, unique worksheet name derived from a source sheet name.
///
/// Excel limits names to 31 characters and compares them case-insensitively.
pub fn analysis_sheet_name(name: &str, taken: &mut HashSet<String>) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim();
    let base: String = if sanitized.is_empty() {
        "Sheet".to_string()
    } else {
        sanitized.chars().take(MAX_SHEET_NAME).collect()
    };

    let mut candidate = base.clone();
    let mut n = 2;
    while taken.contains(&candidate.to_lowercase()) {
        let suffix = format!("_{}", n);
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    taken.insert(candidate.to_lowercase());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, CellValue, DataType, Properties, SourceFormat};
    use calamine::{open_workbook, Reader, Xlsx};
    use tempfile::TempDir;

    fn sample() -> Workbook {
        let cell = Cell {
            coordinate: "A1".to_string(),
            row: 1,
            column: 1,
            column_letter: "A".to_string(),
            value: CellValue::Number(42.0),
            data_type: DataType::Number,
            number_format: "General".to_string(),
            formula: None,
            calculated_value: None,
            is_merged: false,
            formatting: None,
            hyperlink: None,
            comment: None,
        };
        let mut ws = Worksheet::new("Data: 2024", 0);
        ws.cells.push(cell);
        Workbook {
            file_path: "book.xlsx".to_string(),
            file_format: SourceFormat::Modern,
            properties: Properties::default(),
            worksheets: vec![ws, Worksheet::new("Summary", 1)],
            defined_names: vec![],
            active_sheet_index: 0,
            calculation_mode: Default::default(),
        }
    }

    #[test]
    fn test_sheet_names_are_legal_and_unique() {
        let mut taken = HashSet::from(["summary".to_string()]);
        assert_eq!(analysis_sheet_name("Q1/Q2 [draft]", &mut taken), "Q1_Q2 _draft_");
        assert_eq!(analysis_sheet_name("Summary", &mut taken), "Summary_2");
        assert_eq!(analysis_sheet_name("summary", &mut taken), "summary_3");

        let long = "x".repeat(40);
        let first = analysis_sheet_name(&long, &mut taken);
        let second = analysis_sheet_name(&long, &mut taken);
        assert_eq!(first.len(), 31);
        assert_eq!(second.len(), 31);
        assert!(second.ends_with("_2"));
    }

    #[test]
    fn test_export_writes_summary_and_analysis_sheets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book_analysis.xlsx");
        ExcelExporter::new(&sample()).export(&path).unwrap();

        let mut report: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            report.sheet_names(),
            vec!["Summary".to_string(), "Data_ 2024".to_string(), "Summary_2".to_string()]
        );
        let summary = report.worksheet_range("Summary").unwrap();
        assert_eq!(
            summary.get_value((0, 0)).map(|d| d.to_string()),
            Some("Excel Workbook Analysis Summary".to_string())
        );
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let result = ExcelExporter::new(&sample()).export(Path::new("/nonexistent/dir/out.xlsx"));
        assert!(matches!(result, Err(LensError::Export(_))));
    }
}

use std::path::{Path, PathBuf};

use crate::error::LensResult;
use crate::model::{Cell, Workbook, Worksheet};

/// One CSV per worksheet, named `<stem>_<sheet>.csv`, in sheet order.
pub fn write_csv(workbook: &Workbook, output_dir: &Path, stem: &str) -> LensResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(workbook.worksheets.len());
    for ws in &workbook.worksheets {
        let path = output_dir.join(format!("{}_{}.csv", stem, safe_sheet_name(&ws.name)));
        write_sheet(ws, &path)?;
        written.push(path);
    }
    Ok(written)
}

/// Records of the dense grid from `A1` to the furthest kept cell, one row at
/// a time; gaps are empty strings.
///
/// Cells are expected in row-major order, as the cell extractor emits them.
pub fn sheet_rows(ws: &Worksheet) -> impl Iterator<Item = Vec<String>> + '_ {
    let (rows, cols) = ws.extent();
    let mut cells = ws.cells.iter().peekable();
    (1..=rows).map(move |row| {
        let mut record = vec![String::new(); cols as usize];
        while let Some(cell) = cells.next_if(|c| c.row <= row) {
            if cell.row != row {
                continue;
            }
            if let Some(slot) = record.get_mut(cell.column as usize - 1) {
                *slot = effective_value(cell);
            }
        }
        record
    })
}

/// Cached result for formula cells, the literal otherwise.
fn effective_value(cell: &Cell) -> String {
    match (&cell.formula, &cell.calculated_value) {
        (Some(_), Some(result)) => result.to_string(),
        _ => cell.value.to_string(),
    }
}

fn write_sheet(ws: &Worksheet, path: &Path) -> LensResult<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for record in sheet_rows(ws) {
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Keeps letters, digits, spaces, `_` and `-`.
pub fn safe_sheet_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, DataType, SourceFormat};
    use tempfile::TempDir;

    fn cell(row: u32, column: u32, value: CellValue) -> Cell {
        Cell {
            coordinate: crate::coords::coordinate(row, column),
            row,
            column,
            column_letter: crate::coords::column_letter(column),
            data_type: value.data_type(),
            value,
            number_format: "General".to_string(),
            formula: None,
            calculated_value: None,
            is_merged: false,
            formatting: None,
            hyperlink: None,
            comment: None,
        }
    }

    #[test]
    fn test_rows_fill_gaps_and_use_cached_results() {
        let mut ws = Worksheet::new("Data", 0);
        ws.cells.push(cell(1, 1, CellValue::Text("a".into())));
        let mut formula = cell(2, 3, CellValue::Number(7.0));
        formula.formula = Some("=3+4".to_string());
        formula.data_type = DataType::Formula;
        formula.calculated_value = Some(CellValue::Number(7.0));
        ws.cells.push(formula);

        let mut rows = sheet_rows(&ws);
        assert_eq!(
            rows.next(),
            Some(vec!["a".to_string(), String::new(), String::new()])
        );
        assert_eq!(
            rows.next(),
            Some(vec![String::new(), String::new(), "7".to_string()])
        );
        assert_eq!(rows.next(), None);
    }

    #[test]
    fn test_blank_rows_between_cells_are_kept() {
        let mut ws = Worksheet::new("Gaps", 0);
        ws.cells.push(cell(1, 2, CellValue::Number(1.0)));
        ws.cells.push(cell(4, 1, CellValue::Text("end".into())));

        let rows: Vec<Vec<String>> = sheet_rows(&ws).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], vec![String::new(), String::new()]);
        assert_eq!(rows[2], vec![String::new(), String::new()]);
        assert_eq!(rows[3], vec!["end".to_string(), String::new()]);
    }

    #[test]
    fn test_one_file_per_sheet() {
        let dir = TempDir::new().unwrap();
        let mut first = Worksheet::new("Q1/Sales", 0);
        first.cells.push(cell(1, 1, CellValue::Boolean(true)));
        let workbook = Workbook {
            file_path: "book.xlsx".to_string(),
            file_format: SourceFormat::Modern,
            properties: Default::default(),
            worksheets: vec![first, Worksheet::new("Empty", 1)],
            defined_names: vec![],
            active_sheet_index: 0,
            calculation_mode: Default::default(),
        };

        let files = write_csv(&workbook, dir.path(), "book").unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name().unwrap(), "book_Q1_Sales.csv");
        assert_eq!(std::fs::read_to_string(&files[0]).unwrap(), "TRUE\n");
        assert_eq!(std::fs::read_to_string(&files[1]).unwrap(), "");
    }
}

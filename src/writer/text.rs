//! Plain-text report.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::{display_colors, truncate, PREVIEW_CELLS};
use crate::error::LensResult;
use crate::model::{Workbook, Worksheet};

const RULE_WIDTH: usize = 80;
const FORMATTED_CELL_LIMIT: usize = 50;

pub fn render_text(workbook: &Workbook) -> String {
    let mut out = String::new();
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{heavy}\nEXCEL WORKBOOK ANALYSIS\n{heavy}\n");
    let _ = writeln!(out, "File: {}", workbook.file_path);
    let _ = writeln!(out, "Format: {}", workbook.file_format.as_str().to_uppercase());
    let _ = writeln!(out, "Analyzer Version: {}\n", env!("CARGO_PKG_VERSION"));

    let _ = writeln!(out, "{light}\nWORKBOOK PROPERTIES\n{light}");
    let props = &workbook.properties;
    if let Some(title) = &props.title {
        let _ = writeln!(out, "Title: {}", title);
    }
    if let Some(creator) = &props.creator {
        let _ = writeln!(out, "Creator: {}", creator);
    }
    if let Some(created) = &props.created {
        let _ = writeln!(out, "Created: {}", created);
    }
    if let Some(modified) = &props.modified {
        let _ = writeln!(out, "Modified: {}", modified);
    }
    let _ = writeln!(out, "Total Worksheets: {}\n", workbook.worksheets.len());

    if !workbook.defined_names.is_empty() {
        let _ = writeln!(out, "{light}\nDEFINED NAMES\n{light}");
        for name in &workbook.defined_names {
            let _ = writeln!(out, "  {} = {}", name.name, name.value);
        }
        out.push('\n');
    }

    for ws in &workbook.worksheets {
        render_worksheet(&mut out, ws);
    }

    out
}

fn render_worksheet(out: &mut String, ws: &Worksheet) {
    let heavy = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "{heavy}\nWORKSHEET: {}\n{heavy}\n", ws.name);
    let _ = writeln!(out, "Sheet Index: {}", ws.index);
    let _ = writeln!(out, "Total Cells: {}", ws.cells.len());
    let _ = writeln!(out, "Sheet State: {}", ws.sheet_state.as_str());
    if let Some(value) = ws.tab_color.as_ref().and_then(|c| c.value()) {
        let _ = writeln!(out, "Tab Color: {}", value);
    }
    out.push('\n');

    if !ws.merged_cells.is_empty() {
        let _ = writeln!(out, "Merged Cells ({}):", ws.merged_cells.len());
        for range in &ws.merged_cells {
            let _ = writeln!(out, "  - {}", range);
        }
        out.push('\n');
    }
    if let Some(panes) = &ws.freeze_panes {
        let _ = writeln!(out, "Freeze Panes: {}\n", panes);
    }
    if let Some(filter) = &ws.auto_filter {
        let _ = writeln!(out, "Auto Filter: {}\n", filter);
    }

    if !ws.cells.is_empty() {
        let _ = writeln!(out, "Cell Data (showing first {} cells):\n", PREVIEW_CELLS);
        let rows: Vec<Vec<String>> = ws
            .cells
            .iter()
            .take(PREVIEW_CELLS)
            .map(|cell| {
                vec![
                    cell.coordinate.clone(),
                    cell.data_type.as_str().to_string(),
                    truncate(&cell.value.to_string(), 50),
                    cell.formula
                        .as_deref()
                        .map(|f| f.chars().take(50).collect())
                        .unwrap_or_default(),
                    cell.number_format.clone(),
                ]
            })
            .collect();
        out.push_str(&grid(&["Cell", "Type", "Value", "Formula", "Format"], &rows));
        out.push('\n');
        if ws.cells.len() > PREVIEW_CELLS {
            let _ = writeln!(out, "... and {} more cells\n", ws.cells.len() - PREVIEW_CELLS);
        }
    }

    let formatted: Vec<(String, String)> = ws
        .cells
        .iter()
        .filter_map(|cell| {
            let formatting = cell.formatting.as_ref()?;
            let (background, font) = display_colors(cell);
            let mut details = Vec::new();
            if let Some(color) = font {
                details.push(format!("Font Color: {}", color));
            }
            if let Some(color) = background {
                details.push(format!("Background: {}", color));
            }
            if formatting.font.bold {
                details.push("Bold".to_string());
            }
            if formatting.font.italic {
                details.push("Italic".to_string());
            }
            (!details.is_empty()).then(|| (cell.coordinate.clone(), details.join(", ")))
        })
        .collect();
    if !formatted.is_empty() {
        let _ = writeln!(
            out,
            "Cell Formatting ({} cells with custom formatting):",
            formatted.len()
        );
        for (coord, details) in formatted.iter().take(FORMATTED_CELL_LIMIT) {
            let _ = writeln!(out, "  {}: {}", coord, details);
        }
        if formatted.len() > FORMATTED_CELL_LIMIT {
            let _ = writeln!(
                out,
                "  ... and {} more cells",
                formatted.len() - FORMATTED_CELL_LIMIT
            );
        }
        out.push('\n');
    }

    if !ws.data_validations.is_empty() {
        let _ = writeln!(out, "Data Validations ({}):", ws.data_validations.len());
        for dv in &ws.data_validations {
            let _ = writeln!(out, "  Range: {}", dv.sqref);
            let _ = writeln!(out, "    Type: {}", dv.validation_type);
            if let Some(formula) = &dv.formula1 {
                let _ = writeln!(out, "    Formula: {}", formula);
            }
        }
        out.push('\n');
    }

    if !ws.conditional_formatting.is_empty() {
        let _ = writeln!(
            out,
            "Conditional Formatting ({}):",
            ws.conditional_formatting.len()
        );
        for cf in &ws.conditional_formatting {
            let _ = writeln!(out, "  Range: {}", cf.sqref);
            let _ = writeln!(out, "    Type: {}", cf.rule_type);
            let _ = writeln!(out, "    Priority: {}", cf.priority);
        }
        out.push('\n');
    }

    if !ws.charts.is_empty() {
        let _ = writeln!(out, "Charts ({}):", ws.charts.len());
        for (i, chart) in ws.charts.iter().enumerate() {
            let _ = writeln!(out, "  Chart {}:", i + 1);
            let _ = writeln!(out, "    Type: {}", chart.chart_type);
            if let Some(title) = &chart.title {
                let _ = writeln!(out, "    Title: {}", title);
            }
            let _ = writeln!(out, "    Series Count: {}", chart.series.len());
            for (j, series) in chart.series.iter().enumerate() {
                let _ = writeln!(out, "      Series {}:", j + 1);
                for (label, value) in [
                    ("Title", &series.title),
                    ("Values", &series.values),
                    ("Categories", &series.categories),
                ] {
                    if let Some(value) = value {
                        let _ = writeln!(out, "        {}: {}", label, value);
                    }
                }
            }
        }
        out.push('\n');
    }

    if !ws.images.is_empty() {
        let _ = writeln!(out, "Images ({}):", ws.images.len());
        for (i, img) in ws.images.iter().enumerate() {
            let _ = writeln!(out, "  Image {}:", i + 1);
            let _ = writeln!(out, "    Format: {}", img.format.as_str());
            let _ = writeln!(out, "    Size: {}x{}", img.width, img.height);
            let _ = writeln!(out, "    Anchor: {}", img.anchor);
            let _ = writeln!(out, "    Data Length: {} bytes", img.data.len());
        }
        out.push('\n');
    }

    if let Some(ps) = &ws.print_settings {
        let _ = writeln!(out, "Print Settings:");
        let _ = writeln!(out, "  Orientation: {}", ps.orientation);
        let _ = writeln!(out, "  Scale: {}%", ps.scale);
        if let Some(area) = &ps.print_area {
            let _ = writeln!(out, "  Print Area: {}", area);
        }
        out.push('\n');
    }

    out.push('\n');
}

/// Boxed table with a `=` rule under the header row.
fn grid(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = grid_rule(&widths, '-');
    out.push_str(&grid_line(&widths, headers.iter().copied()));
    out.push_str(&grid_rule(&widths, '='));
    for row in rows {
        out.push_str(&grid_line(&widths, row.iter().map(String::as_str)));
        out.push_str(&grid_rule(&widths, '-'));
    }
    out
}

fn grid_rule(widths: &[usize], fill: char) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.extend(std::iter::repeat(fill).take(w + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn grid_line<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (cell, w) in cells.zip(widths) {
        let _ = write!(line, " {:<width$} |", cell, width = *w);
    }
    line.push('\n');
    line
}

pub fn write_text(workbook: &Workbook, path: &Path) -> LensResult<()> {
    fs::write(path, render_text(workbook))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Cell, CellFormatting, CellValue, Color, DataType, DefinedName, SourceFormat,
    };

    fn cell(coord: &str, row: u32, column: u32, value: CellValue) -> Cell {
        Cell {
            coordinate: coord.to_string(),
            row,
            column,
            column_letter: coord.trim_end_matches(char::is_numeric).to_string(),
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

    fn workbook() -> Workbook {
        let mut ws = Worksheet::new("Data", 0);
        ws.cells.push(cell("A1", 1, 1, CellValue::Text("Revenue".into())));
        let mut total = cell("B1", 1, 2, CellValue::Number(30.0));
        total.formula = Some("=SUM(B2:B3)".to_string());
        total.data_type = DataType::Formula;
        total.calculated_value = Some(CellValue::Number(30.0));
        let mut formatting = CellFormatting::default();
        formatting.font.bold = true;
        formatting.font.color = Some(Color::rgb("#FF0000"));
        total.formatting = Some(formatting);
        ws.cells.push(total);
        ws.merged_cells.push("A1:A2".to_string());

        Workbook {
            file_path: "book.xlsx".to_string(),
            file_format: SourceFormat::Modern,
            properties: Default::default(),
            worksheets: vec![ws],
            defined_names: vec![DefinedName {
                name: "Total".to_string(),
                value: "'Data'!$B$1".to_string(),
                local_sheet_id: None,
                hidden: false,
            }],
            active_sheet_index: 0,
            calculation_mode: Default::default(),
        }
    }

    #[test]
    fn test_report_sections() {
        let text = render_text(&workbook());

        assert!(text.contains("EXCEL WORKBOOK ANALYSIS"));
        assert!(text.contains("Format: MODERN"));
        assert!(text.contains("  Total = 'Data'!$B$1"));
        assert!(text.contains("WORKSHEET: Data"));
        assert!(text.contains("  - A1:A2"));
        assert!(text.contains("| B1   | formula | 30"));
        assert!(text.contains("B1: Font Color: #FF0000, Bold"));
    }

    #[test]
    fn test_grid_layout() {
        let table = grid(&["Cell", "Value"], &[vec!["A1".to_string(), "x".to_string()]]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "+------+-------+");
        assert_eq!(lines[1], "| Cell | Value |");
        assert_eq!(lines[2], "+======+=======+");
        assert_eq!(lines[3], "| A1   | x     |");
    }
}

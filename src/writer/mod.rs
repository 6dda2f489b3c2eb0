//! Report writers over a finished [`Workbook`].
//!
//! Every writer is a read-only traversal: sheet and cell order is kept as
//! given, and every optional block may be absent.

pub mod csv;
pub mod html;
pub mod json;
pub mod text;
pub mod yaml;

use std::path::{Path, PathBuf};

use crate::error::LensResult;
use crate::excel::ExcelExporter;
use crate::model::{Cell, Workbook};

pub use self::csv::write_csv;
pub use html::write_html;
pub use json::{write_json, AnalysisDocument, ReportMetadata};
pub use text::write_text;
pub use yaml::write_yaml;

/// Cells listed per sheet in the text and HTML reports.
pub const PREVIEW_CELLS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Html,
    Text,
    Csv,
    Excel,
}

impl OutputFormat {
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Json => "JSON",
            OutputFormat::Yaml => "YAML",
            OutputFormat::Html => "HTML",
            OutputFormat::Text => "text",
            OutputFormat::Csv => "CSV",
            OutputFormat::Excel => "Excel",
        }
    }
}

/// Write one report format into `output_dir`, returning every file written.
pub fn write_report(
    workbook: &Workbook,
    format: OutputFormat,
    output_dir: &Path,
    stem: &str,
) -> LensResult<Vec<PathBuf>> {
    let single = |extension: &str| output_dir.join(format!("{}_analysis.{}", stem, extension));
    let path = match format {
        OutputFormat::Csv => return write_csv(workbook, output_dir, stem),
        OutputFormat::Json => {
            let path = single("json");
            write_json(workbook, &path)?;
            path
        }
        OutputFormat::Yaml => {
            let path = single("yaml");
            write_yaml(workbook, &path)?;
            path
        }
        OutputFormat::Html => {
            let path = single("html");
            write_html(workbook, &path)?;
            path
        }
        OutputFormat::Text => {
            let path = single("txt");
            write_text(workbook, &path)?;
            path
        }
        OutputFormat::Excel => {
            let path = single("xlsx");
            ExcelExporter::new(workbook).export(&path)?;
            path
        }
    };
    Ok(vec![path])
}

/// `(background, font)` colors worth highlighting in a report.
///
/// Black text, and black or white solid fills, are treated as unstyled.
pub fn display_colors(cell: &Cell) -> (Option<&str>, Option<&str>) {
    let Some(formatting) = &cell.formatting else {
        return (None, None);
    };

    let fill = &formatting.fill;
    let background = if fill.pattern_type != "none" {
        fill.fg_color
            .as_ref()
            .and_then(|c| c.value())
            .filter(|v| !matches!(*v, "#000000" | "#FFFFFF"))
    } else {
        None
    };
    let font = formatting
        .font
        .color
        .as_ref()
        .and_then(|c| c.value())
        .filter(|v| *v != "#000000");

    (background, font)
}

/// First `max` characters, with `...` appended when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellFormatting, CellValue, Color, DataType, SourceFormat, Worksheet};
    use tempfile::TempDir;

    fn styled(fill: Option<(&str, &str)>, font: Option<&str>) -> Cell {
        let mut formatting = CellFormatting::default();
        if let Some((pattern, color)) = fill {
            formatting.fill.pattern_type = pattern.to_string();
            formatting.fill.fg_color = Some(Color::rgb(color));
        }
        formatting.font.color = font.map(Color::rgb);
        Cell {
            coordinate: "A1".to_string(),
            row: 1,
            column: 1,
            column_letter: "A".to_string(),
            value: CellValue::Empty,
            data_type: DataType::Empty,
            number_format: "General".to_string(),
            formula: None,
            calculated_value: None,
            is_merged: false,
            formatting: Some(formatting),
            hyperlink: None,
            comment: None,
        }
    }

    #[test]
    fn test_display_colors() {
        let cell = styled(Some(("solid", "#FFFF00")), Some("#FF0000"));
        assert_eq!(display_colors(&cell), (Some("#FFFF00"), Some("#FF0000")));

        let cell = styled(Some(("none", "#FFFF00")), Some("#000000"));
        assert_eq!(display_colors(&cell), (None, None));

        let cell = styled(Some(("solid", "#FFFFFF")), None);
        assert_eq!(display_colors(&cell), (None, None));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn test_write_report_names_files_by_stem() {
        let dir = TempDir::new().unwrap();
        let workbook = Workbook {
            file_path: "q1.xlsx".to_string(),
            file_format: SourceFormat::Modern,
            properties: Default::default(),
            worksheets: vec![Worksheet::new("Data", 0)],
            defined_names: vec![],
            active_sheet_index: 0,
            calculation_mode: Default::default(),
        };

        for (format, name) in [
            (OutputFormat::Json, "q1_analysis.json"),
            (OutputFormat::Yaml, "q1_analysis.yaml"),
            (OutputFormat::Html, "q1_analysis.html"),
            (OutputFormat::Text, "q1_analysis.txt"),
            (OutputFormat::Excel, "q1_analysis.xlsx"),
            (OutputFormat::Csv, "q1_Data.csv"),
        ] {
            let files = write_report(&workbook, format, dir.path(), "q1").unwrap();
            assert_eq!(files, vec![dir.path().join(name)]);
            assert!(files[0].exists());
        }
    }
}

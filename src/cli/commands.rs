use crate::assembler::analyze_file;
use crate::diagnostics::TracingDiagnostics;
use crate::error::{LensError, LensResult};
use crate::writer::{write_report, OutputFormat};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Analyze one workbook and write every requested report into `output_dir`.
///
/// Formats run in the order given; the first failure aborts the run, leaving
/// earlier reports on disk.
pub fn analyze(
    input: PathBuf,
    formats: &[OutputFormat],
    output_dir: PathBuf,
    verbose: bool,
) -> LensResult<Vec<PathBuf>> {
    if formats.is_empty() {
        return Err(LensError::Validation(
            "At least one output format must be specified \
             (use --json, --yaml, --html, --text, --csv or --excel)"
                .to_string(),
        ));
    }

    println!("{}", "🔍 SheetLens - Workbook Analysis".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output_dir.display());

    if verbose {
        println!("{}", "📖 Reading workbook...".cyan());
    }
    let workbook = analyze_file(&input, &TracingDiagnostics)?;

    if verbose {
        let cells: usize = workbook.worksheets.iter().map(|ws| ws.cells.len()).sum();
        println!(
            "   Found {} worksheets, {} cells, {} defined names\n",
            workbook.worksheets.len(),
            cells,
            workbook.defined_names.len()
        );
    }

    fs::create_dir_all(&output_dir)?;

    let stem = report_stem(&input);
    let mut written = Vec::new();
    for format in formats {
        if verbose {
            println!("{}", format!("📝 Writing {} report...", format.label()).cyan());
        }
        for path in write_report(&workbook, *format, &output_dir, &stem)? {
            println!("{} {}", "✓ Generated:".green(), path.display());
            written.push(path);
        }
    }

    println!();
    println!("{}", "✅ Analysis complete".bold().green());
    Ok(written)
}

/// File name without its extension; `workbook` when there is none.
fn report_stem(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("workbook")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook as XlsxWorkbook;
    use tempfile::TempDir;

    fn fixture(dir: &Path) -> PathBuf {
        let path = dir.join("sales.xlsx");
        let mut book = XlsxWorkbook::new();
        let sheet = book.add_worksheet();
        sheet.set_name("Q1").unwrap();
        sheet.write_string(0, 0, "Region").unwrap();
        sheet.write_number(0, 1, 42.0).unwrap();
        book.save(&path).unwrap();
        path
    }

    #[test]
    fn test_no_formats_is_a_validation_error() {
        let dir = TempDir::new().unwrap();
        let err = analyze(dir.path().join("x.xlsx"), &[], dir.path().to_path_buf(), false)
            .unwrap_err();
        assert_eq!(err.kind(), "validation error");
        assert!(err.to_string().contains("At least one output format"));
    }

    #[test]
    fn test_reports_follow_requested_order() {
        let dir = TempDir::new().unwrap();
        let input = fixture(dir.path());
        let out = dir.path().join("reports/nested");

        let written = analyze(
            input,
            &[OutputFormat::Text, OutputFormat::Json, OutputFormat::Csv],
            out.clone(),
            true,
        )
        .unwrap();

        assert_eq!(
            written,
            vec![
                out.join("sales_analysis.txt"),
                out.join("sales_analysis.json"),
                out.join("sales_Q1.csv"),
            ]
        );
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_missing_input_fails_before_writing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let err = analyze(
            dir.path().join("missing.xlsx"),
            &[OutputFormat::Json],
            out.clone(),
            false,
        )
        .unwrap_err();

        assert_eq!(err.kind(), "open error");
        assert!(!out.exists());
    }

    #[test]
    fn test_corrupt_input_leaves_no_output_dir() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.xlsx");
        fs::write(&input, "not a zip archive").unwrap();
        let out = dir.path().join("reports");

        let err = analyze(input, &[OutputFormat::Text], out.clone(), false).unwrap_err();

        assert_eq!(err.kind(), "open error");
        assert!(!out.exists());
    }

    #[test]
    fn test_report_stem() {
        assert_eq!(report_stem(Path::new("/data/q1.report.xlsx")), "q1.report");
        assert_eq!(report_stem(Path::new("book.xls")), "book");
    }
}

//! Document assemblers: one per source format, both producing a [`Workbook`].
//!
//! This is the only place that knows which format a document came from.
//! [`analyze_file`] runs the whole pipeline: detect the format, open the
//! container, assemble, then drop the source tree.

mod legacy;
mod modern;

pub use legacy::LegacyAssembler;
pub use modern::ModernAssembler;

use std::path::Path;

use crate::diagnostics::Diagnostics;
use crate::error::{LensError, LensResult};
use crate::excel::reader;
use crate::extract::{
    CellExtractor, ChartExtractor, ColorResolver, ImageExtractor, RuleExtractor,
    StructureExtractor, StyleExtractor,
};
use crate::extract::structure::pass_through;
use crate::model::{SheetState, SourceFormat, Workbook, Worksheet};
use crate::source::SourceSheet;

/// Builds the canonical model from one format's source tree.
pub trait DocumentAssembler {
    fn format(&self) -> SourceFormat;

    /// Never fails: unreadable attributes are reported through `diagnostics`
    /// and left absent.
    fn assemble(&self, file_path: &str, diagnostics: &dyn Diagnostics) -> Workbook;
}

/// Pick an assembler from the file extension.
pub fn detect_format(path: &Path) -> LensResult<SourceFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" => Ok(SourceFormat::Modern),
        "xls" => Ok(SourceFormat::Legacy),
        "xlsb" => Err(LensError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: "binary workbook (xlsb)".to_string(),
        }),
        "" => Err(LensError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: "no file extension".to_string(),
        }),
        other => Err(LensError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: format!(".{}", other),
        }),
    }
}

/// Open, assemble and close one spreadsheet.
pub fn analyze_file(path: &Path, diagnostics: &dyn Diagnostics) -> LensResult<Workbook> {
    if !path.exists() {
        return Err(LensError::Open {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
        });
    }

    let format = detect_format(path)?;
    diagnostics.info(&format!(
        "Opening {} workbook: {}",
        format.as_str(),
        path.display()
    ));

    let assembler: Box<dyn DocumentAssembler> = match format {
        SourceFormat::Modern => {
            Box::new(ModernAssembler::new(reader::read_modern(path, diagnostics)?))
        }
        SourceFormat::Legacy => {
            Box::new(LegacyAssembler::new(reader::read_legacy(path, diagnostics)?))
        }
    };

    let workbook = assembler.assemble(&path.display().to_string(), diagnostics);
    diagnostics.info(&format!(
        "Analysis complete: {} worksheets, {} cells",
        workbook.worksheets.len(),
        workbook.total_cells()
    ));
    Ok(workbook)
}

/// Run every shared extractor over one sheet.
pub(crate) fn assemble_sheet(
    index: usize,
    sheet: &SourceSheet,
    colors: &ColorResolver,
    diagnostics: &dyn Diagnostics,
) -> Worksheet {
    diagnostics.info(&format!("Analyzing worksheet: {}", sheet.name));

    let styles = StyleExtractor::new(colors);
    let structure = StructureExtractor::new(colors);
    let cells = CellExtractor::new(styles).extract(&sheet.cells, &sheet.merged, diagnostics);
    let rules = RuleExtractor::new(styles);

    Worksheet {
        name: sheet.name.clone(),
        index,
        cells,
        merged_cells: structure.merged_ranges(&sheet.merged),
        column_dimensions: structure.column_dimensions(&sheet.columns),
        row_dimensions: structure.row_dimensions(&sheet.rows),
        data_validations: rules.validations(&sheet.validations),
        conditional_formatting: rules.conditional_formats(
            &sheet.conditional_rules,
            &sheet.name,
            diagnostics,
        ),
        charts: ChartExtractor::new(colors).extract_all(&sheet.charts, &sheet.name, diagnostics),
        images: ImageExtractor::new().extract_all(&sheet.images, &sheet.name, diagnostics),
        print_settings: structure.print_settings(
            sheet.page_setup.as_ref(),
            &sheet.name,
            diagnostics,
        ),
        header_footer: structure.header_footer(sheet.header_footer.as_ref()),
        freeze_panes: pass_through(sheet.freeze_panes.as_ref()),
        auto_filter: pass_through(sheet.auto_filter.as_ref()),
        tab_color: structure.tab_color(sheet.tab_color.as_ref()),
        sheet_state: sheet
            .state
            .as_deref()
            .map(SheetState::from_tag)
            .unwrap_or_default(),
        sheet_view: structure.sheet_view(sheet.view.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_format_by_extension() {
        assert_eq!(
            detect_format(Path::new("report.XLSX")).unwrap(),
            SourceFormat::Modern
        );
        assert_eq!(
            detect_format(Path::new("macro.xlsm")).unwrap(),
            SourceFormat::Modern
        );
        assert_eq!(
            detect_format(Path::new("old.xls")).unwrap(),
            SourceFormat::Legacy
        );
        assert!(matches!(
            detect_format(Path::new("big.xlsb")),
            Err(LensError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("notes.txt")),
            Err(LensError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let diagnostics = crate::diagnostics::CollectedDiagnostics::new();
        let path = PathBuf::from("/definitely/not/here.xlsx");
        match analyze_file(&path, &diagnostics) {
            Err(LensError::Open { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected open error, got {:?}", other.map(|w| w.file_path)),
        }
    }
}

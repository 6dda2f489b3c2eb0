use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::LensResult;
use crate::model::Workbook;

/// Header written ahead of the model in JSON and YAML reports.
#[derive(Debug, Serialize)]
pub struct ReportMetadata<'a> {
    pub analyzer_version: &'static str,
    /// Local time, RFC 3339.
    pub analyzed_at: String,
    pub source_file: &'a str,
}

/// `{ metadata, workbook }`, the document both structured writers emit.
#[derive(Debug, Serialize)]
pub struct AnalysisDocument<'a> {
    pub metadata: ReportMetadata<'a>,
    pub workbook: &'a Workbook,
}

impl<'a> AnalysisDocument<'a> {
    pub fn new(workbook: &'a Workbook) -> Self {
        Self {
            metadata: ReportMetadata {
                analyzer_version: env!("CARGO_PKG_VERSION"),
                analyzed_at: Local::now().to_rfc3339(),
                source_file: &workbook.file_path,
            },
            workbook,
        }
    }
}

pub fn to_json_string(workbook: &Workbook) -> LensResult<String> {
    Ok(serde_json::to_string_pretty(&AnalysisDocument::new(workbook))?)
}

pub fn write_json(workbook: &Workbook, path: &Path) -> LensResult<()> {
    fs::write(path, to_json_string(workbook)?)?;
    Ok(())
}

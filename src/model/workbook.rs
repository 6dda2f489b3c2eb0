use chrono::NaiveDateTime;
use serde::Serialize;

use super::worksheet::Worksheet;

/// Which source format a workbook was assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// XML-zip packaged spreadsheet (`.xlsx`, `.xlsm`).
    Modern,
    /// Legacy binary spreadsheet (`.xls`).
    Legacy,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Modern => "modern",
            SourceFormat::Legacy => "legacy",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CalculationMode {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "autoNoTable")]
    AutoNoTable,
}

impl CalculationMode {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "manual" => CalculationMode::Manual,
            "autoNoTable" => CalculationMode::AutoNoTable,
            _ => CalculationMode::Auto,
        }
    }
}

/// Document metadata. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Properties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
}

impl Properties {
    pub fn is_empty(&self) -> bool {
        *self == Properties::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefinedName {
    pub name: String,
    /// First destination only, e.g. `'Sheet1'!$A$1:$B$4`.
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_sheet_id: Option<u32>,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub file_path: String,
    pub file_format: SourceFormat,
    pub properties: Properties,
    /// Source sheet order; `worksheets[i].index == i`.
    pub worksheets: Vec<Worksheet>,
    pub defined_names: Vec<DefinedName>,
    pub active_sheet_index: usize,
    pub calculation_mode: CalculationMode,
}

impl Workbook {
    pub fn worksheet(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name == name)
    }

    pub fn total_cells(&self) -> usize {
        self.worksheets.iter().map(|ws| ws.cells.len()).sum()
    }
}

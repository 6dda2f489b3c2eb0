use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use super::formatting::CellFormatting;

/// A cell's effective value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDateTime),
    /// Error literal such as `#DIV/0!`.
    Error(String),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Type tag for a literal (non-formula) value.
    pub fn data_type(&self) -> DataType {
        match self {
            CellValue::Text(_) => DataType::String,
            CellValue::Number(_) => DataType::Number,
            CellValue::Boolean(_) => DataType::Boolean,
            CellValue::Date(_) => DataType::Date,
            CellValue::Error(_) => DataType::Error,
            CellValue::Empty => DataType::Empty,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) | CellValue::Error(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S")),
            CellValue::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Formula,
    Error,
    Date,
    Empty,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Formula => "formula",
            DataType::Error => "error",
            DataType::Date => "date",
            DataType::Empty => "empty",
        }
    }
}

/// One kept cell of a worksheet.
///
/// When `formula` is present, `value` and `calculated_value` both hold the
/// cached result from the source; nothing is recomputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub coordinate: String,
    pub row: u32,
    pub column: u32,
    pub column_letter: String,
    pub value: CellValue,
    pub data_type: DataType,
    pub number_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_value: Option<CellValue>,
    pub is_merged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatting: Option<CellFormatting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_literal_data_types() {
        assert_eq!(CellValue::Text("a".into()).data_type(), DataType::String);
        assert_eq!(CellValue::Number(1.0).data_type(), DataType::Number);
        assert_eq!(CellValue::Boolean(true).data_type(), DataType::Boolean);
        assert_eq!(CellValue::Error("#N/A".into()).data_type(), DataType::Error);
        assert_eq!(CellValue::Empty.data_type(), DataType::Empty);
    }

    #[test]
    fn test_value_serialization() {
        assert_eq!(serde_json::to_value(CellValue::Number(5.0)).unwrap(), serde_json::json!(5.0));
        assert_eq!(serde_json::to_value(CellValue::Empty).unwrap(), serde_json::Value::Null);
        assert_eq!(serde_json::to_value(DataType::Formula).unwrap(), "formula");

        let date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::Date(date).to_string(), "2024-03-01T00:00:00");
    }
}

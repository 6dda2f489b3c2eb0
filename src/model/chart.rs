use serde::Serialize;

use super::formatting::Color;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    /// Lowercase family tag (`bar`, `line3d`, `pie`, ...).
    pub chart_type: String,
    pub title: Option<String>,
    pub series: Vec<ChartSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<ChartPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Value range reference, e.g. `'Sheet1'!$B$2:$B$5`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_unit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_unit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_position: Option<String>,
    /// Axis deleted / hidden.
    pub delete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub position: String,
    pub overlay: bool,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            position: "right".to_string(),
            overlay: false,
        }
    }
}

/// Where a drawing object sits on the sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPosition {
    /// Top-left anchor cell, e.g. `E5`.
    pub anchor: String,
    pub x_offset: i64,
    pub y_offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
}

impl Default for ChartPosition {
    fn default() -> Self {
        Self {
            anchor: "A1".to_string(),
            x_offset: 0,
            y_offset: 0,
            width: None,
            height: None,
        }
    }
}

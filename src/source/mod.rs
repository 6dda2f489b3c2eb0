//! Typed views over a parsed source document.
//!
//! The external parser fills these records once. Optional attributes are
//! `Option` fields, so absence is decided here instead of at each use site.
//! Attributes the parser *tried* to produce but could not are [`Probe`]
//! values carrying a [`SourceFault`], which lets extractors tell a missing
//! attribute apart from a broken one.

pub mod legacy;
pub mod modern;

use thiserror::Error;

pub use legacy::{LegacyCell, LegacyColumn, LegacyFont, LegacyRow, LegacySheet, LegacyWorkbook, LegacyXf};
pub use modern::{
    AnchorExtent, AnchorMarker, ModernWorkbook, Paragraph, RichText, RuleListing, SourceAnchor,
    SourceAxis, SourceChart, SourceColumn, SourceDefinedName, SourceDxf, SourceFormula,
    SourceHeaderFooter, SourceImage, SourceLegend, SourceMargins, SourcePageSetup,
    SourceProperties, SourceRow, SourceRule, SourceSeries, SourceSheet, SourceSheetView,
    SourceTitle, SourceValidation, TextRun,
};

use crate::model::CellValue;

/// An attribute the external parser attempted to read.
pub type Probe<T> = Result<T, SourceFault>;

/// Why the external parser could not produce an attribute.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SourceFault {
    pub message: String,
}

impl SourceFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A color reference as the source spells it.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceColor {
    /// Hex digits, `AARRGGBB` or `RRGGBB`; not yet validated.
    Rgb { value: String, tint: Option<f64> },
    Theme { index: u32, tint: Option<f64> },
    Indexed(u32),
    Auto,
    /// The parser saw a color element it could not classify.
    Unrecognized,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFont {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<String>,
    pub strike: Option<bool>,
    pub color: Option<SourceColor>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFill {
    pub pattern_type: Option<String>,
    pub fg_color: Option<SourceColor>,
    pub bg_color: Option<SourceColor>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBorderSide {
    pub style: Option<String>,
    pub color: Option<SourceColor>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBorder {
    pub left: Option<SourceBorderSide>,
    pub right: Option<SourceBorderSide>,
    pub top: Option<SourceBorderSide>,
    pub bottom: Option<SourceBorderSide>,
    pub diagonal: Option<SourceBorderSide>,
    pub diagonal_up: Option<bool>,
    pub diagonal_down: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceAlignment {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
    pub text_rotation: Option<i32>,
    pub wrap_text: Option<bool>,
    pub shrink_to_fit: Option<bool>,
    pub indent: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceProtection {
    pub locked: Option<bool>,
    pub hidden: Option<bool>,
}

/// A cell style record. Each block is absent when the source omits it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceStyle {
    pub font: Option<SourceFont>,
    pub fill: Option<SourceFill>,
    pub border: Option<SourceBorder>,
    pub alignment: Option<SourceAlignment>,
    pub protection: Option<SourceProtection>,
}

/// One populated cell, 1-based coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceCell {
    pub row: u32,
    pub column: u32,
    /// Literal value, or the cached result when `formula` is set.
    pub value: CellValue,
    /// Formula text including the leading `=`.
    pub formula: Option<String>,
    pub number_format: Option<String>,
    pub style: Probe<Option<SourceStyle>>,
    pub hyperlink: Probe<Option<String>>,
    pub comment: Probe<Option<String>>,
}

impl SourceCell {
    /// A plain cell with no style, link or comment.
    pub fn new(row: u32, column: u32, value: CellValue) -> Self {
        Self {
            row,
            column,
            value,
            formula: None,
            number_format: None,
            style: Ok(None),
            hyperlink: Ok(None),
            comment: Ok(None),
        }
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    pub fn with_style(mut self, style: SourceStyle) -> Self {
        self.style = Ok(Some(style));
        self
    }
}

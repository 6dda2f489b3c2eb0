//! Extractors shared by both assemblers.
//!
//! Nothing in here knows which source format produced its input; format
//! differences are resolved by the assembler before records reach these
//! functions (palette choice, unit conversion).

pub mod cell;
pub mod chart;
pub mod color;
pub mod image;
pub mod rules;
pub mod structure;
pub mod style;

pub use cell::CellExtractor;
pub use chart::ChartExtractor;
pub use color::{ColorResolver, Palette};
pub use image::{detect_format, ImageExtractor};
pub use rules::RuleExtractor;
pub use structure::{PrintTitles, StructureExtractor};
pub use style::StyleExtractor;

use crate::diagnostics::Diagnostics;
use crate::error::ExtractionWarning;
use crate::source::Probe;

/// Outcome of extracting one optional attribute or item.
///
/// `Absent` means the source legitimately had nothing; `Recovered` means it
/// had something we could not read.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    Extracted(T),
    Absent,
    Recovered(ExtractionWarning),
}

impl<T> Extraction<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Extraction::Extracted(v),
            None => Extraction::Absent,
        }
    }

    /// Lift a probed optional attribute, labelling a fault with `context`.
    pub fn from_probe(probe: &Probe<Option<T>>, context: &str) -> Self
    where
        T: Clone,
    {
        match probe {
            Ok(value) => Extraction::from_option(value.clone()),
            Err(fault) => Extraction::Recovered(ExtractionWarning::new(context, &fault.message)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extraction<U> {
        match self {
            Extraction::Extracted(v) => Extraction::Extracted(f(v)),
            Extraction::Absent => Extraction::Absent,
            Extraction::Recovered(w) => Extraction::Recovered(w),
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Extraction::Recovered(_))
    }

    pub fn warning(&self) -> Option<&ExtractionWarning> {
        match self {
            Extraction::Recovered(w) => Some(w),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Extraction::Extracted(v) => Some(v),
            _ => None,
        }
    }

    /// Report a recovery and collapse to the model's optional field.
    pub fn settle(self, diagnostics: &dyn Diagnostics) -> Option<T> {
        if let Extraction::Recovered(warning) = &self {
            diagnostics.recovered(warning);
        }
        self.into_option()
    }
}

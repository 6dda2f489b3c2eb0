use std::path::PathBuf;
use thiserror::Error;

pub type LensResult<T> = Result<T, LensError>;

#[derive(Error, Debug)]
pub enum LensError {
    /// The container could not be read or is not a spreadsheet at all.
    #[error("Cannot open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    /// Recognized container variant that no assembler handles (e.g. `.xlsb`).
    #[error("Unsupported format for {}: {format}", path.display())]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl LensError {
    /// Short failure kind used in CLI messages.
    pub fn kind(&self) -> &'static str {
        match self {
            LensError::Open { .. } => "open error",
            LensError::UnsupportedFormat { .. } => "unsupported format",
            LensError::Io(_) => "io error",
            LensError::Json(_) | LensError::Yaml(_) | LensError::Csv(_) => "serialization error",
            LensError::Export(_) => "export error",
            LensError::Validation(_) => "validation error",
        }
    }

    /// `<kind> <path>: <reason>` as printed by the CLI.
    pub fn user_message(&self) -> String {
        match self {
            LensError::Open { path, reason } => {
                format!("{} {}: {}", self.kind(), path.display(), reason)
            }
            LensError::UnsupportedFormat { path, format } => {
                format!("{} {}: {}", self.kind(), path.display(), format)
            }
            LensError::Io(e) => format!("{}: {}", self.kind(), e),
            LensError::Json(e) => format!("{}: {}", self.kind(), e),
            LensError::Yaml(e) => format!("{}: {}", self.kind(), e),
            LensError::Csv(e) => format!("{}: {}", self.kind(), e),
            LensError::Export(reason) | LensError::Validation(reason) => {
                format!("{}: {}", self.kind(), reason)
            }
        }
    }
}

/// A locally recovered extraction failure.
///
/// Never returned as a hard error: the assembler logs it through
/// [`crate::diagnostics::Diagnostics`] and degrades the affected field or item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{context}: {message}")]
pub struct ExtractionWarning {
    pub context: String,
    pub message: String,
}

impl ExtractionWarning {
    pub fn new(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            message: message.into(),
        }
    }
}

//! Cell formatting sub-model.
//!
//! Every record carries Excel's documented defaults through `Default`, so a
//! formatting value is always complete once built.

use serde::Serialize;

/// A canonical color reference. Exactly one tag is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Color {
    /// `#RRGGBB`, uppercase.
    Rgb {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tint: Option<f64>,
    },
    /// Theme slot index as a string.
    Theme {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tint: Option<f64>,
    },
    /// Palette index already resolved to `#RRGGBB`.
    Indexed { value: String },
    Auto,
}

impl Color {
    pub fn rgb(value: impl Into<String>) -> Self {
        Color::Rgb {
            value: value.into(),
            tint: None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Color::Rgb { value, .. } | Color::Theme { value, .. } | Color::Indexed { value } => {
                Some(value)
            }
            Color::Auto => None,
        }
    }

    pub fn tint(&self) -> Option<f64> {
        match self {
            Color::Rgb { tint, .. } | Color::Theme { tint, .. } => *tint,
            _ => None,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Color::Rgb { .. } => "rgb",
            Color::Theme { .. } => "theme",
            Color::Indexed { .. } => "indexed",
            Color::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub name: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: String,
    pub strike: bool,
    pub color: Option<Color>,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size: 11.0,
            bold: false,
            italic: false,
            underline: "none".to_string(),
            strike: false,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fill {
    pub pattern_type: String,
    pub fg_color: Option<Color>,
    pub bg_color: Option<Color>,
}

impl Default for Fill {
    fn default() -> Self {
        Self {
            pattern_type: "none".to_string(),
            fg_color: None,
            bg_color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorderSide {
    pub style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl BorderSide {
    pub fn is_none(&self) -> bool {
        self.style == "none"
    }
}

impl Default for BorderSide {
    fn default() -> Self {
        Self {
            style: "none".to_string(),
            color: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Border {
    pub left: BorderSide,
    pub right: BorderSide,
    pub top: BorderSide,
    pub bottom: BorderSide,
    pub diagonal: BorderSide,
    pub diagonal_up: bool,
    pub diagonal_down: bool,
}

impl Border {
    /// Any of the four outer sides drawn.
    pub fn has_visible_side(&self) -> bool {
        [&self.left, &self.right, &self.top, &self.bottom]
            .iter()
            .any(|side| !side.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alignment {
    pub horizontal: String,
    pub vertical: String,
    pub text_rotation: i32,
    pub wrap_text: bool,
    pub shrink_to_fit: bool,
    pub indent: u32,
}

impl Default for Alignment {
    fn default() -> Self {
        Self {
            horizontal: "general".to_string(),
            vertical: "bottom".to_string(),
            text_rotation: 0,
            wrap_text: false,
            shrink_to_fit: false,
            indent: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Protection {
    pub locked: bool,
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        Self {
            locked: true,
            hidden: false,
        }
    }
}

/// Complete cell formatting: all five sub-records are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellFormatting {
    pub font: Font,
    pub fill: Fill,
    pub border: Border,
    pub alignment: Alignment,
    pub protection: Protection,
}

impl CellFormatting {
    /// Bold, italic, an explicit font color, a fill pattern or a drawn border.
    pub fn is_visible(&self) -> bool {
        self.font.bold
            || self.font.italic
            || self.font.color.as_ref().is_some_and(|c| !c.is_auto())
            || self.fill.pattern_type != "none"
            || self.border.has_visible_side()
    }
}

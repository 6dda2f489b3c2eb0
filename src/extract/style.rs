//! Style Extractor: complete [`CellFormatting`] from a source style record,
//! plus the partial deltas of differential formats.

use super::color::ColorResolver;
use crate::model::{
    Alignment, Border, BorderDelta, BorderSide, CellFormatting, DifferentialFormat, Fill,
    FillDelta, Font, FontDelta, Protection,
};
use crate::source::{
    SourceAlignment, SourceBorder, SourceBorderSide, SourceDxf, SourceFill, SourceFont,
    SourceProtection, SourceStyle,
};

/// Treat empty strings the way the source treats unset attributes.
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, Copy)]
pub struct StyleExtractor<'a> {
    colors: &'a ColorResolver,
}

impl<'a> StyleExtractor<'a> {
    pub fn new(colors: &'a ColorResolver) -> Self {
        Self { colors }
    }

    /// Always returns all five sub-records, defaults filled in.
    pub fn extract(&self, style: Option<&SourceStyle>) -> CellFormatting {
        let Some(style) = style else {
            return CellFormatting::default();
        };
        CellFormatting {
            font: self.font(style.font.as_ref()),
            fill: self.fill(style.fill.as_ref()),
            border: self.border(style.border.as_ref()),
            alignment: alignment(style.alignment.as_ref()),
            protection: protection(style.protection.as_ref()),
        }
    }

    pub fn font(&self, font: Option<&SourceFont>) -> Font {
        let Some(font) = font else {
            return Font::default();
        };
        let defaults = Font::default();
        Font {
            name: non_empty(font.name.as_ref())
                .map(str::to_string)
                .unwrap_or(defaults.name),
            size: font
                .size
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or(defaults.size),
            bold: font.bold.unwrap_or(false),
            italic: font.italic.unwrap_or(false),
            underline: non_empty(font.underline.as_ref())
                .map(str::to_string)
                .unwrap_or(defaults.underline),
            strike: font.strike.unwrap_or(false),
            color: self.colors.resolve(font.color.as_ref()),
        }
    }

    pub fn fill(&self, fill: Option<&SourceFill>) -> Fill {
        let Some(fill) = fill else {
            return Fill::default();
        };
        Fill {
            pattern_type: non_empty(fill.pattern_type.as_ref())
                .unwrap_or("none")
                .to_string(),
            fg_color: self.colors.resolve(fill.fg_color.as_ref()),
            bg_color: self.colors.resolve(fill.bg_color.as_ref()),
        }
    }

    /// A missing side, or one with no style, is `none` without a color.
    pub fn border_side(&self, side: Option<&SourceBorderSide>) -> BorderSide {
        match side.and_then(|s| non_empty(s.style.as_ref()).map(|style| (style, s))) {
            Some((style, side)) => BorderSide {
                style: style.to_string(),
                color: self.colors.resolve(side.color.as_ref()),
            },
            None => BorderSide::default(),
        }
    }

    pub fn border(&self, border: Option<&SourceBorder>) -> Border {
        let Some(border) = border else {
            return Border::default();
        };
        Border {
            left: self.border_side(border.left.as_ref()),
            right: self.border_side(border.right.as_ref()),
            top: self.border_side(border.top.as_ref()),
            bottom: self.border_side(border.bottom.as_ref()),
            diagonal: self.border_side(border.diagonal.as_ref()),
            diagonal_up: border.diagonal_up.unwrap_or(false),
            diagonal_down: border.diagonal_down.unwrap_or(false),
        }
    }

    /// Only the overrides a differential format sets; `None` when it sets nothing.
    pub fn differential(&self, dxf: &SourceDxf) -> Option<DifferentialFormat> {
        let font = dxf.font.as_ref().and_then(|font| {
            let delta = FontDelta {
                bold: font.bold.filter(|b| *b),
                italic: font.italic.filter(|i| *i),
                color: self.colors.resolve(font.color.as_ref()),
            };
            (delta != FontDelta::default()).then_some(delta)
        });

        let fill = dxf.fill.as_ref().and_then(|fill| {
            let delta = FillDelta {
                pattern_type: non_empty(fill.pattern_type.as_ref()).map(str::to_string),
                fg_color: self.colors.resolve(fill.fg_color.as_ref()),
            };
            (delta != FillDelta::default()).then_some(delta)
        });

        let border = dxf.border.as_ref().and_then(|border| {
            let side = |s: &Option<SourceBorderSide>| {
                s.as_ref()
                    .and_then(|s| non_empty(s.style.as_ref()))
                    .map(str::to_string)
            };
            let delta = BorderDelta {
                left: side(&border.left),
                right: side(&border.right),
                top: side(&border.top),
                bottom: side(&border.bottom),
            };
            (delta != BorderDelta::default()).then_some(delta)
        });

        if font.is_none() && fill.is_none() && border.is_none() {
            return None;
        }
        Some(DifferentialFormat { font, fill, border })
    }
}

fn alignment(alignment: Option<&SourceAlignment>) -> Alignment {
    let Some(alignment) = alignment else {
        return Alignment::default();
    };
    let defaults = Alignment::default();
    Alignment {
        horizontal: non_empty(alignment.horizontal.as_ref())
            .map(str::to_string)
            .unwrap_or(defaults.horizontal),
        vertical: non_empty(alignment.vertical.as_ref())
            .map(str::to_string)
            .unwrap_or(defaults.vertical),
        text_rotation: alignment.text_rotation.unwrap_or(0),
        wrap_text: alignment.wrap_text.unwrap_or(false),
        shrink_to_fit: alignment.shrink_to_fit.unwrap_or(false),
        indent: alignment.indent.unwrap_or(0),
    }
}

fn protection(protection: Option<&SourceProtection>) -> Protection {
    let Some(protection) = protection else {
        return Protection::default();
    };
    Protection {
        locked: protection.locked.unwrap_or(true),
        hidden: protection.hidden.unwrap_or(false),
    }
}

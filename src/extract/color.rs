//! Color Resolver: source color references to canonical [`Color`]s.

use crate::model::Color;
use crate::source::SourceColor;

/// Legacy "automatic" / "system" palette sentinels.
const SENTINELS: [u32; 2] = [64, 65];

/// Default 64-entry indexed palette (RGB).
const STANDARD_PALETTE: [u32; 64] = [
    0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF, // 0-7
    0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF, // 8-15
    0x800000, 0x008000, 0x000080, 0x808000, 0x800080, 0x008080, 0xC0C0C0, 0x808080, // 16-23
    0x9999FF, 0x993366, 0xFFFFCC, 0xCCFFFF, 0x660066, 0xFF8080, 0x0066CC, 0xCCCCFF, // 24-31
    0x000080, 0xFF00FF, 0xFFFF00, 0x00FFFF, 0x800080, 0x800000, 0x008080, 0x0000FF, // 32-39
    0x00CCFF, 0xCCFFFF, 0xCCFFCC, 0xFFFF99, 0x99CCFF, 0xFF99CC, 0xCC99FF, 0xFFCC99, // 40-47
    0x3366FF, 0x33CCCC, 0x99CC00, 0xFFCC00, 0xFF9900, 0xFF6600, 0x666699, 0x969696, // 48-55
    0x003366, 0x339966, 0x003300, 0x333300, 0x993300, 0x993366, 0x333399, 0x333333, // 56-63
];

const FALLBACK_HEX: &str = "#000000";

/// Index-to-hex table used for `indexed` references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// The full 64-color default palette.
    Standard,
    /// The eight fixed colors the legacy reader maps; other indices fall back to black.
    Legacy,
}

impl Palette {
    pub fn lookup(&self, index: u32) -> String {
        let limit = match self {
            Palette::Standard => STANDARD_PALETTE.len(),
            Palette::Legacy => 8,
        };
        match STANDARD_PALETTE.get(index as usize) {
            Some(rgb) if (index as usize) < limit => format!("#{:06X}", rgb),
            _ => FALLBACK_HEX.to_string(),
        }
    }
}

/// Pure, stateless color normalization.
#[derive(Debug, Clone, Copy)]
pub struct ColorResolver {
    palette: Palette,
}

impl ColorResolver {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Resolve one reference. `None` in gives `None` out; palette sentinels
    /// also resolve to `None`. Anything unreadable becomes [`Color::Auto`].
    pub fn resolve(&self, color: Option<&SourceColor>) -> Option<Color> {
        let color = color?;
        match color {
            SourceColor::Rgb { value, tint } => match checked_tint(*tint) {
                Some(tint) => Some(Color::Rgb {
                    value: normalize_rgb(value),
                    tint,
                }),
                None => Some(Color::Auto),
            },
            SourceColor::Theme { index, tint } => match checked_tint(*tint) {
                Some(tint) => Some(Color::Theme {
                    value: index.to_string(),
                    tint,
                }),
                None => Some(Color::Auto),
            },
            SourceColor::Indexed(index) if SENTINELS.contains(index) => None,
            SourceColor::Indexed(index) => Some(Color::Indexed {
                value: self.palette.lookup(*index),
            }),
            SourceColor::Auto | SourceColor::Unrecognized => Some(Color::Auto),
        }
    }
}

impl Default for ColorResolver {
    fn default() -> Self {
        Self::new(Palette::Standard)
    }
}

/// `Some(tint)` when usable, `None` when the tint itself is malformed.
fn checked_tint(tint: Option<f64>) -> Option<Option<f64>> {
    match tint {
        None => Some(None),
        Some(t) if t.is_finite() && (-1.0..=1.0).contains(&t) => Some(Some(t)),
        Some(_) => None,
    }
}

/// `AARRGGBB` or `RRGGBB` to `#RRGGBB`; anything else to `#000000`.
pub fn normalize_rgb(raw: &str) -> String {
    let raw = raw.trim();
    let digits = if raw.len() == 8 {
        raw.get(2..).unwrap_or_default()
    } else {
        raw
    };
    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        format!("#{}", digits.to_ascii_uppercase())
    } else {
        FALLBACK_HEX.to_string()
    }
}

//! `xl/styles.xml`: cell formats, their fonts, fills, borders and number
//! formats, plus the differential formats conditional rules point at.

use std::collections::HashMap;

use roxmltree::{Document, Node};

use super::{child, child_val, children, color, flag, number};
use crate::source::{
    Probe, SourceAlignment, SourceBorder, SourceBorderSide, SourceDxf, SourceFault, SourceFill,
    SourceFont, SourceProtection, SourceStyle,
};

/// Number formats every reader knows without a `numFmt` record.
const BUILTIN_FORMATS: [(u32, &str); 28] = [
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

pub fn builtin_number_format(id: u32) -> Option<&'static str> {
    BUILTIN_FORMATS
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, code)| *code)
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CellXf {
    num_fmt_id: u32,
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    alignment: Option<SourceAlignment>,
    protection: Option<SourceProtection>,
}

#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    number_formats: HashMap<u32, String>,
    fonts: Vec<SourceFont>,
    fills: Vec<SourceFill>,
    borders: Vec<SourceBorder>,
    cell_xfs: Vec<CellXf>,
    dxfs: Vec<SourceDxf>,
}

impl Stylesheet {
    pub fn parse(xml: &str) -> Result<Self, roxmltree::Error> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();

        Ok(Self {
            number_formats: list(root, "numFmts", "numFmt")
                .into_iter()
                .filter_map(|n| {
                    Some((
                        number(n.attribute("numFmtId"))?,
                        n.attribute("formatCode")?.to_string(),
                    ))
                })
                .collect(),
            fonts: list(root, "fonts", "font").into_iter().map(font).collect(),
            fills: list(root, "fills", "fill").into_iter().map(fill).collect(),
            borders: list(root, "borders", "border").into_iter().map(border).collect(),
            cell_xfs: list(root, "cellXfs", "xf").into_iter().map(cell_xf).collect(),
            dxfs: list(root, "dxfs", "dxf").into_iter().map(dxf).collect(),
        })
    }

    /// The full style of cell format `xf`. An index past the table is a fault;
    /// an empty stylesheet gives no style at all.
    pub fn cell_style(&self, xf: usize) -> Probe<Option<SourceStyle>> {
        if self.cell_xfs.is_empty() {
            return Ok(None);
        }
        let record = self
            .cell_xfs
            .get(xf)
            .ok_or_else(|| SourceFault::new(format!("cell format {} missing", xf)))?;

        Ok(Some(SourceStyle {
            font: self.fonts.get(record.font_id).cloned(),
            fill: self.fills.get(record.fill_id).cloned(),
            border: self.borders.get(record.border_id).cloned(),
            alignment: record.alignment.clone(),
            protection: record.protection.clone(),
        }))
    }

    /// Format code of cell format `xf`, custom codes first.
    pub fn number_format(&self, xf: usize) -> Option<String> {
        let id = self.cell_xfs.get(xf)?.num_fmt_id;
        self.number_formats
            .get(&id)
            .cloned()
            .or_else(|| builtin_number_format(id).map(str::to_string))
    }

    pub fn dxf(&self, id: u32) -> Probe<Option<SourceDxf>> {
        self.dxfs
            .get(id as usize)
            .cloned()
            .map(Some)
            .ok_or_else(|| SourceFault::new(format!("differential format {} missing", id)))
    }
}

/// Children named `inner` of the `outer` collection element.
fn list<'a, 'input>(root: Node<'a, 'input>, outer: &str, inner: &'static str) -> Vec<Node<'a, 'input>> {
    child(root, outer)
        .map(|n| children(n, inner).collect())
        .unwrap_or_default()
}

/// `<b/>` means on; `<b val="0"/>` means off; no element means unset.
fn toggle(node: Node, local: &str) -> Option<bool> {
    let element = child(node, local)?;
    Some(flag(element.attribute("val")).unwrap_or(true))
}

fn font(node: Node) -> SourceFont {
    SourceFont {
        name: child_val(node, "name").map(str::to_string),
        size: number(child_val(node, "sz")),
        bold: toggle(node, "b"),
        italic: toggle(node, "i"),
        underline: child(node, "u")
            .map(|u| u.attribute("val").unwrap_or("single").to_string()),
        strike: toggle(node, "strike"),
        color: child(node, "color").map(color),
    }
}

fn fill(node: Node) -> SourceFill {
    match child(node, "patternFill") {
        Some(pattern) => SourceFill {
            pattern_type: pattern.attribute("patternType").map(str::to_string),
            fg_color: child(pattern, "fgColor").map(color),
            bg_color: child(pattern, "bgColor").map(color),
        },
        None => SourceFill::default(),
    }
}

fn border_side(node: Node, local: &str) -> Option<SourceBorderSide> {
    let side = child(node, local)?;
    Some(SourceBorderSide {
        style: side.attribute("style").map(str::to_string),
        color: child(side, "color").map(color),
    })
}

fn border(node: Node) -> SourceBorder {
    SourceBorder {
        left: border_side(node, "left").or_else(|| border_side(node, "start")),
        right: border_side(node, "right").or_else(|| border_side(node, "end")),
        top: border_side(node, "top"),
        bottom: border_side(node, "bottom"),
        diagonal: border_side(node, "diagonal"),
        diagonal_up: flag(node.attribute("diagonalUp")),
        diagonal_down: flag(node.attribute("diagonalDown")),
    }
}

fn cell_xf(node: Node) -> CellXf {
    CellXf {
        num_fmt_id: number(node.attribute("numFmtId")).unwrap_or(0),
        font_id: number(node.attribute("fontId")).unwrap_or(0),
        fill_id: number(node.attribute("fillId")).unwrap_or(0),
        border_id: number(node.attribute("borderId")).unwrap_or(0),
        alignment: child(node, "alignment").map(|a| SourceAlignment {
            horizontal: a.attribute("horizontal").map(str::to_string),
            vertical: a.attribute("vertical").map(str::to_string),
            text_rotation: number(a.attribute("textRotation")),
            wrap_text: flag(a.attribute("wrapText")),
            shrink_to_fit: flag(a.attribute("shrinkToFit")),
            indent: number(a.attribute("indent")),
        }),
        protection: child(node, "protection").map(|p| SourceProtection {
            locked: flag(p.attribute("locked")),
            hidden: flag(p.attribute("hidden")),
        }),
    }
}

fn dxf(node: Node) -> SourceDxf {
    SourceDxf {
        font: child(node, "font").map(font),
        fill: child(node, "fill").map(fill),
        border: child(node, "border").map(border),
    }
}

//! One worksheet part: per-cell style indices, sheet layout, rules,
//! hyperlinks, comments and the drawing that carries charts and images.

use std::collections::BTreeMap;
use std::io::{Read, Seek};

use roxmltree::{Document, Node};

use super::drawing;
use super::styles::Stylesheet;
use super::{
    child, children, color, flag, inline_text, number, Package, PackageError, Relationships,
    REL_NS,
};
use crate::coords::{CellRange, CellRef};
use crate::diagnostics::Diagnostics;
use crate::model::CellValue;
use crate::source::{
    Probe, RuleListing, SourceCell, SourceColumn, SourceFormula, SourceHeaderFooter, SourceMargins,
    SourcePageSetup, SourceRow, SourceRule, SourceSheet, SourceSheetView, SourceStyle,
    SourceValidation,
};

/// What the package knows about one cell beyond its value.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDecor {
    /// Index into the cell-format table; 0 is the workbook default.
    pub xf: usize,
    pub number_format: Option<String>,
    pub style: Probe<Option<SourceStyle>>,
    pub hyperlink: Option<String>,
    pub comment: Option<String>,
}

impl CellDecor {
    fn styled(xf: usize, styles: &Stylesheet) -> Self {
        Self {
            xf,
            number_format: styles.number_format(xf),
            style: styles.cell_style(xf),
            hyperlink: None,
            comment: None,
        }
    }

    /// A cell without a value is still worth keeping when it carries its own
    /// format, a link or a comment.
    fn stands_alone(&self) -> bool {
        self.xf != 0 || self.hyperlink.is_some() || self.comment.is_some()
    }

    fn dress(self, cell: &mut SourceCell) {
        cell.number_format = self.number_format;
        cell.style = self.style;
        cell.hyperlink = Ok(self.hyperlink);
        cell.comment = Ok(self.comment);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetPart {
    /// Layout, rules and drawings. Cells, merges and visibility are left to
    /// the value reader.
    pub layout: SourceSheet,
    /// Keyed by 1-based `(row, column)`.
    pub cells: BTreeMap<(u32, u32), CellDecor>,
}

impl SheetPart {
    pub fn name(&self) -> &str {
        &self.layout.name
    }

    /// Merge into the value reader's sheet.
    pub fn apply_to(self, sheet: &mut SourceSheet) {
        let SheetPart { layout, mut cells } = self;

        for cell in &mut sheet.cells {
            if let Some(decor) = cells.remove(&(cell.row, cell.column)) {
                decor.dress(cell);
            }
        }
        for ((row, column), decor) in cells {
            if decor.stands_alone() {
                let mut cell = SourceCell::new(row, column, CellValue::Empty);
                decor.dress(&mut cell);
                sheet.cells.push(cell);
            }
        }
        sheet.cells.sort_by_key(|c| (c.row, c.column));

        sheet.columns = layout.columns;
        sheet.rows = layout.rows;
        sheet.page_setup = layout.page_setup;
        sheet.header_footer = layout.header_footer;
        sheet.freeze_panes = layout.freeze_panes;
        sheet.auto_filter = layout.auto_filter;
        sheet.tab_color = layout.tab_color;
        sheet.view = layout.view;
        sheet.validations = layout.validations;
        sheet.conditional_rules = layout.conditional_rules;
        sheet.charts = layout.charts;
        sheet.images = layout.images;
    }
}

pub(super) fn read_sheet<R: Read + Seek>(
    package: &mut Package<R>,
    name: &str,
    part: &str,
    styles: &Stylesheet,
    diagnostics: &dyn Diagnostics,
) -> Result<SheetPart, PackageError> {
    let xml = package
        .text(part)?
        .ok_or_else(|| PackageError::part(part, "part missing"))?;
    let rels = package.relationships(part)?;
    let doc = Document::parse(&xml).map_err(|e| PackageError::part(part, e))?;
    let root = doc.root_element();

    let mut sheet = parse_sheet(name, root, styles, &rels);

    for rel in rels.of_type("/comments") {
        let parsed = package.text(&rel.target).and_then(|xml| match xml {
            Some(xml) => parse_comments(&xml).map_err(|e| PackageError::part(&rel.target, e)),
            None => Ok(Vec::new()),
        });
        match parsed {
            Ok(comments) => {
                for (cell, text) in comments {
                    sheet
                        .cells
                        .entry((cell.row, cell.column))
                        .or_insert_with(|| CellDecor::styled(0, styles))
                        .comment = Some(text);
                }
            }
            Err(e) => diagnostics.warn(&format!("comments on '{}' unreadable: {}", name, e)),
        }
    }

    let drawing_part = child(root, "drawing")
        .and_then(|d| d.attribute((REL_NS, "id")))
        .and_then(|id| rels.get(id))
        .map(|rel| rel.target.clone());
    if let Some(drawing_part) = drawing_part {
        match drawing::read_drawing(package, &drawing_part) {
            Ok((charts, images)) => {
                sheet.layout.charts = charts;
                sheet.layout.images = images;
            }
            Err(e) => diagnostics.warn(&format!("drawing on '{}' unreadable: {}", name, e)),
        }
    }

    Ok(sheet)
}

/// Everything that lives inside the worksheet part itself.
pub(super) fn parse_sheet(
    name: &str,
    root: Node,
    styles: &Stylesheet,
    rels: &Relationships,
) -> SheetPart {
    let mut layout = SourceSheet::new(name);
    let mut cells = BTreeMap::new();

    layout.tab_color = child(root, "sheetPr")
        .and_then(|pr| child(pr, "tabColor"))
        .map(color);

    if let Some(view) = child(root, "sheetViews").and_then(|v| child(v, "sheetView")) {
        layout.view = Some(SourceSheetView {
            zoom_scale: number(view.attribute("zoomScale")),
            zoom_scale_normal: number(view.attribute("zoomScaleNormal")),
            show_gridlines: flag(view.attribute("showGridLines")),
            show_row_col_headers: flag(view.attribute("showRowColHeaders")),
        });
        layout.freeze_panes = child(view, "pane").and_then(frozen_at);
    }

    if let Some(cols) = child(root, "cols") {
        layout.columns = children(cols, "col").filter_map(column).collect();
    }

    if let Some(data) = child(root, "sheetData") {
        let mut last_row = 0;
        for row in children(data, "row") {
            let index = number(row.attribute("r")).unwrap_or(last_row + 1);
            last_row = index;

            let height = number(row.attribute("ht"));
            let hidden = flag(row.attribute("hidden"));
            let custom_height = flag(row.attribute("customHeight"));
            if height.is_some() || hidden == Some(true) || custom_height == Some(true) {
                layout.rows.push(SourceRow {
                    row: index,
                    height,
                    hidden,
                    custom_height,
                });
            }

            let mut next_column = 1;
            for c in children(row, "c") {
                let position = c
                    .attribute("r")
                    .and_then(CellRef::parse)
                    .unwrap_or_else(|| CellRef::new(index, next_column));
                next_column = position.column + 1;
                let xf = number(c.attribute("s")).unwrap_or(0);
                cells.insert((position.row, position.column), CellDecor::styled(xf, styles));
            }
        }
    }

    layout.auto_filter = child(root, "autoFilter")
        .and_then(|f| f.attribute("ref"))
        .map(str::to_string);

    if let Some(validations) = child(root, "dataValidations") {
        layout.validations = children(validations, "dataValidation")
            .map(validation)
            .collect();
    }

    layout.conditional_rules = RuleListing::ByRange(
        children(root, "conditionalFormatting")
            .map(|cf| {
                let sqref = cf.attribute("sqref").unwrap_or_default().to_string();
                let rules = children(cf, "cfRule").map(|r| rule(r, styles)).collect();
                (sqref, rules)
            })
            .collect(),
    );

    if let Some(links) = child(root, "hyperlinks") {
        for link in children(links, "hyperlink") {
            let Some(range) = link.attribute("ref").and_then(CellRange::parse) else {
                continue;
            };
            let target = link
                .attribute((REL_NS, "id"))
                .and_then(|id| rels.get(id))
                .map(|rel| rel.target.clone())
                .or_else(|| link.attribute("location").map(str::to_string));
            cells
                .entry((range.start.row, range.start.column))
                .or_insert_with(|| CellDecor::styled(0, styles))
                .hyperlink = target;
        }
    }

    layout.page_setup = page_setup(root);
    layout.header_footer = child(root, "headerFooter").map(header_footer);

    SheetPart { layout, cells }
}

/// Top-left cell of the scrolling pane when the pane is frozen.
fn frozen_at(pane: Node) -> Option<String> {
    let state = pane.attribute("state")?;
    if state != "frozen" && state != "frozenSplit" {
        return None;
    }
    if let Some(cell) = pane.attribute("topLeftCell") {
        return Some(cell.to_string());
    }
    let columns: u32 = number(pane.attribute("xSplit")).unwrap_or(0);
    let rows: u32 = number(pane.attribute("ySplit")).unwrap_or(0);
    Some(CellRef::new(rows + 1, columns + 1).to_string())
}

/// One entry per `<col>` span, keyed by its first column.
fn column(col: Node) -> Option<SourceColumn> {
    let min: u32 = number(col.attribute("min"))?;
    Some(SourceColumn {
        column: crate::coords::column_letter(min),
        width: number(col.attribute("width")),
        hidden: flag(col.attribute("hidden")),
        custom_width: flag(col.attribute("customWidth")),
    })
}

fn text_of(node: Node, local: &str) -> Option<String> {
    child(node, local)
        .and_then(|n| n.text())
        .map(str::to_string)
}

fn validation(dv: Node) -> SourceValidation {
    let attr = |name: &str| dv.attribute(name).map(str::to_string);
    SourceValidation {
        sqref: attr("sqref"),
        validation_type: attr("type"),
        operator: attr("operator"),
        formula1: text_of(dv, "formula1"),
        formula2: text_of(dv, "formula2"),
        allow_blank: flag(dv.attribute("allowBlank")),
        show_input_message: flag(dv.attribute("showInputMessage")),
        prompt_title: attr("promptTitle"),
        prompt: attr("prompt"),
        show_error_message: flag(dv.attribute("showErrorMessage")),
        error_title: attr("errorTitle"),
        error: attr("error"),
        error_style: attr("errorStyle"),
    }
}

fn rule(cf_rule: Node, styles: &Stylesheet) -> SourceRule {
    let formulas: Vec<String> = children(cf_rule, "formula")
        .filter_map(|f| f.text())
        .map(str::to_string)
        .collect();
    let dxf_id = number(cf_rule.attribute("dxfId"));

    SourceRule {
        rule_type: cf_rule.attribute("type").map(str::to_string),
        priority: number(cf_rule.attribute("priority")),
        formula: (!formulas.is_empty()).then_some(SourceFormula::List(formulas)),
        operator: cf_rule.attribute("operator").map(str::to_string),
        stop_if_true: flag(cf_rule.attribute("stopIfTrue")),
        dxf_id,
        dxf: match dxf_id {
            Some(id) => styles.dxf(id),
            None => Ok(None),
        },
    }
}

/// `None` unless the sheet has a page setup, margins or print options.
fn page_setup(root: Node) -> Option<SourcePageSetup> {
    let setup = child(root, "pageSetup");
    let margins = child(root, "pageMargins");
    let options = child(root, "printOptions");
    if setup.is_none() && margins.is_none() && options.is_none() {
        return None;
    }

    let setup_attr = |name: &str| setup.and_then(|s| s.attribute(name));
    Some(SourcePageSetup {
        orientation: setup_attr("orientation").map(str::to_string),
        paper_size: number(setup_attr("paperSize")),
        scale: number(setup_attr("scale")),
        fit_to_width: number(setup_attr("fitToWidth")),
        fit_to_height: number(setup_attr("fitToHeight")),
        margins: margins.map(|m| SourceMargins {
            left: number(m.attribute("left")),
            right: number(m.attribute("right")),
            top: number(m.attribute("top")),
            bottom: number(m.attribute("bottom")),
            header: number(m.attribute("header")),
            footer: number(m.attribute("footer")),
        }),
        print_gridlines: options.and_then(|o| flag(o.attribute("gridLines"))),
        print_headings: options.and_then(|o| flag(o.attribute("headings"))),
        print_area: None,
        print_titles: None,
    })
}

fn header_footer(hf: Node) -> SourceHeaderFooter {
    SourceHeaderFooter {
        odd_header: text_of(hf, "oddHeader"),
        odd_footer: text_of(hf, "oddFooter"),
        even_header: text_of(hf, "evenHeader"),
        even_footer: text_of(hf, "evenFooter"),
        first_header: text_of(hf, "firstHeader"),
        first_footer: text_of(hf, "firstFooter"),
        different_odd_even: flag(hf.attribute("differentOddEven")),
        different_first: flag(hf.attribute("differentFirst")),
        scale_with_doc: flag(hf.attribute("scaleWithDoc")),
        align_with_margins: flag(hf.attribute("alignWithMargins")),
    }
}

/// `(cell, text)` for every comment in a comments part.
fn parse_comments(xml: &str) -> Result<Vec<(CellRef, String)>, roxmltree::Error> {
    let doc = Document::parse(xml)?;
    let comments: Vec<(CellRef, String)> = child(doc.root_element(), "commentList")
        .map(|list| {
            children(list, "comment")
                .filter_map(|c| {
                    let cell = CellRef::parse(c.attribute("ref")?)?;
                    Some((cell, child(c, "text").map(inline_text).unwrap_or_default()))
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(comments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceColor;
    use pretty_assertions::assert_eq;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
    xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheetPr><tabColor rgb="FF00B050"/></sheetPr>
  <dimension ref="A1:C3"/>
  <sheetViews>
    <sheetView showGridLines="0" zoomScale="125" workbookViewId="0">
      <pane xSplit="1" ySplit="2" topLeftCell="B3" activePane="bottomRight" state="frozen"/>
    </sheetView>
  </sheetViews>
  <cols>
    <col min="1" max="1" width="20.7109375" customWidth="1"/>
    <col min="3" max="5" width="9" hidden="1"/>
  </cols>
  <sheetData>
    <row r="1" ht="30" customHeight="1"><c r="A1" s="1" t="s"><v>0</v></c><c r="B1"><v>5</v></c></row>
    <row r="2"><c r="A2" s="2"/></row>
    <row r="3" hidden="1"><c r="C3" t="b"><v>1</v></c></row>
  </sheetData>
  <autoFilter ref="A1:C3"/>
  <conditionalFormatting sqref="B1:B10">
    <cfRule type="cellIs" dxfId="0" priority="2" operator="greaterThan"><formula>100</formula></cfRule>
    <cfRule type="expression" priority="1" stopIfTrue="1"><formula>$A1="x"</formula></cfRule>
  </conditionalFormatting>
  <dataValidations count="1">
    <dataValidation type="whole" allowBlank="1" showErrorMessage="1" errorTitle="Range" error="1 to 10" sqref="B1:B10">
      <formula1>1</formula1><formula2>10</formula2>
    </dataValidation>
  </dataValidations>
  <hyperlinks>
    <hyperlink ref="A1" r:id="rId1"/>
    <hyperlink ref="D4:E4" location="Summary!A1"/>
  </hyperlinks>
  <printOptions gridLines="1"/>
  <pageMargins left="0.5" right="0.5" top="1" bottom="1" header="0.3" footer="0.3"/>
  <pageSetup paperSize="9" orientation="landscape" fitToWidth="1" fitToHeight="0"/>
  <headerFooter differentFirst="1"><oddHeader>&amp;CQuarterly</oddHeader><firstFooter>Page &amp;P</firstFooter></headerFooter>
</worksheet>"#;

    const STYLES: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="0.0%"/></numFmts>
  <fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>
  <fills count="1"><fill><patternFill patternType="none"/></fill></fills>
  <borders count="1"><border/></borders>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    <xf numFmtId="0" fontId="1" fillId="0" borderId="0" applyFont="1"/>
    <xf numFmtId="164" fontId="0" fillId="0" borderId="0" applyNumberFormat="1"/>
  </cellXfs>
  <dxfs count="1"><dxf><font><color rgb="FF9C0006"/></font></dxf></dxfs>
</styleSheet>"#;

    const RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/docs" TargetMode="External"/>
</Relationships>"#;

    fn parsed() -> SheetPart {
        let styles = Stylesheet::parse(STYLES).unwrap();
        let rels = Relationships::parse("xl/worksheets/sheet1.xml", RELS).unwrap();
        let doc = Document::parse(SHEET).unwrap();
        parse_sheet("Data", doc.root_element(), &styles, &rels)
    }

    #[test]
    fn test_view_panes_and_tab_color() {
        let part = parsed();

        assert_eq!(part.name(), "Data");
        assert_eq!(part.layout.freeze_panes.as_deref(), Some("B3"));
        let view = part.layout.view.unwrap();
        assert_eq!(view.zoom_scale, Some(125));
        assert_eq!(view.show_gridlines, Some(false));
        assert_eq!(
            part.layout.tab_color,
            Some(SourceColor::Rgb {
                value: "FF00B050".to_string(),
                tint: None
            })
        );
        assert_eq!(part.layout.auto_filter.as_deref(), Some("A1:C3"));
    }

    #[test]
    fn test_column_spans_and_row_dimensions() {
        let part = parsed();

        let columns: Vec<&str> = part.layout.columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(columns, vec!["A", "C"]);
        assert_eq!(part.layout.columns[0].width, Some(20.7109375));
        assert_eq!(part.layout.columns[1].hidden, Some(true));

        assert_eq!(part.layout.rows.len(), 2);
        assert_eq!(part.layout.rows[0].height, Some(30.0));
        assert_eq!(part.layout.rows[1].row, 3);
        assert_eq!(part.layout.rows[1].hidden, Some(true));
    }

    #[test]
    fn test_cell_styles_and_number_formats() {
        let part = parsed();

        let a1 = &part.cells[&(1, 1)];
        assert_eq!(a1.xf, 1);
        let font = a1.style.clone().unwrap().unwrap().font.unwrap();
        assert_eq!(font.bold, Some(true));

        assert_eq!(part.cells[&(1, 2)].number_format.as_deref(), Some("General"));
        assert_eq!(part.cells[&(2, 1)].number_format.as_deref(), Some("0.0%"));
        assert_eq!(part.cells[&(3, 3)].xf, 0);
    }

    #[test]
    fn test_hyperlinks_external_and_internal() {
        let part = parsed();

        assert_eq!(
            part.cells[&(1, 1)].hyperlink.as_deref(),
            Some("https://example.com/docs")
        );
        let internal = &part.cells[&(4, 4)];
        assert_eq!(internal.hyperlink.as_deref(), Some("Summary!A1"));
        assert!(internal.stands_alone());
    }

    #[test]
    fn test_rules_and_validations() {
        let part = parsed();

        let rules: Vec<(&str, &SourceRule)> = part.layout.conditional_rules.iter().collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].0, "B1:B10");
        assert_eq!(rules[0].1.dxf_id, Some(0));
        assert!(matches!(rules[0].1.dxf, Ok(Some(_))));
        assert_eq!(
            rules[1].1.formula,
            Some(SourceFormula::List(vec!["$A1=\"x\"".to_string()]))
        );
        assert_eq!(rules[1].1.stop_if_true, Some(true));

        let dv = &part.layout.validations[0];
        assert_eq!(dv.validation_type.as_deref(), Some("whole"));
        assert_eq!(dv.formula1.as_deref(), Some("1"));
        assert_eq!(dv.formula2.as_deref(), Some("10"));
        assert_eq!(dv.error.as_deref(), Some("1 to 10"));
        assert_eq!(dv.show_input_message, None);
    }

    #[test]
    fn test_page_setup_and_header_footer() {
        let part = parsed();

        let setup = part.layout.page_setup.unwrap();
        assert_eq!(setup.orientation.as_deref(), Some("landscape"));
        assert_eq!(setup.paper_size, Some(9));
        assert_eq!(setup.fit_to_height, Some(0));
        assert_eq!(setup.print_gridlines, Some(true));
        assert_eq!(setup.margins.unwrap().header, Some(0.3));

        let hf = part.layout.header_footer.unwrap();
        assert_eq!(hf.odd_header.as_deref(), Some("&CQuarterly"));
        assert_eq!(hf.first_footer.as_deref(), Some("Page &P"));
        assert_eq!(hf.different_first, Some(true));
    }

    #[test]
    fn test_split_without_top_left_cell() {
        let doc = Document::parse(r#"<pane xSplit="2" ySplit="1" state="frozen"/>"#).unwrap();
        assert_eq!(frozen_at(doc.root_element()).as_deref(), Some("C2"));

        let doc = Document::parse(r#"<pane xSplit="2000" state="split"/>"#).unwrap();
        assert_eq!(frozen_at(doc.root_element()), None);
    }

    #[test]
    fn test_comments_part() {
        let xml = r#"<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <authors><author>Ana</author></authors>
  <commentList>
    <comment ref="B2" authorId="0"><text><r><t>Check </t></r><r><t>this</t></r></text></comment>
    <comment ref="C1" authorId="0"><text><t>Plain</t></text></comment>
  </commentList>
</comments>"#;
        let comments = parse_comments(xml).unwrap();

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0], (CellRef::new(2, 2), "Check this".to_string()));
        assert_eq!(comments[1].1, "Plain");
    }

    #[test]
    fn test_apply_merges_decor_and_keeps_formatted_blanks() {
        let part = parsed();
        let mut sheet = SourceSheet::new("Data");
        sheet.cells = vec![
            SourceCell::new(1, 1, CellValue::Text("Title".into())),
            SourceCell::new(1, 2, CellValue::Number(5.0)),
            SourceCell::new(3, 3, CellValue::Boolean(true)),
        ];

        part.apply_to(&mut sheet);

        let coords: Vec<(u32, u32)> = sheet.cells.iter().map(|c| (c.row, c.column)).collect();
        assert_eq!(coords, vec![(1, 1), (1, 2), (2, 1), (3, 3), (4, 4)]);
        assert_eq!(sheet.cells[2].value, CellValue::Empty);
        assert_eq!(sheet.cells[0].hyperlink, Ok(Some("https://example.com/docs".to_string())));
        assert_eq!(sheet.columns.len(), 2);
        assert_eq!(sheet.freeze_panes.as_deref(), Some("B3"));
        assert_eq!(sheet.validations.len(), 1);
    }
}

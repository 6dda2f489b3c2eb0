//! OOXML package parts calamine does not surface.
//!
//! calamine reads values, formulas and merges. This module opens the same
//! zip package and reads what the analysis needs on top: the stylesheet,
//! sheet layout (columns, rows, panes, page setup), validations and
//! conditional rules, hyperlinks and comments, drawings with their charts and
//! images, defined-name scopes and the document properties.
//!
//! Parts are parsed one at a time with roxmltree. A missing or broken part
//! is reported and skipped; only a package that cannot be opened at all is
//! an error.

mod drawing;
mod sheet;
mod styles;

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use roxmltree::{Document, Node};
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::diagnostics::Diagnostics;
use crate::source::{SourceColor, SourceDefinedName, SourcePageSetup, SourceProperties};

pub use sheet::{CellDecor, SheetPart};
pub use styles::{builtin_number_format, Stylesheet};

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const OFFICE_DOCUMENT: &str = "/officeDocument";
const STYLES: &str = "/styles";
const CORE_PROPERTIES: &str = "/core-properties";
const EXTENDED_PROPERTIES: &str = "/extended-properties";

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("zip error: {0}")]
    Zip(#[from] ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{part}: {reason}")]
    Part { part: String, reason: String },
}

impl PackageError {
    fn part(part: &str, reason: impl ToString) -> Self {
        PackageError::Part {
            part: part.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Everything read from the package besides cell values.
#[derive(Debug, Default)]
pub struct PackageView {
    pub properties: SourceProperties,
    /// Print areas and print titles are moved onto their sheets.
    pub defined_names: Vec<SourceDefinedName>,
    /// Name of the active tab.
    pub active_sheet: Option<String>,
    pub calculation_mode: Option<String>,
    pub sheets: Vec<SheetPart>,
}

/// A zip package opened for part reads.
pub struct Package<R> {
    archive: ZipArchive<R>,
}

impl Package<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, PackageError> {
        Package::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> Package<R> {
    pub fn new(reader: R) -> Result<Self, PackageError> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// Raw bytes of one part; `None` when the package has no such part.
    pub fn bytes(&mut self, name: &str) -> Result<Option<Vec<u8>>, PackageError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)?;
        Ok(Some(buf))
    }

    /// One XML part as text, byte-order mark stripped.
    pub fn text(&mut self, name: &str) -> Result<Option<String>, PackageError> {
        let Some(bytes) = self.bytes(name)? else {
            return Ok(None);
        };
        let text = String::from_utf8(bytes).map_err(|e| PackageError::part(name, e))?;
        Ok(Some(text.trim_start_matches('\u{feff}').to_string()))
    }

    /// Relationships of `part`; empty when it has none.
    pub fn relationships(&mut self, part: &str) -> Result<Relationships, PackageError> {
        let rels_part = rels_for_part(part);
        match self.text(&rels_part)? {
            Some(xml) => Relationships::parse(part, &xml)
                .map_err(|e| PackageError::part(&rels_part, e)),
            None => Ok(Relationships::default()),
        }
    }
}

/// Read every part the analysis needs.
///
/// Opening the package and reading the workbook part are the only hard
/// failures; each sheet, drawing or property part that cannot be read is
/// reported through `diagnostics` and left out.
pub fn read_package(path: &Path, diagnostics: &dyn Diagnostics) -> Result<PackageView, PackageError> {
    let mut package = Package::open(path)?;
    read_view(&mut package, diagnostics)
}

fn read_view<R: Read + Seek>(
    package: &mut Package<R>,
    diagnostics: &dyn Diagnostics,
) -> Result<PackageView, PackageError> {
    let root_rels = package.relationships("")?;
    let workbook_part = root_rels
        .first_of_type(OFFICE_DOCUMENT)
        .map(|rel| rel.target.clone())
        .unwrap_or_else(|| "xl/workbook.xml".to_string());

    let xml = package
        .text(&workbook_part)?
        .ok_or_else(|| PackageError::part(&workbook_part, "part missing"))?;
    let workbook = WorkbookPart::parse(&xml).map_err(|e| PackageError::part(&workbook_part, e))?;
    let workbook_rels = package.relationships(&workbook_part)?;

    let styles = match workbook_rels.first_of_type(STYLES) {
        Some(rel) => read_styles(package, &rel.target, diagnostics),
        None => Stylesheet::default(),
    };

    let mut view = PackageView {
        properties: read_properties(package, &root_rels, diagnostics),
        active_sheet: workbook
            .active_tab
            .and_then(|tab| workbook.sheets.get(tab))
            .map(|sheet| sheet.name.clone()),
        calculation_mode: workbook.calculation_mode.clone(),
        ..Default::default()
    };

    for (position, entry) in workbook.sheets.iter().enumerate() {
        let Some(rel) = workbook_rels.get(&entry.rel_id) else {
            diagnostics.warn(&format!("sheet '{}' has no package part", entry.name));
            continue;
        };
        if !rel.rel_type.ends_with("/worksheet") {
            continue;
        }
        match sheet::read_sheet(package, &entry.name, &rel.target, &styles, diagnostics) {
            Ok(mut part) => {
                attach_print_names(&mut part, &workbook.names, position);
                view.sheets.push(part);
            }
            Err(e) => diagnostics.warn(&format!("sheet '{}' layout unreadable: {}", entry.name, e)),
        }
    }

    view.defined_names = workbook
        .names
        .iter()
        .filter(|name| !name.name.starts_with("_xlnm."))
        .map(|name| SourceDefinedName {
            name: name.name.clone(),
            destinations: crate::excel::reader::destinations(&name.text),
            attr_text: Some(name.text.clone()),
            local_sheet_id: name.local_sheet_id.map(|id| id as u32),
            hidden: name.hidden,
        })
        .collect();

    Ok(view)
}

fn read_styles<R: Read + Seek>(
    package: &mut Package<R>,
    part: &str,
    diagnostics: &dyn Diagnostics,
) -> Stylesheet {
    let parsed = package.text(part).and_then(|xml| match xml {
        Some(xml) => Stylesheet::parse(&xml).map_err(|e| PackageError::part(part, e)),
        None => Ok(Stylesheet::default()),
    });
    parsed.unwrap_or_else(|e| {
        diagnostics.warn(&format!("stylesheet unreadable: {}", e));
        Stylesheet::default()
    })
}

fn read_properties<R: Read + Seek>(
    package: &mut Package<R>,
    root_rels: &Relationships,
    diagnostics: &dyn Diagnostics,
) -> SourceProperties {
    let mut properties = SourceProperties::default();

    let core = part_name(root_rels, CORE_PROPERTIES, "docProps/core.xml");
    if let Some(xml) = optional_part(package, &core, diagnostics) {
        match Document::parse(&xml) {
            Ok(doc) => core_properties(&mut properties, doc.root_element()),
            Err(e) => diagnostics.warn(&format!("{} unreadable: {}", core, e)),
        }
    }

    let app = part_name(root_rels, EXTENDED_PROPERTIES, "docProps/app.xml");
    if let Some(xml) = optional_part(package, &app, diagnostics) {
        match Document::parse(&xml) {
            Ok(doc) => extended_properties(&mut properties, doc.root_element()),
            Err(e) => diagnostics.warn(&format!("{} unreadable: {}", app, e)),
        }
    }

    properties
}

fn part_name(rels: &Relationships, rel_type: &str, fallback: &str) -> String {
    rels.first_of_type(rel_type)
        .map(|rel| rel.target.clone())
        .unwrap_or_else(|| fallback.to_string())
}

/// A part that may be absent; read failures are reported and treated as absence.
fn optional_part<R: Read + Seek>(
    package: &mut Package<R>,
    part: &str,
    diagnostics: &dyn Diagnostics,
) -> Option<String> {
    package.text(part).unwrap_or_else(|e| {
        diagnostics.warn(&format!("{} unreadable: {}", part, e));
        None
    })
}

fn core_properties(properties: &mut SourceProperties, root: Node) {
    for node in root.children().filter(Node::is_element) {
        let text = node.text().map(|t| t.trim().to_string());
        match node.tag_name().name() {
            "title" => properties.title = text,
            "subject" => properties.subject = text,
            "creator" => properties.creator = text,
            "keywords" => properties.keywords = text,
            "description" => properties.description = text,
            "lastModifiedBy" => properties.last_modified_by = text,
            "created" => properties.created = text,
            "modified" => properties.modified = text,
            "category" => properties.category = text,
            "contentStatus" => properties.content_status = text,
            "version" => properties.version = text,
            "revision" => properties.revision = text,
            _ => {}
        }
    }
}

fn extended_properties(properties: &mut SourceProperties, root: Node) {
    if let Some(app) = child(root, "Application") {
        properties.application = app.text().map(|t| t.trim().to_string());
    }
}

/// Sheet-scoped `_xlnm.Print_Area` and `_xlnm.Print_Titles` names belong to
/// the sheet's page setup. `position` counts every sheet in the workbook part.
fn attach_print_names(part: &mut SheetPart, names: &[NameEntry], position: usize) {
    for name in names.iter().filter(|n| n.local_sheet_id == Some(position)) {
        let is_area = name.name == "_xlnm.Print_Area";
        if !is_area && name.name != "_xlnm.Print_Titles" {
            continue;
        }
        let setup = part
            .layout
            .page_setup
            .get_or_insert_with(SourcePageSetup::default);
        if is_area {
            setup.print_area = Some(strip_sheet(&name.text));
        } else {
            setup.print_titles = Some(name.text.clone());
        }
    }
}

/// `Sheet!$A$1:$D$20` to `$A$1:$D$20`; several areas keep their commas.
fn strip_sheet(expr: &str) -> String {
    crate::excel::reader::split_areas(expr.trim_start_matches('='))
        .into_iter()
        .map(|area| match area.rsplit_once('!') {
            Some((_, reference)) => reference,
            None => area,
        })
        .collect::<Vec<_>>()
        .join(",")
}

// ─────────────────────────────────────────────────────────────────────────────
// Workbook part
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct SheetEntry {
    name: String,
    rel_id: String,
}

#[derive(Debug, Clone, PartialEq)]
struct NameEntry {
    name: String,
    text: String,
    local_sheet_id: Option<usize>,
    hidden: Option<bool>,
}

#[derive(Debug, Default)]
struct WorkbookPart {
    sheets: Vec<SheetEntry>,
    active_tab: Option<usize>,
    calculation_mode: Option<String>,
    names: Vec<NameEntry>,
}

impl WorkbookPart {
    fn parse(xml: &str) -> Result<Self, roxmltree::Error> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();
        let mut part = WorkbookPart::default();

        if let Some(sheets) = child(root, "sheets") {
            part.sheets = children(sheets, "sheet")
                .filter_map(|sheet| {
                    Some(SheetEntry {
                        name: sheet.attribute("name")?.to_string(),
                        rel_id: sheet.attribute((REL_NS, "id"))?.to_string(),
                    })
                })
                .collect();
        }

        part.active_tab = child(root, "bookViews")
            .and_then(|views| child(views, "workbookView"))
            .and_then(|view| number(view.attribute("activeTab")));

        part.calculation_mode = child(root, "calcPr")
            .and_then(|calc| calc.attribute("calcMode"))
            .map(str::to_string);

        if let Some(names) = child(root, "definedNames") {
            part.names = children(names, "definedName")
                .filter_map(|name| {
                    Some(NameEntry {
                        name: name.attribute("name")?.to_string(),
                        text: name.text().unwrap_or_default().trim().to_string(),
                        local_sheet_id: number(name.attribute("localSheetId")),
                        hidden: flag(name.attribute("hidden")),
                    })
                })
                .collect();
        }

        Ok(part)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Relationships
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Resolved part name, or the raw URI for external targets.
    pub target: String,
    pub external: bool,
}

/// Relationships of one part, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    pub fn parse(source_part: &str, xml: &str) -> Result<Self, roxmltree::Error> {
        let doc = Document::parse(xml)?;
        let entries = doc
            .root_element()
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
            .filter_map(|rel| {
                let target = rel.attribute("Target")?;
                let external = rel
                    .attribute("TargetMode")
                    .is_some_and(|mode| mode.eq_ignore_ascii_case("External"));
                Some(Relationship {
                    id: rel.attribute("Id")?.to_string(),
                    rel_type: rel.attribute("Type").unwrap_or_default().to_string(),
                    target: if external {
                        target.to_string()
                    } else {
                        resolve_target(source_part, target)
                    },
                    external,
                })
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.id == id)
    }

    /// First relationship whose type URI ends with `suffix`.
    pub fn first_of_type(&self, suffix: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.rel_type.ends_with(suffix))
    }

    pub fn of_type<'a>(&'a self, suffix: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.entries.iter().filter(move |rel| rel.rel_type.ends_with(suffix))
    }
}

pub fn rels_for_part(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file_name)) => format!("{}/_rels/{}.rels", dir, file_name),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let target = target.split('#').next().unwrap_or(target);
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute);
    }
    let base_dir = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    normalize(&format!("{}/{}", base_dir, target))
}

fn normalize(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

// ─────────────────────────────────────────────────────────────────────────────
// Node helpers
// ─────────────────────────────────────────────────────────────────────────────

/// First child element with this local name.
fn child<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == local)
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    local: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == local)
}

/// `val` attribute of a child element, e.g. `<c:legendPos val="r"/>`.
fn child_val<'a>(node: Node<'a, '_>, local: &str) -> Option<&'a str> {
    child(node, local).and_then(|n| n.attribute("val"))
}

/// Text of all `t` descendants, concatenated.
fn inline_text(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "t")
        .filter_map(|n| n.text())
        .collect()
}

/// XML boolean: `1`/`true` or `0`/`false`.
fn flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

fn number<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw?.trim().parse().ok()
}

/// A `CT_Color` element: `rgb`, `theme`, `indexed` or `auto`.
fn color(node: Node) -> SourceColor {
    let tint = node.attribute("tint").map(|t| t.trim().parse().unwrap_or(f64::NAN));
    if let Some(rgb) = node.attribute("rgb") {
        return SourceColor::Rgb {
            value: rgb.to_string(),
            tint,
        };
    }
    if let Some(theme) = node.attribute("theme") {
        return match theme.trim().parse() {
            Ok(index) => SourceColor::Theme { index, tint },
            Err(_) => SourceColor::Unrecognized,
        };
    }
    if let Some(indexed) = node.attribute("indexed") {
        return match indexed.trim().parse() {
            Ok(index) => SourceColor::Indexed(index),
            Err(_) => SourceColor::Unrecognized,
        };
    }
    if flag(node.attribute("auto")) == Some(true) {
        return SourceColor::Auto;
    }
    SourceColor::Unrecognized
}

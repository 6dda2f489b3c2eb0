use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::{assemble_sheet, DocumentAssembler};
use crate::diagnostics::Diagnostics;
use crate::error::ExtractionWarning;
use crate::extract::{ColorResolver, Extraction, Palette};
use crate::model::{CalculationMode, DefinedName, Properties, SourceFormat, Workbook};
use crate::source::{ModernWorkbook, SourceDefinedName, SourceProperties};

/// Assembler for XML-packaged workbooks. Uses the full indexed palette.
pub struct ModernAssembler {
    source: ModernWorkbook,
    colors: ColorResolver,
}

impl ModernAssembler {
    pub fn new(source: ModernWorkbook) -> Self {
        Self {
            source,
            colors: ColorResolver::new(Palette::Standard),
        }
    }

    fn properties(&self, diagnostics: &dyn Diagnostics) -> Properties {
        let props: &SourceProperties = &self.source.properties;
        let text = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        Properties {
            title: text(&props.title),
            subject: text(&props.subject),
            creator: text(&props.creator),
            keywords: text(&props.keywords),
            description: text(&props.description),
            last_modified_by: text(&props.last_modified_by),
            created: timestamp(props.created.as_deref(), "created").settle(diagnostics),
            modified: timestamp(props.modified.as_deref(), "modified").settle(diagnostics),
            category: text(&props.category),
            content_status: text(&props.content_status),
            version: text(&props.version),
            revision: revision(props.revision.as_deref()).settle(diagnostics),
            application: text(&props.application),
        }
    }

    fn defined_names(&self, diagnostics: &dyn Diagnostics) -> Vec<DefinedName> {
        self.source
            .defined_names
            .iter()
            .filter_map(|name| defined_name(name).settle(diagnostics))
            .collect()
    }
}

impl DocumentAssembler for ModernAssembler {
    fn format(&self) -> SourceFormat {
        SourceFormat::Modern
    }

    fn assemble(&self, file_path: &str, diagnostics: &dyn Diagnostics) -> Workbook {
        diagnostics.info(&format!(
            "Workbook loaded with {} worksheets",
            self.source.sheets.len()
        ));

        let worksheets = self
            .source
            .sheets
            .iter()
            .enumerate()
            .map(|(index, sheet)| assemble_sheet(index, sheet, &self.colors, diagnostics))
            .collect::<Vec<_>>();

        let active_sheet_index = self
            .source
            .active_sheet
            .filter(|i| *i < worksheets.len())
            .unwrap_or(0);

        Workbook {
            file_path: file_path.to_string(),
            file_format: self.format(),
            properties: self.properties(diagnostics),
            defined_names: self.defined_names(diagnostics),
            worksheets,
            active_sheet_index,
            calculation_mode: self
                .source
                .calculation_mode
                .as_deref()
                .map(CalculationMode::from_tag)
                .unwrap_or_default(),
        }
    }
}

/// First destination only; names with no destination are dropped.
/// When destinations cannot be enumerated the raw definition text is used.
pub(crate) fn defined_name(source: &SourceDefinedName) -> Extraction<DefinedName> {
    let value = match &source.destinations {
        Ok(destinations) => match destinations.first() {
            Some((Some(sheet), reference)) => format!("'{}'!{}", sheet, reference),
            Some((None, reference)) => reference.clone(),
            None => return Extraction::Absent,
        },
        Err(fault) => match source.attr_text.as_ref().filter(|t| !t.is_empty()) {
            Some(text) => text.clone(),
            None => {
                return Extraction::Recovered(ExtractionWarning::new(
                    format!("defined name '{}'", source.name),
                    &fault.message,
                ))
            }
        },
    };

    Extraction::Extracted(DefinedName {
        name: source.name.clone(),
        value,
        local_sheet_id: source.local_sheet_id,
        hidden: source.hidden.unwrap_or(false),
    })
}

/// W3CDTF timestamps (`2024-01-15T10:30:00Z`), naive date-times, or bare dates.
fn timestamp(raw: Option<&str>, field: &str) -> Extraction<NaiveDateTime> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Extraction::Absent;
    };

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });

    match parsed {
        Some(dt) => Extraction::Extracted(dt),
        None => Extraction::Recovered(ExtractionWarning::new(
            format!("property '{}'", field),
            format!("unparseable timestamp '{}'", raw),
        )),
    }
}

fn revision(raw: Option<&str>) -> Extraction<u32> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Extraction::Absent;
    };
    match raw.parse() {
        Ok(n) => Extraction::Extracted(n),
        Err(_) => Extraction::Recovered(ExtractionWarning::new(
            "property 'revision'",
            format!("not a number: '{}'", raw),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectedDiagnostics;
    use crate::source::{SourceFault, SourceSheet};

    fn name(destinations: Result<Vec<(Option<String>, String)>, SourceFault>) -> SourceDefinedName {
        SourceDefinedName {
            name: "Totals".to_string(),
            destinations,
            attr_text: Some("Data!$B$10".to_string()),
            local_sheet_id: None,
            hidden: None,
        }
    }

    #[test]
    fn test_defined_name_keeps_first_destination() {
        let source = name(Ok(vec![
            (Some("Data".to_string()), "$B$10".to_string()),
            (Some("Other".to_string()), "$C$1".to_string()),
        ]));
        let defined = defined_name(&source).into_option().unwrap();
        assert_eq!(defined.value, "'Data'!$B$10");
        assert!(!defined.hidden);
    }

    #[test]
    fn test_defined_name_fallbacks() {
        assert_eq!(defined_name(&name(Ok(vec![]))), Extraction::Absent);

        let fallback = defined_name(&name(Err(SourceFault::new("external reference"))));
        assert_eq!(fallback.into_option().unwrap().value, "Data!$B$10");

        let mut bare = name(Err(SourceFault::new("external reference")));
        bare.attr_text = None;
        assert!(defined_name(&bare).is_recovered());
    }

    #[test]
    fn test_timestamps() {
        let dt = timestamp(Some("2024-01-15T10:30:00Z"), "created")
            .into_option()
            .unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 10:30:00");
        assert_eq!(timestamp(None, "created"), Extraction::Absent);
        assert!(timestamp(Some("yesterday"), "created").is_recovered());
    }

    #[test]
    fn test_assemble_preserves_sheet_order_and_index() {
        let source = ModernWorkbook {
            sheets: vec![SourceSheet::new("First"), SourceSheet::new("Second")],
            active_sheet: Some(7),
            calculation_mode: Some("manual".to_string()),
            ..Default::default()
        };
        let diagnostics = CollectedDiagnostics::new();
        let workbook = ModernAssembler::new(source).assemble("book.xlsx", &diagnostics);

        let names: Vec<&str> = workbook.worksheets.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        for (i, ws) in workbook.worksheets.iter().enumerate() {
            assert_eq!(ws.index, i);
        }
        assert_eq!(workbook.active_sheet_index, 0);
        assert_eq!(workbook.calculation_mode, CalculationMode::Manual);
        assert_eq!(workbook.file_format, SourceFormat::Modern);
    }
}

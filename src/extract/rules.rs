//! Validation / Conditional Extractor.

use super::style::StyleExtractor;
use super::Extraction;
use crate::diagnostics::Diagnostics;
use crate::error::ExtractionWarning;
use crate::model::{ConditionalFormatting, DataValidation, DifferentialFormat};
use crate::source::{RuleListing, SourceFormula, SourceRule, SourceValidation};

pub struct RuleExtractor<'a> {
    styles: StyleExtractor<'a>,
}

impl<'a> RuleExtractor<'a> {
    pub fn new(styles: StyleExtractor<'a>) -> Self {
        Self { styles }
    }

    pub fn validations(&self, validations: &[SourceValidation]) -> Vec<DataValidation> {
        validations.iter().map(validation).collect()
    }

    /// Every rule is emitted, whichever listing shape the source used.
    pub fn conditional_formats(
        &self,
        rules: &RuleListing<SourceRule>,
        sheet: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Vec<ConditionalFormatting> {
        rules
            .iter()
            .enumerate()
            .map(|(i, (sqref, rule))| {
                let context = format!("conditional rule {} on '{}'", i + 1, sheet);
                let format_description = self.format_description(rule, &context).settle(diagnostics);
                ConditionalFormatting {
                    sqref: sqref.to_string(),
                    rule_type: rule
                        .rule_type
                        .clone()
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| "unknown".to_string()),
                    priority: rule.priority.unwrap_or(0),
                    formula: formulas(rule.formula.as_ref()),
                    operator: rule.operator.clone(),
                    stop_if_true: rule.stop_if_true.unwrap_or(false),
                    dxf_id: rule.dxf_id,
                    format_description,
                }
            })
            .collect()
    }

    /// Deltas of the rule's differential format. An unreadable format only
    /// loses this description; the rule itself survives.
    pub fn format_description(
        &self,
        rule: &SourceRule,
        context: &str,
    ) -> Extraction<DifferentialFormat> {
        match &rule.dxf {
            Ok(Some(dxf)) => Extraction::from_option(self.styles.differential(dxf)),
            Ok(None) => Extraction::Absent,
            Err(fault) => Extraction::Recovered(ExtractionWarning::new(
                format!("{} format", context),
                &fault.message,
            )),
        }
    }
}

fn validation(source: &SourceValidation) -> DataValidation {
    DataValidation {
        sqref: source.sqref.clone().unwrap_or_default(),
        validation_type: source
            .validation_type
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "none".to_string()),
        operator: source.operator.clone(),
        formula1: source.formula1.clone(),
        formula2: source.formula2.clone(),
        allow_blank: source.allow_blank.unwrap_or(true),
        show_input_message: source.show_input_message.unwrap_or(false),
        input_title: source.prompt_title.clone(),
        input_message: source.prompt.clone(),
        show_error_message: source.show_error_message.unwrap_or(true),
        error_title: source.error_title.clone(),
        error_message: source.error.clone(),
        error_style: source
            .error_style
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "stop".to_string()),
    }
}

/// Scalar or list, always a list; `None` when there is no formula text.
fn formulas(formula: Option<&SourceFormula>) -> Option<Vec<String>> {
    let list = match formula? {
        SourceFormula::Scalar(text) => vec![text.clone()],
        SourceFormula::List(items) => items.clone(),
    };
    let list: Vec<String> = list.into_iter().filter(|f| !f.is_empty()).collect();
    (!list.is_empty()).then_some(list)
}

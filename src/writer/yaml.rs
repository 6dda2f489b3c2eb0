use std::fs;
use std::path::Path;

use super::json::AnalysisDocument;
use crate::error::LensResult;
use crate::model::Workbook;

/// Same document as the JSON report, in YAML.
pub fn to_yaml_string(workbook: &Workbook) -> LensResult<String> {
    Ok(serde_yaml::to_string(&AnalysisDocument::new(workbook))?)
}

pub fn write_yaml(workbook: &Workbook, path: &Path) -> LensResult<()> {
    fs::write(path, to_yaml_string(workbook)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SourceFormat, Worksheet};
    use serde_yaml::Value;

    #[test]
    fn test_yaml_round_trips_through_parser() {
        let workbook = Workbook {
            file_path: "old.xls".to_string(),
            file_format: SourceFormat::Legacy,
            properties: Default::default(),
            worksheets: vec![Worksheet::new("Only", 0)],
            defined_names: vec![],
            active_sheet_index: 0,
            calculation_mode: Default::default(),
        };

        let yaml: Value = serde_yaml::from_str(&to_yaml_string(&workbook).unwrap()).unwrap();
        assert_eq!(yaml["metadata"]["source_file"].as_str(), Some("old.xls"));
        assert_eq!(yaml["workbook"]["file_format"].as_str(), Some("legacy"));
        assert_eq!(
            yaml["workbook"]["worksheets"][0]["sheet_state"].as_str(),
            Some("visible")
        );
    }
}

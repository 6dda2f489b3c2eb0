//! Chart extraction. Best effort per chart: a chart whose series cannot be
//! read is dropped, the rest of the sheet's charts are kept.

use super::color::ColorResolver;
use super::Extraction;
use crate::coords::coordinate;
use crate::diagnostics::Diagnostics;
use crate::error::ExtractionWarning;
use crate::model::{Axis, Chart, ChartPosition, ChartSeries, Legend};
use crate::source::{Probe, SourceAnchor, SourceAxis, SourceChart, SourceLegend, SourceTitle};

const CHART_TYPES: [(&str, &str); 15] = [
    ("BarChart", "bar"),
    ("BarChart3D", "bar3d"),
    ("LineChart", "line"),
    ("LineChart3D", "line3d"),
    ("PieChart", "pie"),
    ("PieChart3D", "pie3d"),
    ("ScatterChart", "scatter"),
    ("AreaChart", "area"),
    ("AreaChart3D", "area3d"),
    ("DoughnutChart", "doughnut"),
    ("RadarChart", "radar"),
    ("BubbleChart", "bubble"),
    ("StockChart", "stock"),
    ("SurfaceChart", "surface"),
    ("SurfaceChart3D", "surface3d"),
];

/// Known class names map to family tags; anything else is lowercased.
pub fn chart_type(class_name: &str) -> String {
    CHART_TYPES
        .iter()
        .find(|(class, _)| *class == class_name)
        .map(|(_, tag)| tag.to_string())
        .unwrap_or_else(|| class_name.to_lowercase())
}

/// First run of the first paragraph; absent anywhere along the chain gives `None`.
pub fn title_text(title: Option<&SourceTitle>) -> Option<String> {
    title?
        .rich
        .as_ref()?
        .paragraphs
        .first()?
        .runs
        .first()?
        .text
        .clone()
}

/// Anchor cell and offsets of a drawing object.
///
/// Source markers are 0-based. Width and height come only from an explicit
/// extent; two-cell anchors are not converted to pixels.
pub fn position(anchor: &SourceAnchor) -> ChartPosition {
    let mut position = ChartPosition::default();
    if let Some(from) = anchor.from {
        position.anchor = coordinate(from.row + 1, from.col + 1);
        position.x_offset = from.col_offset;
        position.y_offset = from.row_offset;
    }
    if let Some(extent) = anchor.extent {
        position.width = Some(extent.width);
        position.height = Some(extent.height);
    }
    position
}

pub struct ChartExtractor<'a> {
    colors: &'a ColorResolver,
}

impl<'a> ChartExtractor<'a> {
    pub fn new(colors: &'a ColorResolver) -> Self {
        Self { colors }
    }

    pub fn extract_all(
        &self,
        charts: &[SourceChart],
        sheet: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Vec<Chart> {
        charts
            .iter()
            .enumerate()
            .filter_map(|(i, chart)| {
                let context = format!("chart {} on '{}'", i + 1, sheet);
                self.extract(chart, &context, diagnostics).settle(diagnostics)
            })
            .collect()
    }

    /// Axis and legend faults are logged and replaced by defaults; a series
    /// fault recovers the whole chart.
    pub fn extract(
        &self,
        chart: &SourceChart,
        context: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Extraction<Chart> {
        let series = match &chart.series {
            Ok(series) => series
                .iter()
                .map(|s| ChartSeries {
                    title: s.title.clone(),
                    values: s.values.clone(),
                    categories: s.categories.clone(),
                    color: s
                        .solid_fill
                        .as_ref()
                        .and_then(|fill| self.colors.resolve(Some(fill))),
                })
                .collect(),
            Err(fault) => {
                return Extraction::Recovered(ExtractionWarning::new(
                    context,
                    format!("series unreadable: {}", fault),
                ))
            }
        };

        let x_axis = chart
            .x_axis
            .as_ref()
            .map(|axis| self.axis(axis, &format!("{} x axis", context), diagnostics));
        let y_axis = chart
            .y_axis
            .as_ref()
            .map(|axis| self.axis(axis, &format!("{} y axis", context), diagnostics));

        let legend = chart.legend.as_ref().map(|legend| match legend {
            Ok(source) => self.legend(source),
            Err(fault) => {
                diagnostics.recovered(&ExtractionWarning::new(
                    format!("{} legend", context),
                    &fault.message,
                ));
                Legend::default()
            }
        });

        Extraction::Extracted(Chart {
            chart_type: chart_type(&chart.class_name),
            title: title_text(chart.title.as_ref()),
            series,
            x_axis,
            y_axis,
            legend,
            position: chart.anchor.as_ref().map(position),
            style: chart.style,
        })
    }

    /// Subfields are independently optional; an unreadable axis becomes the default axis.
    pub fn axis(
        &self,
        probe: &Probe<SourceAxis>,
        context: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Axis {
        match probe {
            Ok(source) => Axis {
                title: title_text(source.title.as_ref()),
                min_value: source.scaling_min,
                max_value: source.scaling_max,
                major_unit: source.major_unit,
                minor_unit: source.minor_unit,
                number_format: source.number_format.clone().filter(|f| !f.is_empty()),
                axis_position: source.position.clone(),
                delete: source.deleted.unwrap_or(false),
            },
            Err(fault) => {
                diagnostics.recovered(&ExtractionWarning::new(context, &fault.message));
                Axis::default()
            }
        }
    }

    fn legend(&self, source: &SourceLegend) -> Legend {
        let defaults = Legend::default();
        Legend {
            position: source
                .position
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or(defaults.position),
            overlay: source.overlay.unwrap_or(defaults.overlay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectedDiagnostics;
    use crate::model::Color;
    use crate::source::{AnchorExtent, AnchorMarker, SourceColor, SourceFault, SourceSeries};
    use pretty_assertions::assert_eq;

    fn bar_chart(title: &str) -> SourceChart {
        let mut chart = SourceChart::new("BarChart");
        chart.title = Some(SourceTitle::plain(title));
        chart.series = Ok(vec![SourceSeries {
            title: Some("Revenue".to_string()),
            values: Some("'Data'!$B$2:$B$5".to_string()),
            categories: Some("'Data'!$A$2:$A$5".to_string()),
            solid_fill: Some(SourceColor::Rgb {
                value: "4472C4".to_string(),
                tint: None,
            }),
        }]);
        chart
    }

    #[test]
    fn test_chart_type_mapping() {
        assert_eq!(chart_type("LineChart3D"), "line3d");
        assert_eq!(chart_type("DoughnutChart"), "doughnut");
        assert_eq!(chart_type("OfPieChart"), "ofpiechart");
    }

    #[test]
    fn test_title_chain_absence() {
        assert_eq!(title_text(None), None);
        assert_eq!(title_text(Some(&SourceTitle::default())), None);
        assert_eq!(title_text(Some(&SourceTitle::plain("Sales"))), Some("Sales".to_string()));
    }

    #[test]
    fn test_position_from_zero_based_marker() {
        let anchor = SourceAnchor {
            from: Some(AnchorMarker {
                col: 4,
                row: 4,
                col_offset: 12700,
                row_offset: 0,
            }),
            to: Some(AnchorMarker::default()),
            extent: None,
        };
        let pos = position(&anchor);
        assert_eq!(pos.anchor, "E5");
        assert_eq!(pos.x_offset, 12700);
        assert_eq!(pos.width, None);

        let sized = SourceAnchor {
            extent: Some(AnchorExtent {
                width: 480,
                height: 288,
            }),
            ..anchor
        };
        assert_eq!(position(&sized).height, Some(288));
    }

    #[test]
    fn test_series_fault_drops_only_that_chart() {
        let colors = ColorResolver::default();
        let extractor = ChartExtractor::new(&colors);
        let diagnostics = CollectedDiagnostics::new();

        let mut broken = SourceChart::new("PieChart");
        broken.series = Err(SourceFault::new("missing numRef"));
        let charts = vec![bar_chart("First"), broken, bar_chart("Third")];

        let extracted = extractor.extract_all(&charts, "Data", &diagnostics);
        let titles: Vec<Option<String>> = extracted.iter().map(|c| c.title.clone()).collect();
        assert_eq!(titles, vec![Some("First".to_string()), Some("Third".to_string())]);
        assert_eq!(diagnostics.warnings().len(), 1);
        assert!(diagnostics.warnings()[0].starts_with("chart 2 on 'Data'"));

        let series = &extracted[0].series[0];
        assert_eq!(series.color, Some(Color::rgb("#4472C4")));
        assert_eq!(series.values.as_deref(), Some("'Data'!$B$2:$B$5"));
    }

    #[test]
    fn test_axis_and_legend_faults_fall_back_to_defaults() {
        let colors = ColorResolver::default();
        let extractor = ChartExtractor::new(&colors);
        let diagnostics = CollectedDiagnostics::new();

        let mut chart = bar_chart("Sales");
        chart.x_axis = Some(Err(SourceFault::new("bad scaling")));
        chart.y_axis = Some(Ok(SourceAxis {
            scaling_min: Some(0.0),
            deleted: Some(true),
            ..Default::default()
        }));
        chart.legend = Some(Ok(SourceLegend::default()));

        let extracted = extractor
            .extract(&chart, "chart 1", &diagnostics)
            .into_option()
            .unwrap();
        assert_eq!(extracted.x_axis, Some(Axis::default()));
        let y = extracted.y_axis.unwrap();
        assert_eq!(y.min_value, Some(0.0));
        assert_eq!(y.max_value, None);
        assert!(y.delete);
        assert_eq!(extracted.legend, Some(Legend::default()));
        assert_eq!(diagnostics.warnings(), vec!["chart 1 x axis: bad scaling".to_string()]);
    }
}

//! Drawing parts: anchors, embedded pictures and charts.
//!
//! Drawing coordinates are stored in EMU; markers offsets and sizes are
//! converted to pixels at 96 dpi.

use std::io::{Read, Seek};

use roxmltree::{Document, Node};

use super::{child, child_val, children, flag, number, Package, PackageError, REL_NS};
use crate::source::{
    AnchorExtent, AnchorMarker, Paragraph, RichText, SourceAnchor, SourceAxis, SourceChart,
    SourceColor, SourceFault, SourceImage, SourceLegend, SourceSeries, SourceTitle, TextRun,
};

const EMU_PER_PIXEL: i64 = 9525;

/// Theme slots in `a:schemeClr` order of the theme color table.
const SCHEME_COLORS: &[(&str, u32)] = &[
    ("lt1", 0),
    ("bg1", 0),
    ("dk1", 1),
    ("tx1", 1),
    ("lt2", 2),
    ("bg2", 2),
    ("dk2", 3),
    ("tx2", 3),
    ("accent1", 4),
    ("accent2", 5),
    ("accent3", 6),
    ("accent4", 7),
    ("accent5", 8),
    ("accent6", 9),
    ("hlink", 10),
    ("folHlink", 11),
];

/// One graphic object found in a drawing, before its payload is loaded.
#[derive(Debug, Clone, PartialEq)]
enum Graphic {
    Picture {
        embed: Option<String>,
        description: Option<String>,
        size: Option<AnchorExtent>,
    },
    Chart {
        rel_id: String,
    },
}

pub(super) fn read_drawing<R: Read + Seek>(
    package: &mut Package<R>,
    part: &str,
) -> Result<(Vec<SourceChart>, Vec<SourceImage>), PackageError> {
    let xml = package
        .text(part)?
        .ok_or_else(|| PackageError::part(part, "part missing"))?;
    let rels = package.relationships(part)?;
    let graphics = parse_drawing(&xml).map_err(|e| PackageError::part(part, e))?;

    let mut charts = Vec::new();
    let mut images = Vec::new();
    for (anchor, graphic) in graphics {
        match graphic {
            Graphic::Picture {
                embed,
                description,
                size,
            } => {
                let target = embed.as_deref().and_then(|id| rels.get(id));
                let data = match target {
                    Some(rel) => match package.bytes(&rel.target) {
                        Ok(Some(bytes)) => Ok(bytes),
                        Ok(None) => Err(SourceFault::new(format!("{} missing", rel.target))),
                        Err(e) => Err(SourceFault::new(e.to_string())),
                    },
                    None => Err(SourceFault::new("picture has no embedded media")),
                };
                let size = size.or(anchor.extent);
                images.push(SourceImage {
                    data,
                    width: size.and_then(|s| u32::try_from(s.width).ok()),
                    height: size.and_then(|s| u32::try_from(s.height).ok()),
                    anchor: Some(anchor),
                    description,
                });
            }
            Graphic::Chart { rel_id } => {
                let mut chart = match rels.get(&rel_id) {
                    Some(rel) => read_chart(package, &rel.target),
                    None => unreadable_chart(format!("chart relationship {} missing", rel_id)),
                };
                chart.anchor = Some(anchor);
                charts.push(chart);
            }
        }
    }
    Ok((charts, images))
}

fn read_chart<R: Read + Seek>(package: &mut Package<R>, part: &str) -> SourceChart {
    let parsed = package.text(part).map_err(|e| e.to_string()).and_then(|xml| match xml {
        Some(xml) => parse_chart(&xml).map_err(|e| e.to_string()),
        None => Err("part missing".to_string()),
    });
    parsed.unwrap_or_else(|reason| unreadable_chart(format!("{}: {}", part, reason)))
}

/// Placeholder whose series carry the fault; the chart extractor drops it
/// with a warning.
fn unreadable_chart(reason: String) -> SourceChart {
    let mut chart = SourceChart::new("Chart");
    chart.series = Err(SourceFault::new(reason));
    chart
}

fn parse_drawing(xml: &str) -> Result<Vec<(SourceAnchor, Graphic)>, roxmltree::Error> {
    let doc = Document::parse(xml)?;
    let mut graphics = Vec::new();

    for node in doc.root_element().children().filter(Node::is_element) {
        let anchor = match node.tag_name().name() {
            "twoCellAnchor" => SourceAnchor {
                from: child(node, "from").and_then(marker),
                to: child(node, "to").and_then(marker),
                extent: None,
            },
            "oneCellAnchor" => SourceAnchor {
                from: child(node, "from").and_then(marker),
                to: None,
                extent: child(node, "ext").and_then(extent),
            },
            "absoluteAnchor" => SourceAnchor {
                from: None,
                to: None,
                extent: child(node, "ext").and_then(extent),
            },
            _ => continue,
        };

        for content in node.children().filter(Node::is_element) {
            let graphic = match content.tag_name().name() {
                "pic" => Graphic::Picture {
                    embed: child(content, "blipFill")
                        .and_then(|fill| child(fill, "blip"))
                        .and_then(|blip| blip.attribute((REL_NS, "embed")))
                        .map(str::to_string),
                    description: child(content, "nvPicPr")
                        .and_then(|nv| child(nv, "cNvPr"))
                        .and_then(|props| props.attribute("descr"))
                        .map(str::to_string),
                    size: child(content, "spPr")
                        .and_then(|sp| child(sp, "xfrm"))
                        .and_then(|xfrm| child(xfrm, "ext"))
                        .and_then(extent),
                },
                "graphicFrame" => {
                    let chart = content
                        .descendants()
                        .find(|n| n.is_element() && n.tag_name().name() == "chart")
                        .and_then(|chart| chart.attribute((REL_NS, "id")));
                    match chart {
                        Some(id) => Graphic::Chart {
                            rel_id: id.to_string(),
                        },
                        None => continue,
                    }
                }
                _ => continue,
            };
            graphics.push((anchor.clone(), graphic));
        }
    }

    Ok(graphics)
}

fn marker(node: Node) -> Option<AnchorMarker> {
    let value = |local: &str| -> Option<i64> { number(child(node, local)?.text()) };
    Some(AnchorMarker {
        col: u32::try_from(value("col")?).ok()?,
        row: u32::try_from(value("row")?).ok()?,
        col_offset: value("colOff").unwrap_or(0) / EMU_PER_PIXEL,
        row_offset: value("rowOff").unwrap_or(0) / EMU_PER_PIXEL,
    })
}

/// `cx`/`cy` in pixels.
fn extent(node: Node) -> Option<AnchorExtent> {
    let cx: i64 = number(node.attribute("cx"))?;
    let cy: i64 = number(node.attribute("cy"))?;
    Some(AnchorExtent {
        width: cx / EMU_PER_PIXEL,
        height: cy / EMU_PER_PIXEL,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Chart parts
// ─────────────────────────────────────────────────────────────────────────────

fn parse_chart(xml: &str) -> Result<SourceChart, roxmltree::Error> {
    let doc = Document::parse(xml)?;
    let space = doc.root_element();
    let chart_node = child(space, "chart");
    let plot = chart_node.and_then(|c| child(c, "plotArea"));
    let kind = plot.and_then(|p| {
        p.children()
            .find(|n| n.is_element() && n.tag_name().name().ends_with("Chart"))
    });

    let mut chart = SourceChart::new(
        kind.map(|k| class_name(k.tag_name().name()))
            .unwrap_or_else(|| "Chart".to_string()),
    );
    chart.style = number(child_val(space, "style"));
    chart.title = chart_node.and_then(|c| child(c, "title")).map(title);
    chart.series = Ok(kind
        .map(|k| children(k, "ser").map(series).collect())
        .unwrap_or_default());

    let axes: Vec<Node> = plot
        .map(|p| {
            p.children()
                .filter(|n| n.is_element() && n.tag_name().name().ends_with("Ax"))
                .collect()
        })
        .unwrap_or_default();
    let named = |names: &[&str]| {
        axes.iter()
            .find(|a| names.iter().any(|name| *name == a.tag_name().name()))
            .copied()
    };
    let x = named(&["catAx", "dateAx"]).or_else(|| named(&["valAx"]));
    let y = axes
        .iter()
        .find(|a| a.tag_name().name() == "valAx" && Some(**a) != x)
        .copied();
    chart.x_axis = x.map(|a| Ok(axis(a)));
    chart.y_axis = y.map(|a| Ok(axis(a)));

    chart.legend = chart_node.and_then(|c| child(c, "legend")).map(|legend| {
        Ok(SourceLegend {
            position: child_val(legend, "legendPos").map(str::to_string),
            overlay: flag(child_val(legend, "overlay")),
        })
    });

    Ok(chart)
}

/// `barChart` to `BarChart`, `bar3DChart` to `BarChart3D`.
fn class_name(tag: &str) -> String {
    let (base, three_d) = match tag.strip_suffix("3DChart") {
        Some(base) => (base, true),
        None => (tag.strip_suffix("Chart").unwrap_or(tag), false),
    };
    let mut name = String::new();
    let mut chars = base.chars();
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name.push_str("Chart");
    if three_d {
        name.push_str("3D");
    }
    name
}

fn title(node: Node) -> SourceTitle {
    let rich = child(node, "tx").and_then(|tx| child(tx, "rich"));
    SourceTitle {
        rich: rich.map(|rich| RichText {
            paragraphs: children(rich, "p")
                .map(|p| Paragraph {
                    runs: children(p, "r")
                        .map(|run| TextRun {
                            text: child(run, "t")
                                .and_then(|t| t.text())
                                .map(str::to_string),
                        })
                        .collect(),
                })
                .collect(),
        }),
    }
}

fn series(node: Node) -> SourceSeries {
    let reference = |local: &str| -> Option<String> {
        child(node, local)?
            .descendants()
            .find(|d| d.is_element() && d.tag_name().name() == "f")
            .and_then(|f| f.text())
            .map(str::to_string)
    };
    let title = child(node, "tx").and_then(|tx| {
        child(tx, "strRef")
            .and_then(|r| child(r, "f"))
            .or_else(|| child(tx, "v"))
            .and_then(|n| n.text())
            .map(str::to_string)
    });

    SourceSeries {
        title,
        values: reference("val").or_else(|| reference("yVal")),
        categories: reference("cat").or_else(|| reference("xVal")),
        solid_fill: child(node, "spPr")
            .and_then(|sp| child(sp, "solidFill"))
            .and_then(drawing_color),
    }
}

/// First color choice inside a DrawingML fill.
fn drawing_color(fill: Node) -> Option<SourceColor> {
    let choice = fill.children().find(Node::is_element)?;
    let value = choice.attribute("val");
    Some(match choice.tag_name().name() {
        "srgbClr" => SourceColor::Rgb {
            value: value?.to_string(),
            tint: None,
        },
        "sysClr" => SourceColor::Rgb {
            value: choice.attribute("lastClr")?.to_string(),
            tint: None,
        },
        "schemeClr" => SCHEME_COLORS
            .iter()
            .find(|(name, _)| Some(*name) == value)
            .map(|(_, index)| SourceColor::Theme {
                index: *index,
                tint: None,
            })
            .unwrap_or(SourceColor::Unrecognized),
        _ => SourceColor::Unrecognized,
    })
}

fn axis(node: Node) -> SourceAxis {
    let scaling = child(node, "scaling");
    SourceAxis {
        title: child(node, "title").map(title),
        scaling_min: scaling.and_then(|s| number(child_val(s, "min"))),
        scaling_max: scaling.and_then(|s| number(child_val(s, "max"))),
        major_unit: number(child_val(node, "majorUnit")),
        minor_unit: number(child_val(node, "minorUnit")),
        number_format: child(node, "numFmt")
            .and_then(|n| n.attribute("formatCode"))
            .map(str::to_string),
        position: child_val(node, "axPos").map(str::to_string),
        deleted: flag(child_val(node, "delete")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DRAWING: &str = r#"<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing"
    xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
    xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
    xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart">
  <xdr:twoCellAnchor>
    <xdr:from><xdr:col>3</xdr:col><xdr:colOff>95250</xdr:colOff><xdr:row>1</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
    <xdr:to><xdr:col>10</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>16</xdr:row><xdr:rowOff>19050</xdr:rowOff></xdr:to>
    <xdr:graphicFrame macro="">
      <xdr:nvGraphicFramePr><xdr:cNvPr id="2" name="Chart 1"/><xdr:cNvGraphicFramePr/></xdr:nvGraphicFramePr>
      <a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart r:id="rId1"/></a:graphicData></a:graphic>
    </xdr:graphicFrame>
    <xdr:clientData/>
  </xdr:twoCellAnchor>
  <xdr:oneCellAnchor>
    <xdr:from><xdr:col>0</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>20</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
    <xdr:ext cx="952500" cy="476250"/>
    <xdr:pic>
      <xdr:nvPicPr><xdr:cNvPr id="3" name="Picture 2" descr="logo"/><xdr:cNvPicPr/></xdr:nvPicPr>
      <xdr:blipFill><a:blip r:embed="rId2"/></xdr:blipFill>
      <xdr:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="1905000" cy="952500"/></a:xfrm></xdr:spPr>
    </xdr:pic>
    <xdr:clientData/>
  </xdr:oneCellAnchor>
</xdr:wsDr>"#;

    const CHART: &str = r##"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"
    xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
  <c:style val="12"/>
  <c:chart>
    <c:title><c:tx><c:rich><a:bodyPr/><a:p><a:r><a:t>Sales </a:t></a:r><a:r><a:t>2024</a:t></a:r></a:p></c:rich></c:tx></c:title>
    <c:plotArea>
      <c:bar3DChart>
        <c:barDir val="col"/>
        <c:ser>
          <c:idx val="0"/>
          <c:tx><c:strRef><c:f>Data!$B$1</c:f></c:strRef></c:tx>
          <c:spPr><a:solidFill><a:schemeClr val="accent2"/></a:solidFill></c:spPr>
          <c:cat><c:strRef><c:f>Data!$A$2:$A$5</c:f></c:strRef></c:cat>
          <c:val><c:numRef><c:f>Data!$B$2:$B$5</c:f></c:numRef></c:val>
        </c:ser>
        <c:ser>
          <c:idx val="1"/>
          <c:spPr><a:solidFill><a:srgbClr val="4472C4"/></a:solidFill></c:spPr>
          <c:val><c:numRef><c:f>Data!$C$2:$C$5</c:f></c:numRef></c:val>
        </c:ser>
      </c:bar3DChart>
      <c:catAx><c:axId val="1"/><c:delete val="0"/><c:axPos val="b"/></c:catAx>
      <c:valAx>
        <c:axId val="2"/>
        <c:scaling><c:max val="100"/><c:min val="0"/></c:scaling>
        <c:axPos val="l"/>
        <c:title><c:tx><c:rich><a:p><a:r><a:t>Units</a:t></a:r></a:p></c:rich></c:tx></c:title>
        <c:numFmt formatCode="#,##0" sourceLinked="0"/>
        <c:majorUnit val="20"/>
      </c:valAx>
    </c:plotArea>
    <c:legend><c:legendPos val="b"/><c:overlay val="0"/></c:legend>
  </c:chart>
</c:chartSpace>"##;

    #[test]
    fn test_anchors_in_pixels() {
        let graphics = parse_drawing(DRAWING).unwrap();
        assert_eq!(graphics.len(), 2);

        let (chart_anchor, chart) = &graphics[0];
        assert_eq!(
            chart,
            &Graphic::Chart {
                rel_id: "rId1".to_string()
            }
        );
        assert_eq!(
            chart_anchor.from,
            Some(AnchorMarker {
                col: 3,
                row: 1,
                col_offset: 10,
                row_offset: 0
            })
        );
        assert_eq!(chart_anchor.to.map(|m| m.row_offset), Some(2));
        assert_eq!(chart_anchor.extent, None);

        let (picture_anchor, picture) = &graphics[1];
        assert_eq!(
            picture_anchor.extent,
            Some(AnchorExtent {
                width: 100,
                height: 50
            })
        );
        assert_eq!(
            picture,
            &Graphic::Picture {
                embed: Some("rId2".to_string()),
                description: Some("logo".to_string()),
                size: Some(AnchorExtent {
                    width: 200,
                    height: 100
                }),
            }
        );
    }

    #[test]
    fn test_chart_part() {
        let chart = parse_chart(CHART).unwrap();

        assert_eq!(chart.class_name, "BarChart3D");
        assert_eq!(chart.style, Some(12));
        assert_eq!(chart.title, Some(SourceTitle {
            rich: Some(RichText {
                paragraphs: vec![Paragraph {
                    runs: vec![
                        TextRun { text: Some("Sales ".to_string()) },
                        TextRun { text: Some("2024".to_string()) },
                    ],
                }],
            }),
        }));

        let series = chart.series.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].title.as_deref(), Some("Data!$B$1"));
        assert_eq!(series[0].categories.as_deref(), Some("Data!$A$2:$A$5"));
        assert_eq!(series[0].values.as_deref(), Some("Data!$B$2:$B$5"));
        assert_eq!(
            series[0].solid_fill,
            Some(SourceColor::Theme { index: 5, tint: None })
        );
        assert_eq!(series[1].title, None);
        assert_eq!(
            series[1].solid_fill,
            Some(SourceColor::Rgb { value: "4472C4".to_string(), tint: None })
        );
    }

    #[test]
    fn test_chart_axes_and_legend() {
        let chart = parse_chart(CHART).unwrap();

        let x = chart.x_axis.unwrap().unwrap();
        assert_eq!(x.position.as_deref(), Some("b"));
        assert_eq!(x.deleted, Some(false));

        let y = chart.y_axis.unwrap().unwrap();
        assert_eq!(y.scaling_min, Some(0.0));
        assert_eq!(y.scaling_max, Some(100.0));
        assert_eq!(y.major_unit, Some(20.0));
        assert_eq!(y.number_format.as_deref(), Some("#,##0"));
        assert_eq!(y.title, Some(SourceTitle::plain("Units")));

        let legend = chart.legend.unwrap().unwrap();
        assert_eq!(legend.position.as_deref(), Some("b"));
        assert_eq!(legend.overlay, Some(false));
    }

    #[test]
    fn test_scatter_series_use_x_and_y_values() {
        let xml = r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart">
  <c:chart><c:plotArea><c:scatterChart>
    <c:ser>
      <c:tx><c:v>Points</c:v></c:tx>
      <c:xVal><c:numRef><c:f>Sheet1!$A$1:$A$9</c:f></c:numRef></c:xVal>
      <c:yVal><c:numRef><c:f>Sheet1!$B$1:$B$9</c:f></c:numRef></c:yVal>
    </c:ser>
  </c:scatterChart>
  <c:valAx><c:axId val="1"/><c:axPos val="b"/></c:valAx>
  <c:valAx><c:axId val="2"/><c:axPos val="l"/></c:valAx>
  </c:plotArea></c:chart>
</c:chartSpace>"#;
        let chart = parse_chart(xml).unwrap();

        assert_eq!(chart.class_name, "ScatterChart");
        let series = chart.series.unwrap();
        assert_eq!(series[0].title.as_deref(), Some("Points"));
        assert_eq!(series[0].categories.as_deref(), Some("Sheet1!$A$1:$A$9"));
        assert_eq!(series[0].values.as_deref(), Some("Sheet1!$B$1:$B$9"));
        assert_eq!(chart.x_axis.unwrap().unwrap().position.as_deref(), Some("b"));
        assert_eq!(chart.y_axis.unwrap().unwrap().position.as_deref(), Some("l"));
        assert_eq!(chart.legend, None);
    }

    #[test]
    fn test_class_names() {
        assert_eq!(class_name("barChart"), "BarChart");
        assert_eq!(class_name("line3DChart"), "LineChart3D");
        assert_eq!(class_name("doughnutChart"), "DoughnutChart");
        assert_eq!(class_name("ofPieChart"), "OfPieChart");
    }

    #[test]
    fn test_unreadable_chart_carries_fault() {
        let chart = unreadable_chart("xl/charts/chart1.xml: part missing".to_string());
        assert!(chart.series.is_err());
    }
}

//! Self-contained HTML report: one tab per worksheet, no external assets.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::{display_colors, truncate, PREVIEW_CELLS};
use crate::error::LensResult;
use crate::model::{ImageFormat, Workbook, Worksheet};

const STYLE: &str = r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; background-color: #f5f5f5; padding: 20px; }
.container { max-width: 1400px; margin: 0 auto; background: white; box-shadow: 0 2px 10px rgba(0,0,0,0.1); border-radius: 8px; overflow: hidden; }
header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; }
header h1 { margin-bottom: 10px; }
.metadata { background: #f8f9fa; padding: 20px; border-bottom: 1px solid #dee2e6; }
.metadata-grid, .info-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 15px; }
.metadata-label, .info-label { font-weight: 600; color: #6c757d; font-size: 0.875rem; }
.info-item { background: #f8f9fa; padding: 15px; border-radius: 5px; }
.tabs { display: flex; background: #e9ecef; overflow-x: auto; border-bottom: 2px solid #dee2e6; }
.tab { padding: 15px 25px; cursor: pointer; border: none; background: none; font-size: 1rem; white-space: nowrap; }
.tab.active { background: white; border-bottom: 3px solid #667eea; font-weight: 600; }
.worksheet-content { display: none; padding: 30px; }
.worksheet-content.active { display: block; }
.section { margin-bottom: 30px; }
.section-title { font-size: 1.3rem; color: #495057; border-bottom: 2px solid #667eea; padding-bottom: 10px; margin-bottom: 20px; }
table { width: 100%; border-collapse: collapse; margin-bottom: 20px; font-size: 0.9rem; }
th, td { border: 1px solid #dee2e6; padding: 10px; text-align: left; }
th { background: #667eea; color: white; font-weight: 600; }
tr:nth-child(even) { background: #f8f9fa; }
.list-item { background: #f8f9fa; padding: 10px 15px; margin-bottom: 10px; border-left: 3px solid #667eea; }
.chart-info, .image-info { background: #fff3cd; border: 1px solid #ffc107; padding: 15px; border-radius: 5px; margin-bottom: 15px; }
.swatch { display: inline-block; width: 20px; height: 20px; border: 1px solid #ccc; vertical-align: middle; margin-right: 5px; }
code { background: #f8f9fa; padding: 2px 6px; border-radius: 3px; font-family: 'Courier New', monospace; }
.badge { display: inline-block; padding: 3px 8px; background: #667eea; color: white; border-radius: 12px; font-size: 0.8rem; margin-left: 10px; }
"#;

const SCRIPT: &str = r#"
function showWorksheet(index) {
    document.querySelectorAll('.worksheet-content').forEach(ws => ws.classList.remove('active'));
    const tabs = document.querySelectorAll('.tab');
    tabs.forEach(tab => tab.classList.remove('active'));
    document.getElementById('worksheet-' + index).classList.add('active');
    tabs[index].classList.add('active');
}
"#;

/// Escape text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_html(workbook: &Workbook) -> String {
    let file_name = Path::new(&workbook.file_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| workbook.file_path.clone());

    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>Excel Analysis: {}</title>\n<style>{}</style>\n</head>\n<body>\n\
         <div class=\"container\">\n<header>\n<h1>Excel Workbook Analysis</h1>\n<p>{}</p>\n</header>\n",
        escape(&file_name),
        STYLE,
        escape(&workbook.file_path)
    );

    out.push_str("<div class=\"metadata\"><div class=\"metadata-grid\">\n");
    let props = &workbook.properties;
    let mut meta = vec![
        ("Format", workbook.file_format.as_str().to_uppercase()),
        ("Worksheets", workbook.worksheets.len().to_string()),
    ];
    if let Some(creator) = &props.creator {
        meta.push(("Creator", creator.clone()));
    }
    if let Some(created) = &props.created {
        meta.push(("Created", created.to_string()));
    }
    meta.push(("Analyzer Version", env!("CARGO_PKG_VERSION").to_string()));
    for (label, value) in meta {
        let _ = writeln!(
            out,
            "<div><div class=\"metadata-label\">{}</div><div>{}</div></div>",
            label,
            escape(&value)
        );
    }
    out.push_str("</div></div>\n");

    out.push_str("<div class=\"tabs\">\n");
    for (i, ws) in workbook.worksheets.iter().enumerate() {
        let _ = writeln!(
            out,
            "<button class=\"tab{}\" onclick=\"showWorksheet({})\">{}<span class=\"badge\">{}</span></button>",
            if i == 0 { " active" } else { "" },
            i,
            escape(&ws.name),
            ws.cells.len()
        );
    }
    out.push_str("</div>\n");

    for (i, ws) in workbook.worksheets.iter().enumerate() {
        render_worksheet(&mut out, i, ws);
    }

    let _ = write!(out, "</div>\n<script>{}</script>\n</body>\n</html>\n", SCRIPT);
    out
}

fn render_worksheet(out: &mut String, i: usize, ws: &Worksheet) {
    let _ = writeln!(
        out,
        "<div class=\"worksheet-content{}\" id=\"worksheet-{}\">",
        if i == 0 { " active" } else { "" },
        i
    );

    out.push_str("<div class=\"section\"><h2 class=\"section-title\">Worksheet Overview</h2><div class=\"info-grid\">\n");
    let mut info = vec![
        ("Sheet Name", ws.name.clone()),
        ("Total Cells", ws.cells.len().to_string()),
        ("Sheet State", ws.sheet_state.as_str().to_string()),
    ];
    if let Some(panes) = &ws.freeze_panes {
        info.push(("Freeze Panes", panes.clone()));
    }
    if let Some(filter) = &ws.auto_filter {
        info.push(("Auto Filter", filter.clone()));
    }
    for (label, value) in info {
        let _ = writeln!(
            out,
            "<div class=\"info-item\"><div class=\"info-label\">{}</div><div>{}</div></div>",
            label,
            escape(&value)
        );
    }
    out.push_str("</div></div>\n");

    if !ws.merged_cells.is_empty() {
        let _ = writeln!(
            out,
            "<div class=\"section\"><h3 class=\"section-title\">Merged Cells ({})</h3>",
            ws.merged_cells.len()
        );
        for range in &ws.merged_cells {
            let _ = writeln!(out, "<div class=\"list-item\">{}</div>", escape(range));
        }
        out.push_str("</div>\n");
    }

    if !ws.cells.is_empty() {
        let _ = writeln!(
            out,
            "<div class=\"section\"><h3 class=\"section-title\">Cell Data (First {} cells)</h3>\n\
             <table><thead><tr><th>Cell</th><th>Type</th><th>Value</th><th>Formula</th><th>Format</th><th>Colors</th></tr></thead><tbody>",
            PREVIEW_CELLS
        );
        for cell in ws.cells.iter().take(PREVIEW_CELLS) {
            let (background, font) = display_colors(cell);
            let mut style = String::new();
            if let Some(color) = font {
                let _ = write!(style, "color: {};", escape(color));
            }
            if let Some(color) = background {
                let _ = write!(style, "background-color: {};", escape(color));
            }
            let style_attr = if style.is_empty() {
                String::new()
            } else {
                format!(" style=\"{}\"", style)
            };

            let mut swatches = String::new();
            if let Some(color) = background {
                let _ = write!(
                    swatches,
                    "<span class=\"swatch\" style=\"background-color: {0};\" title=\"Background: {0}\"></span>",
                    escape(color)
                );
            }
            if let Some(color) = font {
                let _ = write!(
                    swatches,
                    "<span class=\"swatch\" style=\"background-color: {0};\" title=\"Font: {0}\"></span>",
                    escape(color)
                );
            }

            let formula = cell
                .formula
                .as_deref()
                .map(|f| format!("<code>{}</code>", escape(&truncate(f, 50))))
                .unwrap_or_default();

            let _ = writeln!(
                out,
                "<tr><td><code>{}</code></td><td>{}</td><td{}>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&cell.coordinate),
                cell.data_type.as_str(),
                style_attr,
                escape(&truncate(&cell.value.to_string(), 50)),
                formula,
                escape(&cell.number_format),
                swatches
            );
        }
        out.push_str("</tbody></table>\n");
        if ws.cells.len() > PREVIEW_CELLS {
            let _ = writeln!(
                out,
                "<p><em>... and {} more cells</em></p>",
                ws.cells.len() - PREVIEW_CELLS
            );
        }
        out.push_str("</div>\n");
    }

    if !ws.charts.is_empty() {
        let _ = writeln!(
            out,
            "<div class=\"section\"><h3 class=\"section-title\">Charts ({})</h3>",
            ws.charts.len()
        );
        for (n, chart) in ws.charts.iter().enumerate() {
            let _ = writeln!(
                out,
                "<div class=\"chart-info\"><strong>Chart {}: {}</strong>",
                n + 1,
                escape(&chart.chart_type)
            );
            if let Some(title) = &chart.title {
                let _ = writeln!(out, "<p><strong>Title:</strong> {}</p>", escape(title));
            }
            let _ = writeln!(out, "<p><strong>Series Count:</strong> {}</p>", chart.series.len());
            for (s, series) in chart.series.iter().enumerate() {
                let _ = writeln!(out, "<div style=\"margin-left: 20px;\"><p><strong>Series {}:</strong></p>", s + 1);
                for (label, value) in [
                    ("Title", &series.title),
                    ("Values", &series.values),
                    ("Categories", &series.categories),
                ] {
                    if let Some(value) = value {
                        let _ = writeln!(out, "<p>{}: <code>{}</code></p>", label, escape(value));
                    }
                }
                out.push_str("</div>\n");
            }
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");
    }

    if !ws.images.is_empty() {
        let _ = writeln!(
            out,
            "<div class=\"section\"><h3 class=\"section-title\">Images ({})</h3>",
            ws.images.len()
        );
        for (n, img) in ws.images.iter().enumerate() {
            let _ = writeln!(
                out,
                "<div class=\"image-info\"><strong>Image {}</strong>\n\
                 <p><strong>Format:</strong> {}</p>\n<p><strong>Size:</strong> {} x {}</p>\n\
                 <p><strong>Anchor:</strong> <code>{}</code></p>",
                n + 1,
                img.format.as_str().to_uppercase(),
                img.width,
                img.height,
                escape(&img.anchor)
            );
            if matches!(img.format, ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif) {
                let _ = writeln!(
                    out,
                    "<p><img src=\"data:{};base64,{}\" alt=\"Image {}\" style=\"max-width: 400px;\"></p>",
                    img.format.mime_type(),
                    img.data,
                    n + 1
                );
            }
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");
    }

    if !ws.data_validations.is_empty() {
        let _ = writeln!(
            out,
            "<div class=\"section\"><h3 class=\"section-title\">Data Validations ({})</h3>",
            ws.data_validations.len()
        );
        for dv in &ws.data_validations {
            let _ = write!(
                out,
                "<div class=\"list-item\"><strong>Range:</strong> <code>{}</code><br><strong>Type:</strong> {}",
                escape(&dv.sqref),
                escape(&dv.validation_type)
            );
            if let Some(formula) = &dv.formula1 {
                let _ = write!(out, "<br><strong>Formula:</strong> <code>{}</code>", escape(formula));
            }
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");
    }

    if !ws.conditional_formatting.is_empty() {
        let _ = writeln!(
            out,
            "<div class=\"section\"><h3 class=\"section-title\">Conditional Formatting ({})</h3>",
            ws.conditional_formatting.len()
        );
        for cf in &ws.conditional_formatting {
            let _ = writeln!(
                out,
                "<div class=\"list-item\"><strong>Range:</strong> <code>{}</code><br><strong>Type:</strong> {}<br><strong>Priority:</strong> {}</div>",
                escape(&cf.sqref),
                escape(&cf.rule_type),
                cf.priority
            );
        }
        out.push_str("</div>\n");
    }

    out.push_str("</div>\n");
}

pub fn write_html(workbook: &Workbook, path: &Path) -> LensResult<()> {
    fs::write(path, render_html(workbook))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, CellValue, SourceFormat};

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_report_has_one_tab_per_sheet_and_escapes_values() {
        let mut first = Worksheet::new("P&L", 0);
        first.cells.push(Cell {
            coordinate: "A1".to_string(),
            row: 1,
            column: 1,
            column_letter: "A".to_string(),
            value: CellValue::Text("<script>".to_string()),
            data_type: crate::model::DataType::String,
            number_format: "General".to_string(),
            formula: None,
            calculated_value: None,
            is_merged: false,
            formatting: None,
            hyperlink: None,
            comment: None,
        });
        let workbook = Workbook {
            file_path: "/data/q1.xlsx".to_string(),
            file_format: SourceFormat::Modern,
            properties: Default::default(),
            worksheets: vec![first, Worksheet::new("Notes", 1)],
            defined_names: vec![],
            active_sheet_index: 0,
            calculation_mode: Default::default(),
        };

        let html = render_html(&workbook);
        assert!(html.contains("<title>Excel Analysis: q1.xlsx</title>"));
        assert_eq!(html.matches("onclick=\"showWorksheet(").count(), 2);
        assert!(html.contains("id=\"worksheet-1\""));
        assert!(html.contains("P&amp;L"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<td><script>"));
    }
}

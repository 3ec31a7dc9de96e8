use std::fmt::Write;

use serde_json::{json, Value};

use crate::config::Basis;
use crate::models::{CurveType, Summary};
use crate::pipeline::Analysis;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const EXCEED_COLOR: &str = "#d62728";
const NORMAL_COLOR: &str = "#1f77b4";

/// Layout choices for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub title: String,
    pub x_axis_title: String,
    pub tick_angle: i32,
}

impl ChartOptions {
    pub fn for_curve(curve: CurveType, basis: Basis, title: Option<String>) -> Self {
        let (default_title, x_axis_title) = match (curve, basis) {
            (CurveType::Weekly, Basis::Onset) => (
                "Food Poisoning Epidemic Curve (Weekly, Onset-based)",
                "Epidemiological Week (Onset)",
            ),
            (CurveType::Weekly, Basis::Notification) => (
                "Food Poisoning Epidemic Curve (Weekly)",
                "Epidemiological Week (Notification)",
            ),
            (CurveType::Daily, _) => (
                "Food Poisoning Epidemic Curve (Date of Onset)",
                "Date of Onset",
            ),
        };
        Self {
            title: title.unwrap_or_else(|| default_title.to_string()),
            x_axis_title: x_axis_title.to_string(),
            tick_angle: match curve {
                CurveType::Weekly => 45,
                CurveType::Daily => 0,
            },
        }
    }
}

/// Plotly figure: case bars plus constant mean, alert and action lines.
pub fn figure(analysis: &Analysis, options: &ChartOptions) -> Value {
    let x: Vec<&str> = analysis.series.iter().map(|b| b.label.as_str()).collect();
    let y: Vec<u64> = analysis.series.iter().map(|b| b.count).collect();
    let colors: Vec<&str> = analysis
        .series
        .iter()
        .map(|b| if b.exceeds_action { EXCEED_COLOR } else { NORMAL_COLOR })
        .collect();
    let thresholds = &analysis.thresholds;
    let constant = |value: f64| vec![value; x.len()];

    json!({
        "data": [
            {
                "x": x,
                "y": y,
                "type": "bar",
                "name": "Cases",
                "marker": { "color": colors },
                "text": y,
                "textposition": "outside",
                "textfont": { "size": 10 }
            },
            {
                "x": x,
                "y": constant(thresholds.mean),
                "mode": "lines",
                "name": "Mean",
                "line": { "color": "green" }
            },
            {
                "x": x,
                "y": constant(thresholds.alert_line),
                "mode": "lines",
                "name": "Alert (Mean + 1 SD)",
                "line": { "color": "orange", "dash": "dash" }
            },
            {
                "x": x,
                "y": constant(thresholds.action_line),
                "mode": "lines",
                "name": "Action (Mean + 2 SD)",
                "line": { "color": "red", "dash": "dot" }
            }
        ],
        "layout": {
            "title": { "text": options.title, "x": 0.5 },
            "xaxis": { "title": options.x_axis_title, "tickangle": options.tick_angle },
            "yaxis": { "title": "Number of cases" },
            "margin": { "t": 120 }
        }
    })
}

pub fn summary_display(visible: bool) -> &'static str {
    if visible {
        "block"
    } else {
        "none"
    }
}

fn summary_markup(summary: &Summary) -> String {
    format!(
        "<b>English:</b> {}<br><br><b>Bahasa Melayu:</b> {}",
        escape_html(&summary.en),
        escape_html(&summary.bm)
    )
}

fn escape_html(text: &str) -> String {
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

/// Standalone page with the chart and a toggleable summary box.
pub fn render_html(
    analysis: &Analysis,
    options: &ChartOptions,
    show_summary: bool,
) -> Result<String, serde_json::Error> {
    let figure = serde_json::to_string(&figure(analysis, options))?.replace("</", "<\\/");
    let checked = if show_summary { " checked" } else { "" };

    let mut page = String::new();
    let _ = writeln!(page, "<!DOCTYPE html>");
    let _ = writeln!(page, "<html lang=\"en\">");
    let _ = writeln!(page, "<head>");
    let _ = writeln!(page, "<meta charset=\"utf-8\">");
    let _ = writeln!(page, "<title>{}</title>", escape_html(&options.title));
    let _ = writeln!(page, "<script src=\"{PLOTLY_CDN}\"></script>");
    let _ = writeln!(page, "</head>");
    let _ = writeln!(page, "<body>");
    let _ = writeln!(page, "<div id=\"chart\"></div>");
    let _ = writeln!(
        page,
        "<label><input type=\"checkbox\" id=\"toggleSummary\"{checked}> Show summary</label>"
    );
    let _ = writeln!(
        page,
        "<div id=\"summaryBox\" style=\"display: {}\">{}</div>",
        summary_display(show_summary),
        summary_markup(&analysis.summary)
    );
    let _ = writeln!(page, "<script>");
    let _ = writeln!(page, "const figure = {figure};");
    let _ = writeln!(
        page,
        "Plotly.newPlot(\"chart\", figure.data, figure.layout);"
    );
    let _ = writeln!(
        page,
        "const toggle = document.getElementById(\"toggleSummary\");"
    );
    let _ = writeln!(page, "toggle.onchange = () => {{");
    let _ = writeln!(
        page,
        "  document.getElementById(\"summaryBox\").style.display = toggle.checked ? \"block\" : \"none\";"
    );
    let _ = writeln!(page, "}};");
    let _ = writeln!(page, "</script>");
    let _ = writeln!(page, "</body>");
    let _ = writeln!(page, "</html>");

    Ok(page)
}

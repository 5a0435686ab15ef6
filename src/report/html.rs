//! HTML report generation
//!
//! The report is a single self-contained file: inline CSS, inline SVG charts
//! and the long-format data embedded as JSON.

use super::{ChartSection, Report};

/// Escape text for interpolation into HTML.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Render the whole report as an HTML document.
pub fn render_html(report: &Report) -> String {
    let sections: String = report.sections.iter().map(render_section).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        <p class="meta">Generated {generated} from the Stack Overflow Developer Survey, {years}.</p>
        {respondents}
        {sections}
    </div>
    <script type="application/json" id="survey-data">{data}</script>
</body>
</html>"#,
        title = escape_html(&report.title),
        css = inline_css(),
        generated = report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        years = render_year_span(report),
        respondents = render_respondents(report),
        sections = sections,
        // keep the JSON from closing the script element early
        data = report.data_json.replace("</", "<\\/"),
    )
}

fn render_year_span(report: &Report) -> String {
    let first = report.respondents.keys().next();
    let last = report.respondents.keys().next_back();
    match (first, last) {
        (Some(a), Some(b)) if a == b => a.to_string(),
        (Some(a), Some(b)) => format!("{}–{}", a, b),
        _ => "no years".to_string(),
    }
}

fn render_respondents(report: &Report) -> String {
    let rows: String = report
        .respondents
        .iter()
        .map(|(year, n)| format!("<tr><td>{}</td><td class=\"num\">{}</td></tr>", year, n))
        .collect();
    format!(
        r#"<section>
            <h2>Respondents per year</h2>
            <table><thead><tr><th>Year</th><th>Respondents</th></tr></thead><tbody>{}</tbody></table>
        </section>"#,
        rows
    )
}

fn render_section(section: &ChartSection) -> String {
    let latest: String = section
        .latest
        .iter()
        .map(|(cat, pct)| {
            format!(
                "<tr><td>{}</td><td class=\"num\">{:.1}%</td></tr>",
                escape_html(cat),
                pct
            )
        })
        .collect();

    format!(
        r#"<section id="{id}">
            <h2>{title}</h2>
            <div class="chart">{svg}</div>
            <details><summary>Latest year ({year})</summary>
                <table><thead><tr><th>Answer</th><th>Share</th></tr></thead><tbody>{latest}</tbody></table>
            </details>
        </section>"#,
        id = escape_html(&section.column),
        title = escape_html(&section.title),
        svg = section.svg,
        year = section.latest_year,
        latest = latest,
    )
}

fn inline_css() -> &'static str {
    r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 0; background: #f6f7f9; color: #1f2328; }
.container { max-width: 1040px; margin: 0 auto; padding: 24px; }
h1 { margin-bottom: 4px; }
.meta { color: #59636e; margin-top: 0; }
section { background: #fff; border: 1px solid #d1d9e0; border-radius: 6px; padding: 16px 20px; margin: 20px 0; }
.chart svg { width: 100%; height: auto; }
table { border-collapse: collapse; margin-top: 8px; }
th, td { padding: 4px 12px; border-bottom: 1px solid #eaeef2; text-align: left; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
summary { cursor: pointer; color: #0969da; }
"#
}

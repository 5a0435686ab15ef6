// src/report/mod.rs
pub mod chart;
pub mod export;
pub mod html;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::{info, warn};

use crate::config::Settings;
use crate::process::aggregate::LongTable;

/// One question's chart plus its latest-year figures.
#[derive(Debug, Clone)]
pub struct ChartSection {
    pub column: String,
    pub title: String,
    pub svg: String,
    pub latest_year: u16,
    /// `(category, percentage)` for the charted categories in `latest_year`
    pub latest: Vec<(String, f64)>,
}

/// Everything the HTML page shows.
#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub respondents: BTreeMap<u16, u64>,
    pub sections: Vec<ChartSection>,
    /// The long table as JSON, embedded for reuse.
    pub data_json: String,
}

/// Chart every configured question that has data.
pub fn build_report(table: &LongTable, settings: &Settings) -> Result<Report> {
    let years = table.years();
    let mut sections = Vec::with_capacity(settings.questions.len());

    for q in &settings.questions {
        let series = table.series(&q.column, settings.top_categories);
        if series.is_empty() {
            warn!(question = %q.column, "no data for question, leaving it out of the report");
            continue;
        }

        let svg = chart::render_line_chart(&q.title, &series, &years)
            .with_context(|| format!("drawing chart for {}", q.column))?;

        let latest_year = series
            .iter()
            .filter_map(|s| s.points.last().map(|(y, _)| *y))
            .max()
            .unwrap_or_default();
        let latest = series
            .iter()
            .filter_map(|s| {
                s.points
                    .iter()
                    .find(|(y, _)| *y == latest_year)
                    .map(|(_, p)| (s.category.clone(), *p))
            })
            .collect();

        sections.push(ChartSection {
            column: q.column.clone(),
            title: q.title.clone(),
            svg,
            latest_year,
            latest,
        });
    }

    let data_json = serde_json::to_string(table.rows()).context("serializing long table")?;

    Ok(Report {
        title: "Stack Overflow Developer Survey trends".to_string(),
        generated_at: Utc::now(),
        respondents: table.respondents_by_year().clone(),
        sections,
        data_json,
    })
}

/// Write `html` to `path`, creating parent directories.
pub fn write_report(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    fs::write(path, html).with_context(|| format!("writing report {}", path.display()))?;
    info!(path = %path.display(), bytes = html.len(), "wrote report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Denominator;
    use crate::process::aggregate::aggregate_percentages;
    use crate::process::dummies::encode_multi_select;
    use tempfile::tempdir;

    fn table() -> LongTable {
        let na = vec!["NA".to_string()];
        let mut t = LongTable::new();
        for (year, values) in [
            (2020u16, vec!["Rust;Go", "Go", "NA"]),
            (2021u16, vec!["Rust", "Rust;Go", "Python"]),
        ] {
            let ind = encode_multi_select(&values, ";", &na, &BTreeMap::new());
            t.push_year(
                year,
                values.len() as u64,
                aggregate_percentages(
                    year,
                    "LanguageHaveWorkedWith",
                    &ind,
                    Denominator::AllRespondents,
                ),
            );
        }
        t
    }

    #[test]
    fn builds_sections_for_questions_with_data() {
        let mut settings = Settings::load(None).unwrap();
        settings.top_categories = 2;

        let report = build_report(&table(), &settings).unwrap();

        assert_eq!(report.sections.len(), 1);
        let s = &report.sections[0];
        assert_eq!(s.column, "LanguageHaveWorkedWith");
        assert_eq!(s.latest_year, 2021);
        assert_eq!(s.latest[0].0, "Rust");
        assert_eq!(report.respondents.get(&2020), Some(&3));
        assert!(report.data_json.contains("\"category\":\"Go\""));
    }

    #[test]
    fn write_report_creates_parent_dirs() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("report.html");
        write_report(&path, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }
}

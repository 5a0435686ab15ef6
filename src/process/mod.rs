// src/process/mod.rs
pub mod aggregate;
pub mod dummies;
pub mod raw_table;
pub mod utils;

use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;
use glob::{glob, Pattern};
use rayon::prelude::*;
use std::{
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, info};

use crate::config::Settings;
use crate::schema::{get_rename_dict, get_report_cols_subset, safe_rename};
use aggregate::{aggregate_percentages, LongTable, PercentRow};
use dummies::encode_multi_select;
use raw_table::SurveyTable;

/// Find `file_name` anywhere below the extracted year directory.
pub fn locate_results_csv(year_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let pattern = format!(
        "{}/**/{}",
        Pattern::escape(&year_dir.to_string_lossy()),
        Pattern::escape(file_name)
    );
    let mut hits: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("bad glob pattern {}", pattern))?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    hits.sort();
    hits.into_iter()
        .next()
        .ok_or_else(|| anyhow!("no {} under {}", file_name, year_dir.display()))
}

/// Read one year's results file.
///
/// The header row is renamed to canonical names with [`safe_rename`], the
/// report columns are picked with [`get_report_cols_subset`], and only those
/// columns are kept while the rows are streamed in.
#[tracing::instrument(level = "info", skip(path, settings), fields(path = %path.display()))]
pub fn load_survey_year(path: &Path, year: u16, settings: &Settings) -> Result<SurveyTable> {
    let renames = get_rename_dict(settings, year)?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open results file: {}", path.display()))?;

    let headers: Vec<String> = rdr
        .byte_headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .iter()
        .map(|h| {
            String::from_utf8_lossy(h)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_string()
        })
        .collect();

    let mut header_table = SurveyTable::new(year, headers);
    safe_rename(&mut header_table, &renames)
        .with_context(|| format!("renaming {} columns", year))?;

    let subset = get_report_cols_subset(
        &header_table,
        &settings.respondent_column,
        &settings.questions,
    )?;
    let indices = subset
        .iter()
        .map(|c| header_table.column_index(c))
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| anyhow!("report column vanished from {} header", year))?;
    debug!(year, columns = ?subset, "projecting report columns");

    let mut table = SurveyTable::new(year, subset);
    for (idx, result) in rdr.byte_records().enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        let row = indices
            .iter()
            .map(|&i| String::from_utf8_lossy(record.get(i).unwrap_or(b"")).into_owned())
            .collect();
        table.rows.push(row);
    }

    Ok(table)
}

/// The percentages one survey year contributes to the report.
#[derive(Debug, Clone)]
pub struct YearResult {
    pub year: u16,
    pub respondents: u64,
    pub rows: Vec<PercentRow>,
}

/// Locate, load, encode and aggregate one cached survey year.
pub fn process_year(settings: &Settings, year: u16) -> Result<YearResult> {
    let start = Instant::now();
    let schema = settings
        .year_schema(year)
        .ok_or_else(|| anyhow!("no column mapping configured for survey year {}", year))?;

    let year_dir = settings.year_dir(year);
    if !year_dir.is_dir() {
        bail!(
            "survey year {} is not cached at {}",
            year,
            year_dir.display()
        );
    }
    let csv_path = locate_results_csv(&year_dir, &settings.results_file)?;
    let table = load_survey_year(&csv_path, year, settings)?;

    let mut rows = Vec::new();
    for q in &settings.questions {
        let Some(values) = table.column(&q.column) else {
            continue;
        };
        let indicators =
            encode_multi_select(&values, &schema.delimiter, &settings.na_values, &q.aliases);
        debug!(
            year,
            question = %q.column,
            categories = indicators.categories.len(),
            answered = indicators.answered_count(),
            "encoded question"
        );
        rows.extend(aggregate_percentages(
            year,
            &q.column,
            &indicators,
            settings.denominator,
        ));
    }

    info!(
        year,
        respondents = table.len(),
        rows = rows.len(),
        elapsed = ?start.elapsed(),
        "processed survey year"
    );
    Ok(YearResult {
        year,
        respondents: table.len() as u64,
        rows,
    })
}

/// Process every report year in parallel and merge into one long table.
pub fn process_years(settings: &Settings) -> Result<LongTable> {
    let years = settings.report_years();
    let results = years
        .par_iter()
        .map(|&year| process_year(settings, year).with_context(|| format!("survey year {}", year)))
        .collect::<Result<Vec<_>>>()?;

    let mut table = LongTable::new();
    for r in results {
        table.push_year(r.year, r.respondents, r.rows);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn settings_for(cache: &Path) -> Settings {
        let mut settings = Settings::load(None).unwrap();
        settings.cache_dir = cache.display().to_string();
        settings.min_report_year = 2019;
        settings.max_survey_year = 2021;
        settings
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn locates_nested_results_file() {
        let tmp = tempdir().unwrap();
        let nested = tmp.path().join("2018").join("developer_survey_2018");
        write(&nested.join("survey_results_public.csv"), "a\n");
        write(&nested.join("survey_results_schema.csv"), "a\n");

        let found = locate_results_csv(&tmp.path().join("2018"), "survey_results_public.csv")
            .unwrap();
        assert_eq!(found, nested.join("survey_results_public.csv"));
        assert!(locate_results_csv(tmp.path(), "missing.csv").is_err());
    }

    #[test]
    fn load_renames_and_projects() {
        let tmp = tempdir().unwrap();
        let mut settings = settings_for(tmp.path());
        let schema = settings.years.iter_mut().find(|y| y.year == 2019).unwrap();
        schema.columns = [
            ("ResponseId", "Respondent"),
            ("LanguageHaveWorkedWith", "LanguageWorkedWith"),
            ("DatabaseHaveWorkedWith", "DatabaseWorkedWith"),
        ]
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();
        let path = tmp.path().join("2019.csv");
        write(
            &path,
            "\u{feff}Respondent,Country,LanguageWorkedWith,DatabaseWorkedWith\n\
             1,Norway,Rust;Go,PostgreSQL\n\
             2,Chile,\"C#;SQL\",NA\n",
        );

        let table = load_survey_year(&path, 2019, &settings).unwrap();

        assert_eq!(
            table.headers,
            vec![
                "ResponseId",
                "LanguageHaveWorkedWith",
                "DatabaseHaveWorkedWith"
            ]
        );
        assert_eq!(table.rows[1], vec!["2", "C#;SQL", "NA"]);
        assert_eq!(table.year, 2019);
    }

    #[test]
    fn load_fails_when_renamed_column_missing() {
        let tmp = tempdir().unwrap();
        let settings = settings_for(tmp.path());
        let path = tmp.path().join("2019.csv");
        write(&path, "Respondent,Country\n1,Norway\n");

        let err = load_survey_year(&path, 2019, &settings).unwrap_err();
        assert!(format!("{:#}", err).contains("not in table"));
    }

    #[test]
    fn process_year_produces_percentages() {
        let tmp = tempdir().unwrap();
        let settings = settings_for(tmp.path());
        write(
            &tmp.path().join("2021").join("survey_results_public.csv"),
            "ResponseId,LanguageHaveWorkedWith,DatabaseHaveWorkedWith\n\
             1,Rust;Bash/Shell,SQLite\n\
             2,Rust,NA\n\
             3,NA,SQLite\n\
             4,Go,PostgreSQL\n",
        );

        let result = process_year(&settings, 2021).unwrap();
        assert_eq!(result.respondents, 4);

        let rust = result
            .rows
            .iter()
            .find(|r| r.question == "LanguageHaveWorkedWith" && r.category == "Rust")
            .unwrap();
        assert_eq!(rust.selected, 2);
        assert!((rust.percentage - 50.0).abs() < 1e-9);

        // alias from the default config
        assert!(result
            .rows
            .iter()
            .any(|r| r.category == "Bash/Shell/PowerShell"));
        assert!(result.rows.iter().all(|r| r.respondents == 4));
    }

    #[test]
    fn process_year_requires_cache() {
        let tmp = tempdir().unwrap();
        let settings = settings_for(tmp.path());
        assert!(process_year(&settings, 2020).is_err());
    }
}

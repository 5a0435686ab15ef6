// src/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// The run configuration shipped with the binary.
pub const DEFAULT_CONFIG: &str = include_str!("../config/survey.yaml");

/// Which respondents a category percentage is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Denominator {
    /// Every row of the year's results file.
    #[default]
    AllRespondents,
    /// Only rows with a non-empty answer to the question.
    Answered,
}

/// Per-year layout of the results file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSchema {
    pub year: u16,
    /// Separator between answers in a multi-select cell.
    pub delimiter: String,
    /// canonical column → column name in that year's file
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
}

/// A multi-select question that gets a chart in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Canonical column name (after renaming).
    pub column: String,
    pub title: String,
    /// answer as written in some year → answer used in the report
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub first_download_year: u16,
    pub max_survey_year: u16,
    pub min_report_year: u16,
    pub cache_dir: String,
    pub output_html: String,
    #[serde(default)]
    pub export_csv: Option<String>,
    #[serde(default)]
    pub export_parquet: Option<String>,
    pub url_template: String,
    pub results_file: String,
    pub download_concurrency: usize,
    pub top_categories: usize,
    #[serde(default)]
    pub denominator: Denominator,
    #[serde(default)]
    pub na_values: Vec<String>,
    pub respondent_column: String,
    pub years: Vec<YearSchema>,
    pub questions: Vec<Question>,
}

impl Settings {
    /// Parse settings from a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(text).context("parsing settings YAML")?;
        Ok(settings)
    }

    /// Load `path` if given, otherwise the embedded defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                Self::from_yaml(&text).with_context(|| format!("in config {}", p.display()))
            }
            None => Self::from_yaml(DEFAULT_CONFIG),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_download_year > self.max_survey_year {
            bail!(
                "first_download_year {} is after max_survey_year {}",
                self.first_download_year,
                self.max_survey_year
            );
        }
        if self.min_report_year > self.max_survey_year {
            bail!(
                "min_report_year {} is after max_survey_year {}",
                self.min_report_year,
                self.max_survey_year
            );
        }
        if !self.url_template.contains("{year}") {
            bail!("url_template must contain a {{year}} placeholder");
        }
        if self.download_concurrency == 0 {
            bail!("download_concurrency must be at least 1");
        }
        if self.top_categories == 0 {
            bail!("top_categories must be at least 1");
        }
        if self.respondent_column.trim().is_empty() {
            bail!("respondent_column must not be empty");
        }
        for q in &self.questions {
            if q.column.trim().is_empty() {
                bail!("question `{}` has an empty column name", q.title);
            }
        }
        Ok(())
    }

    pub fn year_schema(&self, year: u16) -> Option<&YearSchema> {
        self.years.iter().find(|y| y.year == year)
    }

    pub fn download_years(&self) -> impl Iterator<Item = u16> {
        self.first_download_year..=self.max_survey_year
    }

    pub fn report_years(&self) -> Vec<u16> {
        (self.min_report_year..=self.max_survey_year).collect()
    }

    pub fn cache_dir(&self) -> PathBuf {
        get_full_path(&self.cache_dir)
    }

    pub fn year_dir(&self, year: u16) -> PathBuf {
        self.cache_dir().join(year.to_string())
    }

    pub fn output_html(&self) -> PathBuf {
        get_full_path(&self.output_html)
    }

    pub fn export_csv(&self) -> Option<PathBuf> {
        self.export_csv.as_deref().map(get_full_path)
    }

    pub fn export_parquet(&self) -> Option<PathBuf> {
        self.export_parquet.as_deref().map(get_full_path)
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn get_full_path(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses_and_validates() {
        let settings = Settings::load(None).unwrap();
        settings.validate().unwrap();

        assert_eq!(settings.max_survey_year, 2022);
        assert_eq!(settings.denominator, Denominator::AllRespondents);
        for year in settings.report_years() {
            assert!(
                settings.year_schema(year).is_some(),
                "no schema entry for report year {}",
                year
            );
        }
        assert_eq!(settings.year_schema(2017).unwrap().delimiter, "; ");
    }

    #[test]
    fn validate_rejects_inverted_year_range() {
        let mut settings = Settings::load(None).unwrap();
        settings.min_report_year = settings.max_survey_year + 1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_template_without_placeholder() {
        let mut settings = Settings::load(None).unwrap();
        settings.url_template = "https://example.com/survey.zip".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_counts() {
        let mut settings = Settings::load(None).unwrap();
        settings.top_categories = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("top_categories"));

        let mut settings = Settings::load(None).unwrap();
        settings.download_concurrency = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = std::env::var_os("HOME") else {
            return;
        };
        let p = get_full_path("~/Documents/data/");
        assert_eq!(p, PathBuf::from(home).join("Documents/data/"));
        assert_eq!(get_full_path("/abs/path"), PathBuf::from("/abs/path"));
    }
}

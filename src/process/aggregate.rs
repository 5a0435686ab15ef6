//! Indicator columns → "percentage of respondents per category and year".

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::dummies::IndicatorColumns;
use crate::config::Denominator;

/// One long-format record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentRow {
    pub year: u16,
    pub question: String,
    pub category: String,
    /// Respondents that picked `category`.
    pub selected: u64,
    /// Respondents the percentage is taken over.
    pub respondents: u64,
    pub percentage: f64,
}

/// A category's line in a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub category: String,
    /// `(year, percentage)`, ascending by year
    pub points: Vec<(u16, f64)>,
}

/// Percentages for every category of one question in one year.
pub fn aggregate_percentages(
    year: u16,
    question: &str,
    indicators: &IndicatorColumns,
    denominator: Denominator,
) -> Vec<PercentRow> {
    let respondents = match denominator {
        Denominator::AllRespondents => indicators.rows(),
        Denominator::Answered => indicators.answered_count(),
    } as u64;

    indicators
        .categories
        .iter()
        .zip(indicators.selected_counts())
        .map(|(category, selected)| {
            let selected = selected as u64;
            let percentage = if respondents == 0 {
                0.0
            } else {
                100.0 * selected as f64 / respondents as f64
            };
            PercentRow {
                year,
                question: question.to_string(),
                category: category.clone(),
                selected,
                respondents,
                percentage,
            }
        })
        .collect()
}

/// Every year's percentages, plus the respondent count of each year.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LongTable {
    rows: Vec<PercentRow>,
    respondents: BTreeMap<u16, u64>,
}

impl LongTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one year's rows. Rows stay sorted by (year, question, category).
    pub fn push_year(&mut self, year: u16, respondents: u64, rows: Vec<PercentRow>) {
        self.respondents.insert(year, respondents);
        self.rows.extend(rows);
        self.rows.sort_by(|a, b| {
            (a.year, &a.question, &a.category).cmp(&(b.year, &b.question, &b.category))
        });
    }

    pub fn rows(&self) -> &[PercentRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn respondents_by_year(&self) -> &BTreeMap<u16, u64> {
        &self.respondents
    }

    pub fn years(&self) -> Vec<u16> {
        self.respondents.keys().copied().collect()
    }

    /// Questions with at least one row, sorted.
    pub fn questions(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.question.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Per-category series for `question`, restricted to the `top_n`
    /// categories with the highest percentage in the latest year the
    /// question was asked. Ties go to the alphabetically first category.
    ///
    /// A category nobody picked in a year the question was asked gets a 0%
    /// point for that year.
    pub fn series(&self, question: &str, top_n: usize) -> Vec<Series> {
        let mut by_category: BTreeMap<&str, Vec<(u16, f64)>> = BTreeMap::new();
        let mut asked: BTreeSet<u16> = BTreeSet::new();
        for r in self.rows.iter().filter(|r| r.question == question) {
            by_category
                .entry(r.category.as_str())
                .or_default()
                .push((r.year, r.percentage));
            asked.insert(r.year);
        }
        let Some(&latest_year) = asked.last() else {
            return Vec::new();
        };
        for pts in by_category.values_mut() {
            for &year in &asked {
                if !pts.iter().any(|(y, _)| *y == year) {
                    pts.push((year, 0.0));
                }
            }
        }

        let mut ranked: Vec<(&str, f64)> = by_category
            .iter()
            .map(|(cat, pts)| {
                let latest = pts
                    .iter()
                    .find(|(y, _)| *y == latest_year)
                    .map(|(_, p)| *p)
                    .unwrap_or(0.0);
                (*cat, latest)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        ranked
            .into_iter()
            .take(top_n)
            .map(|(cat, _)| {
                let mut points = by_category[cat].clone();
                points.sort_by_key(|(y, _)| *y);
                Series {
                    category: cat.to_string(),
                    points,
                }
            })
            .collect()
    }
}

//! Year-to-year column drift: which raw column holds which canonical
//! question, and which canonical columns a year can report on.

use anyhow::{anyhow, bail, Result};
use tracing::{debug, warn};

use super::types::RenameMap;
use crate::config::{Question, Settings};
use crate::process::raw_table::SurveyTable;

/// Build the `raw name → canonical name` renames for `year`.
/// Columns whose raw name already is the canonical one are left out.
pub fn get_rename_dict(settings: &Settings, year: u16) -> Result<RenameMap> {
    let schema = settings
        .year_schema(year)
        .ok_or_else(|| anyhow!("no column mapping configured for survey year {}", year))?;

    let renames: RenameMap = schema
        .columns
        .iter()
        .filter(|(canonical, raw)| canonical != raw)
        .map(|(canonical, raw)| (raw.clone(), canonical.clone()))
        .collect();

    debug!(year, renames = renames.len(), "built rename dict");
    Ok(renames)
}

/// Columns of an already renamed `table` that the report uses: the
/// respondent id followed by every question column the year has, in
/// question order. Questions missing from the year are skipped.
pub fn get_report_cols_subset(
    table: &SurveyTable,
    respondent_column: &str,
    questions: &[Question],
) -> Result<Vec<String>> {
    if !table.has_column(respondent_column) {
        bail!(
            "respondent column `{}` missing from {} results",
            respondent_column,
            table.year
        );
    }

    let mut cols = vec![respondent_column.to_string()];
    for q in questions {
        if cols.contains(&q.column) {
            continue;
        }
        if table.has_column(&q.column) {
            cols.push(q.column.clone());
        } else {
            warn!(year = table.year, column = %q.column, "question not asked this year, skipping");
        }
    }
    Ok(cols)
}

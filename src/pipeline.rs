// src/pipeline.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::time::Instant;
use tracing::info;

use crate::config::Settings;
use crate::process::aggregate::LongTable;
use crate::{fetch, process, report};

/// Where a finished run left its outputs.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub fetched_years: Vec<u16>,
    pub report_years: Vec<u16>,
    pub rows: usize,
    pub charts: usize,
}

/// Download what is missing, then build and write the report.
pub async fn run(client: &Client, settings: &Settings) -> Result<RunSummary> {
    let start = Instant::now();
    let fetched_years = fetch::download_and_extract_raw_data(client, settings).await?;
    info!(fetched = fetched_years.len(), "survey archives ready");

    let settings_owned = settings.clone();
    let (table, charts) = tokio::task::spawn_blocking(move || build_outputs(&settings_owned))
        .await
        .context("report task panicked")??;

    info!(elapsed = ?start.elapsed(), "all done");
    Ok(RunSummary {
        fetched_years,
        report_years: table.years(),
        rows: table.rows().len(),
        charts,
    })
}

/// Process the cached years and write the HTML report plus any exports.
/// Returns the long table and the number of charts drawn.
pub fn build_outputs(settings: &Settings) -> Result<(LongTable, usize)> {
    let table = process::process_years(settings)?;
    info!(
        years = table.years().len(),
        rows = table.rows().len(),
        "aggregated survey answers"
    );

    let built = report::build_report(&table, settings)?;
    let html = report::html::render_html(&built);
    report::write_report(&settings.output_html(), &html)?;

    if let Some(path) = settings.export_csv() {
        report::export::write_long_csv(&path, table.rows())?;
    }
    if let Some(path) = settings.export_parquet() {
        report::export::write_long_parquet(&path, table.rows())?;
    }

    Ok((table, built.sections.len()))
}

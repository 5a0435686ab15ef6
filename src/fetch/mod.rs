// src/fetch/mod.rs
//! Downloading and caching of the yearly survey archives.

pub mod urls;
pub mod zips;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use std::{fs, sync::Arc};
use tokio::{sync::Semaphore, time::Instant};
use tracing::{debug, error, info};

use crate::config::Settings;

/// Download and extract every survey year that is not cached yet.
///
/// A year counts as cached when `<cache_dir>/<year>/` exists. Downloads run
/// concurrently, at most `download_concurrency` at a time. Any failed year
/// fails the whole call once all downloads have settled.
///
/// Returns the years that were fetched by this call.
pub async fn download_and_extract_raw_data(client: &Client, settings: &Settings) -> Result<Vec<u16>> {
    let cache_dir = settings.cache_dir();
    fs::create_dir_all(&cache_dir)
        .with_context(|| format!("creating cache directory {}", cache_dir.display()))?;

    let sem = Arc::new(Semaphore::new(settings.download_concurrency));
    let mut handles = Vec::new();
    let mut failed = Vec::new();

    for year in settings.download_years() {
        let out_dir = settings.year_dir(year);

        // don't re-download if we already have it
        if out_dir.exists() {
            debug!(year, "already cached");
            continue;
        }

        let url = match urls::survey_zip_url(&settings.url_template, year) {
            Ok(url) => url,
            Err(e) => {
                error!(year, "bad archive url: {:#}", e);
                failed.push(format!("{}: {:#}", year, e));
                continue;
            }
        };
        let client = client.clone();
        let sem = sem.clone();

        handles.push((
            year,
            tokio::spawn(async move {
                let _permit = sem.acquire_owned().await?;
                info!(year, url = %url, "downloading");
                let start = Instant::now();

                let bytes = zips::download_zip(&client, &url).await?;
                let files =
                    tokio::task::spawn_blocking(move || zips::extract_zip(&bytes, &out_dir))
                        .await??;

                info!(
                    year,
                    files,
                    elapsed = ?start.elapsed(),
                    "done downloading and extracting survey results for {}",
                    year
                );
                Ok::<_, anyhow::Error>(year)
            }),
        ));
    }

    if handles.is_empty() && failed.is_empty() {
        info!("all survey years already cached");
        return Ok(Vec::new());
    }

    let mut fetched = Vec::with_capacity(handles.len());
    for (year, handle) in handles {
        match handle.await {
            Ok(Ok(y)) => fetched.push(y),
            Ok(Err(e)) => {
                error!(year, "download failed: {:#}", e);
                failed.push(format!("{}: {:#}", year, e));
            }
            Err(e) => {
                error!(year, "download task panicked or was cancelled: {}", e);
                failed.push(format!("{}: {}", year, e));
            }
        }
    }

    if !failed.is_empty() {
        bail!("{} survey year(s) failed:\n{}", failed.len(), failed.join("\n"));
    }

    fetched.sort_unstable();
    Ok(fetched)
}

// src/fetch/zips.rs
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};
use tracing::debug;
use url::Url;
use zip::ZipArchive;

/// GET the archive at `url` into memory.
pub async fn download_zip(client: &Client, url: &Url) -> Result<Vec<u8>> {
    let resp = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?;
    if !resp.status().is_success() {
        return Err(anyhow!(
            "The following zip file url failed to download: {} ({})",
            url,
            resp.status()
        ));
    }
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    debug!(url = %url, size = bytes.len(), "downloaded archive");
    Ok(bytes.to_vec())
}

/// Staging directory used while `out_dir` is being extracted.
pub fn partial_dir(out_dir: &Path) -> PathBuf {
    let mut name = out_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    out_dir.with_file_name(name)
}

/// Extract every entry of the archive into `out_dir`.
/// Entries land in a `.partial` sibling first and the directory is renamed
/// into place once extraction finished. Returns the number of entries.
pub fn extract_zip(bytes: &[u8], out_dir: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).context("reading zip archive")?;
    let staging = partial_dir(out_dir);

    if staging.exists() {
        fs::remove_dir_all(&staging)
            .with_context(|| format!("removing stale {}", staging.display()))?;
    }
    fs::create_dir_all(&staging).with_context(|| format!("creating {}", staging.display()))?;

    let entries = archive.len();
    if let Err(e) = archive.extract(&staging) {
        // entries that escape the target are refused by `extract`
        let _ = fs::remove_dir_all(&staging);
        return Err(e).with_context(|| format!("extracting into {}", staging.display()));
    }

    fs::rename(&staging, out_dir).with_context(|| {
        format!(
            "moving {} into place at {}",
            staging.display(),
            out_dir.display()
        )
    })?;
    Ok(entries)
}

/// In-memory archive with the given `(name, content)` entries.
#[cfg(test)]
pub(crate) fn build_zip(files: &[(&str, &str)]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::CompressionMethod;

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extracts_into_year_dir_and_cleans_staging() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("2020");
        let bytes = build_zip(&[
            ("survey_results_public.csv", "Respondent,LanguageWorkedWith\n1,Rust\n"),
            ("README_2020.txt", "readme"),
        ]);

        let n = extract_zip(&bytes, &out).unwrap();

        assert_eq!(n, 2);
        assert!(out.join("survey_results_public.csv").is_file());
        assert!(!partial_dir(&out).exists());
    }

    #[test]
    fn stale_partial_dir_is_replaced() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("2021");
        let staging = partial_dir(&out);
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("leftover.csv"), "junk").unwrap();

        let bytes = build_zip(&[("survey_results_public.csv", "ResponseId\n1\n")]);
        extract_zip(&bytes, &out).unwrap();

        assert!(!out.join("leftover.csv").exists());
        assert!(out.join("survey_results_public.csv").is_file());
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("2019");
        assert!(extract_zip(b"not a zip", &out).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn entries_escaping_the_target_are_rejected() {
        let tmp = tempdir().unwrap();
        let cache = tmp.path().join("cache");
        fs::create_dir_all(&cache).unwrap();
        let out = cache.join("2020");
        let bytes = build_zip(&[
            ("survey_results_public.csv", "ResponseId\n1\n"),
            ("../evil.csv", "pwned"),
        ]);

        assert!(extract_zip(&bytes, &out).is_err());
        assert!(!cache.join("evil.csv").exists());
        assert!(!tmp.path().join("evil.csv").exists());
        assert!(!out.exists());
        assert!(!partial_dir(&out).exists());
    }

    #[test]
    fn partial_dir_is_a_sibling() {
        let p = partial_dir(Path::new("/cache/2018"));
        assert_eq!(p, PathBuf::from("/cache/2018.partial"));
    }
}

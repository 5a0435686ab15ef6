// src/fetch/urls.rs
use anyhow::{bail, Context, Result};
use url::Url;

/// Fill the survey year into the archive URL template.
pub fn survey_zip_url(template: &str, year: u16) -> Result<Url> {
    if !template.contains("{year}") {
        bail!("url template `{}` has no {{year}} placeholder", template);
    }
    let raw = template.replace("{year}", &year.to_string());
    Url::parse(&raw).with_context(|| format!("parsing survey url {}", raw))
}

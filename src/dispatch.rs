//! URL to site routing.

use url::Url;

use crate::error::ScrapeError;
use crate::sites::Site;

/// A URL matched to the site that knows how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub site: Site,
    /// Canonical offer URL, tracking parameters removed.
    pub url: String,
}

/// Match `input` against every supported site in priority order and clean
/// it for the first one that accepts it. Input without a scheme is read as
/// `https://`.
pub fn resolve(input: &str) -> Result<Target, ScrapeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::InvalidUrl);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let parsed = Url::parse(&candidate).map_err(|e| {
        tracing::debug!("Could not parse {trimmed:?}: {e}");
        ScrapeError::UnsupportedUrl(input.to_string())
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScrapeError::UnsupportedUrl(input.to_string()));
    }

    let site = Site::ALL
        .into_iter()
        .find(|site| site.matches(&parsed))
        .ok_or_else(|| ScrapeError::UnsupportedUrl(input.to_string()))?;

    let url = site.clean_url(&parsed);
    tracing::debug!("Dispatched {input} to {} as {url}", site.display_name());
    Ok(Target { site, url })
}

//! Line-oriented input for the CLI: one entry per line, either a bare URL or a JSON object.
//!
//! ```text
//! # comments and blank lines are skipped
//! https://example.com/
//! {"loc": "https://example.com/fr/", "lastmod": "2024-01-31", "priority": 0.8, "changefreq": "weekly"}
//! {"loc": "https://example.com/", "mobile": true, "alternates": [{"lang": "de", "url": "https://example.com/de/"}]}
//! ```

use serde::Deserialize;

use crate::dates::{convert_date_to_iso8601, is_valid_iso8601, time_now};
use crate::errors::{Result, SitemapError, ValidationError};
use crate::sitemap_url::{Frequency, PRIORITY_AVERAGE, SitemapUrl};

/// JSON shape of one input line.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrlInput {
    pub loc: String,
    /// Any date `convert_date_to_iso8601` understands; defaults to now.
    #[serde(default)]
    pub lastmod: Option<String>,
    #[serde(default)]
    pub priority: Option<f64>,
    #[serde(default, alias = "frequency")]
    pub changefreq: Option<Frequency>,
    #[serde(default)]
    pub mobile: bool,
    #[serde(default)]
    pub alternates: Vec<AlternateInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlternateInput {
    pub lang: String,
    pub url: String,
}

impl UrlInput {
    /// Validates the input as a SitemapUrl.
    pub fn into_sitemap_url(self) -> std::result::Result<SitemapUrl, ValidationError> {
        let lastmod = match self.lastmod {
            None => time_now(),
            Some(date) if is_valid_iso8601(&date) => date,
            Some(date) => convert_date_to_iso8601(&date)?,
        };

        let mut builder = SitemapUrl::builder(self.loc, lastmod)
            .priority(self.priority.unwrap_or(PRIORITY_AVERAGE))
            .frequency(self.changefreq.unwrap_or_default())
            .mobile(self.mobile);
        for alternate in self.alternates {
            builder = builder.alternate(alternate.lang, alternate.url);
        }
        builder.build()
    }
}

/// Parses one line of input. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<SitemapUrl>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let input = if trimmed.starts_with('{') {
        serde_json::from_str::<UrlInput>(trimmed).map_err(|e| SitemapError::Input {
            line: line_number,
            message: e.to_string(),
        })?
    } else {
        UrlInput {
            loc: trimmed.to_string(),
            lastmod: None,
            priority: None,
            changefreq: None,
            mobile: false,
            alternates: Vec::new(),
        }
    };

    input
        .into_sitemap_url()
        .map(Some)
        .map_err(|e| SitemapError::Input {
            line: line_number,
            message: e.to_string(),
        })
}

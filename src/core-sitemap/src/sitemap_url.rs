//! A single `<url>` entry of a sitemap page.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indoc::indoc;
use quick_xml::escape::escape;
use serde::Deserialize;
use subst::substitute;

use crate::dates::is_valid_iso8601;
use crate::errors::{Result, ValidationError};
use crate::url_utils::is_valid_web_url;

const URL_ELEMENT: &str = indoc! {"
    <url>
      <loc>${LOC}</loc>
      <lastmod>${LASTMOD}</lastmod>
      <changefreq>${FREQUENCY}</changefreq>
      <priority>${PRIORITY}</priority>${LANGS}${MOBILE}
    </url>
"};

const ALTERNATE_ELEMENT: &str = "\n  <xhtml:link rel=\"alternate\" hreflang=\"${LANG}\" href=\"${URL}\"/>";

const MOBILE_ELEMENT: &str = "\n  <mobile:mobile/>";

pub const PRIORITY_HIGHEST: f64 = 1.0;
pub const PRIORITY_HIGHER: f64 = 0.9;
pub const PRIORITY_HIGH: f64 = 0.7;
pub const PRIORITY_AVERAGE: f64 = 0.5;
pub const PRIORITY_LOW: f64 = 0.3;
pub const PRIORITY_LOWER: f64 = 0.2;
pub const PRIORITY_LOWEST: f64 = 0.1;

/// How often the resource is expected to change (`<changefreq>`).
///
/// Parsing ignores case and surrounding whitespace, both through [`FromStr`] and when
/// deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Frequency {
    Always,
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Always => "always",
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
            Frequency::Never => "never",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Frequency::Always),
            "hourly" => Ok(Frequency::Hourly),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            "never" => Ok(Frequency::Never),
            _ => Err(ValidationError::InvalidFrequency(s.to_string())),
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = ValidationError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// A localized variant of a page, rendered as an `hreflang` alternate link.
#[derive(Debug, Clone, PartialEq)]
pub struct AlternateLink {
    language: String,
    url: String,
}

impl AlternateLink {
    /// Fails if `url` is not a valid web URL with a path.
    pub fn new(language: impl Into<String>, url: impl Into<String>) -> std::result::Result<Self, ValidationError> {
        let url = url.into();
        if !is_valid_web_url(&url) {
            return Err(ValidationError::InvalidUrl(url));
        }
        Ok(AlternateLink {
            language: language.into(),
            url,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn to_xml(&self) -> Result<String> {
        let xml = substitute(ALTERNATE_ELEMENT, &{
            let mut v = HashMap::new();
            v.insert("LANG".to_string(), escape(self.language.as_str()).into_owned());
            v.insert("URL".to_string(), escape(self.url.as_str()).into_owned());
            v
        })?;
        Ok(xml)
    }
}

/// One linkable resource of a sitemap page.
///
/// Instances are validated on construction and immutable afterwards. Use
/// [`SitemapUrl::new`] for the common case or [`SitemapUrl::builder`] to attach
/// alternate-language links.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    loc: String,
    lastmod: String,
    priority: f64,
    frequency: Frequency,
    has_mobile: bool,
    alternates: Vec<AlternateLink>,
}

impl SitemapUrl {
    /// Validates and creates an entry without alternate-language links.
    pub fn new(
        loc: impl Into<String>,
        lastmod: impl Into<String>,
        priority: f64,
        frequency: Frequency,
        has_mobile: bool,
    ) -> std::result::Result<Self, ValidationError> {
        Self::builder(loc, lastmod)
            .priority(priority)
            .frequency(frequency)
            .mobile(has_mobile)
            .build()
    }

    /// Creates a builder with the default priority (0.5) and frequency (daily).
    pub fn builder(loc: impl Into<String>, lastmod: impl Into<String>) -> SitemapUrlBuilder {
        SitemapUrlBuilder {
            loc: loc.into(),
            lastmod: lastmod.into(),
            priority: PRIORITY_AVERAGE,
            frequency: Frequency::default(),
            has_mobile: false,
            alternates: Vec::new(),
        }
    }

    pub fn loc(&self) -> &str {
        &self.loc
    }

    pub fn lastmod(&self) -> &str {
        &self.lastmod
    }

    /// Priority, rounded to one decimal place.
    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn has_mobile(&self) -> bool {
        self.has_mobile
    }

    pub fn alternates(&self) -> &[AlternateLink] {
        &self.alternates
    }

    /// Renders the `<url>` element for this entry.
    pub fn to_xml(&self) -> Result<String> {
        let mut langs = String::new();
        for alternate in &self.alternates {
            langs.push_str(&alternate.to_xml()?);
        }
        let mobile = if self.has_mobile { MOBILE_ELEMENT } else { "" };

        let xml = substitute(URL_ELEMENT, &{
            let mut v = HashMap::new();
            v.insert("LOC".to_string(), escape(self.loc.as_str()).into_owned());
            v.insert("LASTMOD".to_string(), escape(self.lastmod.as_str()).into_owned());
            v.insert("FREQUENCY".to_string(), self.frequency.to_string());
            v.insert("PRIORITY".to_string(), format!("{:.1}", self.priority));
            v.insert("LANGS".to_string(), langs);
            v.insert("MOBILE".to_string(), mobile.to_string());
            v
        })?;
        Ok(xml)
    }
}

/// Builder for SitemapUrl.
#[derive(Debug, Clone)]
pub struct SitemapUrlBuilder {
    loc: String,
    lastmod: String,
    priority: f64,
    frequency: Frequency,
    has_mobile: bool,
    alternates: Vec<(String, String)>,
}

impl SitemapUrlBuilder {
    /// Sets the priority; must lie in [0.1, 1.0].
    pub fn priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the change frequency.
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Marks the resource as mobile-ready.
    pub fn mobile(mut self, has_mobile: bool) -> Self {
        self.has_mobile = has_mobile;
        self
    }

    /// Adds a localized variant. Links render in the order they are added.
    pub fn alternate(mut self, language: impl Into<String>, url: impl Into<String>) -> Self {
        self.alternates.push((language.into(), url.into()));
        self
    }

    /// Validates every field and builds the SitemapUrl.
    pub fn build(self) -> std::result::Result<SitemapUrl, ValidationError> {
        if !is_valid_web_url(&self.loc) {
            return Err(ValidationError::InvalidUrl(self.loc));
        }
        if !is_valid_iso8601(&self.lastmod) {
            return Err(ValidationError::InvalidLastmod(self.lastmod));
        }
        if !(PRIORITY_LOWEST..=PRIORITY_HIGHEST).contains(&self.priority) {
            return Err(ValidationError::InvalidPriority(self.priority));
        }

        let alternates = self
            .alternates
            .into_iter()
            .map(|(language, url)| AlternateLink::new(language, url))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(SitemapUrl {
            loc: self.loc,
            lastmod: self.lastmod,
            priority: (self.priority * 10.0).round() / 10.0,
            frequency: self.frequency,
            has_mobile: self.has_mobile,
            alternates,
        })
    }
}

//! # Sitemap Generation Library
//!
//! Generates XML sitemaps for websites. URLs are pushed one at a time into a [`Runner`],
//! which fills capacity-limited pages (50,000 URLs by default), writes each full page to
//! disk and, when a run needs more than one page, finishes with a sitemap index.
//!
//! ## Features
//!
//! - Strict validation of locations, `lastmod` timestamps and priorities
//! - Alternate-language (`hreflang`) links and the mobile marker per URL
//! - Configurable page capacity and file names
//! - Optional search engine ping once the sitemap changed
//!
//! ## Example
//!
//! ```no_run
//! use core_sitemap::{dates, Frequency, PingNotifier, Runner, RunnerOptions, SitemapUrl};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = RunnerOptions::builder().verbose(true).build();
//!     let mut runner = Runner::with_locations("/var/www/example.com/sitemaps", "https://example.com/sitemaps/", options)?;
//!
//!     let home = SitemapUrl::builder("https://example.com/", dates::time_now())
//!         .priority(1.0)
//!         .frequency(Frequency::Always)
//!         .alternate("fr", "https://example.com/fr/")
//!         .build()?;
//!     runner.push(home)?;
//!     runner.push_url("https://example.com/login", &dates::time_yesterday(), 0.9, Frequency::Daily, true)?;
//!
//!     let summary = runner.end()?;
//!     summary.ping_notify(&PingNotifier::default())?;
//!     Ok(())
//! }
//! ```

pub mod common;
mod config;
pub mod dates;
mod errors;
pub mod input;
mod notify;
mod runner;
mod sitemap;
mod sitemap_index;
mod sitemap_url;
mod url_utils;

// Public API re-exports
pub use config::{
    DEFAULT_MAX_RECORDS_PER_PAGE, DEFAULT_MULTI_FILE_PATTERN, DEFAULT_SINGLE_FILE_NAME, FileNames, RunnerOptions,
    RunnerOptionsBuilder,
};
pub use errors::{Result, SitemapError, ValidationError};
pub use notify::{DEFAULT_PING_ENDPOINT, Notifier, PingNotifier, ping_url};
pub use runner::{EndError, RunSummary, Runner};
pub use sitemap::Sitemap;
pub use sitemap_index::SitemapIndex;
pub use sitemap_url::{
    AlternateLink, Frequency, PRIORITY_AVERAGE, PRIORITY_HIGH, PRIORITY_HIGHER, PRIORITY_HIGHEST, PRIORITY_LOW,
    PRIORITY_LOWER, PRIORITY_LOWEST, SitemapUrl, SitemapUrlBuilder,
};
pub use url_utils::{ensure_trailing_slash, is_valid_web_url};

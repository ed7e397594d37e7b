//! Error types for sitemap generation.

use std::path::PathBuf;

use thiserror::Error;

/// A record (or one of its fields) was rejected at construction time.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Not an absolute http(s) URL with a path component.
    #[error("The specified location \"{0}\" is not a valid URL")]
    InvalidUrl(String),

    /// The lastmod value is not strict ISO-8601.
    #[error("Invalid lastmod \"{0}\": date must be in ISO-8601 format (e.g. 2024-01-31T12:00:00+00:00)")]
    InvalidLastmod(String),

    /// Priority outside of [0.1, 1.0].
    #[error("Invalid priority {0}: priority must be a value between 0.1 and 1")]
    InvalidPriority(f64),

    /// Unknown change frequency keyword.
    #[error("Invalid change frequency \"{0}\": expected one of always, hourly, daily, weekly, monthly, yearly, never")]
    InvalidFrequency(String),

    /// Free-form date that none of the supported formats understand.
    #[error("Cannot interpret \"{0}\" as a date")]
    UnparseableDate(String),

    /// Unix timestamp outside of the representable range.
    #[error("Unix timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

/// Main error type for sitemap generation operations.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// A record failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem failure while preparing the output directory or writing a file.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Internal error: template substitution failed.
    #[error("Template substitution failed: {0}")]
    Template(#[from] subst::Error),

    /// A line of CLI input could not be turned into a record.
    #[error("Invalid input on line {line}: {message}")]
    Input { line: usize, message: String },
}

impl SitemapError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SitemapError::Config(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SitemapError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Type alias for Result with SitemapError
pub type Result<T> = std::result::Result<T, SitemapError>;

//! URL validation and normalization utilities.

use url::Url;

/// Checks that a string is an absolute http(s) URL with a host and an explicit path.
///
/// Only ASCII input is accepted; internationalized hosts and paths must already be
/// punycode or percent-encoded.
///
/// The path must be spelled out in the input: `https://example.com/` is accepted,
/// `https://example.com` is not (even though it parses with an implied `/`).
///
/// # Examples
///
/// ```
/// # use core_sitemap::is_valid_web_url;
/// assert!(is_valid_web_url("https://example.com/docs"));
/// assert!(is_valid_web_url("http://example.com/"));
/// assert!(!is_valid_web_url("https://example.com"));
/// assert!(!is_valid_web_url("not a url"));
/// ```
pub fn is_valid_web_url(candidate: &str) -> bool {
    if candidate.is_empty() || !candidate.is_ascii() || candidate.chars().any(char::is_whitespace) {
        return false;
    }

    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
                && has_explicit_path(candidate)
        }
        Err(_) => false,
    }
}

/// True if the text following the authority starts with `/` before any query or fragment.
fn has_explicit_path(candidate: &str) -> bool {
    candidate
        .split_once("://")
        .and_then(|(_, rest)| rest.find(['/', '?', '#']).map(|i| rest.as_bytes()[i] == b'/'))
        .unwrap_or(false)
}

/// Appends a single `/` unless the value already ends with one.
pub fn ensure_trailing_slash(value: &str) -> String {
    if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    }
}

//! Search engine notification ("ping") after a sitemap changed.

use std::time::Duration;

use url::Url;

/// Google's sitemap ping endpoint.
pub const DEFAULT_PING_ENDPOINT: &str = "https://www.google.com/webmasters/tools/ping";

/// Interface for telling a search engine that a sitemap was regenerated.
///
/// Notification is fire-and-forget: implementations log failures instead of returning them.
pub trait Notifier {
    fn notify(&self, sitemap_url: &str);
}

/// Builds `endpoint?sitemap=<url>` with the sitemap URL form-encoded.
pub fn ping_url(endpoint: &str, sitemap_url: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(endpoint, &[("sitemap", sitemap_url)])
}

/// Notifier issuing one blocking HTTP GET per call.
#[derive(Debug, Clone)]
pub struct PingNotifier {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl Default for PingNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_PING_ENDPOINT)
    }
}

impl PingNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Uses a caller-configured client (timeouts, proxies, user agent).
    pub fn with_client(endpoint: impl Into<String>, client: reqwest::blocking::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// Same as `new` but with a request timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
                reqwest::blocking::Client::new()
            });
        Self::with_client(endpoint, client)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Notifier for PingNotifier {
    fn notify(&self, sitemap_url: &str) {
        let request_url = match ping_url(&self.endpoint, sitemap_url) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!("Invalid ping endpoint {}: {}", self.endpoint, e);
                return;
            }
        };

        match self.client.get(request_url).send() {
            Ok(response) => tracing::info!("Pinged {} for {}: {}", self.endpoint, sitemap_url, response.status()),
            Err(e) => tracing::warn!("Ping to {} failed: {}", self.endpoint, e),
        }
    }
}

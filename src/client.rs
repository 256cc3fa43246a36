//! Shared HTTP client construction policy.
//!
//! This module centralizes networking defaults so the search and resolution
//! phases stay consistent on timeout, user-agent, and header behavior. Two
//! clients are built because reqwest fixes the redirect policy at
//! construction time: search fetches follow redirects normally, while
//! resolution requests must surface the `Location` header instead of
//! following it.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::{Client, ClientBuilder};
use url::Url;

/// Default site base URL; every request carries it as `Referer`.
pub const DEFAULT_BASE_URL: &str = "https://doujinstyle.com/";

/// Connect timeout shared by both clients.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total request timeout for search-page fetches.
pub const SEARCH_TIMEOUT_SECS: u64 = 15;

/// Total request timeout for download-form resolution requests.
pub const RESOLVE_TIMEOUT_SECS: u64 = 20;

/// Browser User-Agent sent on all requests; the site serves its full search
/// markup to browser agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Builds the client for search-page fetches (redirects followed).
///
/// # Panics
///
/// Panics if the HTTP client builder fails to build with the static
/// configuration. This should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn search_client(base_url: &Url) -> Client {
    base_builder(base_url, SEARCH_TIMEOUT_SECS)
        .build()
        .expect("failed to build search HTTP client with static configuration")
}

/// Builds the client for resolution requests (redirects surfaced, not followed).
///
/// # Panics
///
/// Panics if the HTTP client builder fails to build with the static
/// configuration. This should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn resolve_client(base_url: &Url) -> Client {
    base_builder(base_url, RESOLVE_TIMEOUT_SECS)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build resolution HTTP client with static configuration")
}

fn base_builder(base_url: &Url, timeout_secs: u64) -> ClientBuilder {
    let mut headers = HeaderMap::new();
    if let Ok(referer) = HeaderValue::from_str(base_url.as_str()) {
        headers.insert(REFERER, referer);
    }

    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .cookie_store(true)
        .gzip(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url_parses() {
        let url = Url::parse(DEFAULT_BASE_URL).unwrap();
        assert_eq!(url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_clients_build_with_static_configuration() {
        let base = Url::parse(DEFAULT_BASE_URL).unwrap();
        let _search = search_client(&base);
        let _resolve = resolve_client(&base);
    }

    #[test]
    fn test_resolution_timeout_exceeds_search_timeout() {
        // The form submission is the slower endpoint on the live site.
        assert!(RESOLVE_TIMEOUT_SECS > SEARCH_TIMEOUT_SECS);
    }
}

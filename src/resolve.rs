//! Per-album redirect probing and mirror-host filtering.
//!
//! Each harvested album id is probed by replaying the site's "Download"
//! form submission with redirects disabled. A redirect whose target lands
//! on an allow-listed file host is kept as a mirror link; everything else
//! is counted and skipped. Failures here never abort the run.

use std::collections::BTreeSet;

use reqwest::header::LOCATION;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// File hosts whose redirect targets are worth keeping.
pub const HOST_ALLOW_LIST: [&str; 4] = [
    "mega.nz",
    "mediafire.com",
    "drive.google.com",
    "pixeldrain.com",
];

/// Form payload replaying the site's "Download" button submission.
///
/// Field order matches the browser form: `type`, `id`, `source`,
/// `download_link`.
#[derive(Debug, Serialize)]
struct DownloadForm<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    id: &'a str,
    source: &'a str,
    download_link: &'a str,
}

impl<'a> DownloadForm<'a> {
    fn for_album(id: &'a str) -> Self {
        Self {
            content_type: "1",
            id,
            source: "0",
            download_link: "Download",
        }
    }
}

/// Errors that skip a single album during resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The download request itself failed (timeout, connection refused, ...).
    #[error("download request for album {id} failed: {source}")]
    Request {
        /// The album id being probed.
        id: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The response redirected without a readable `Location` header.
    #[error("redirect for album {id} carried no readable location")]
    BadLocation {
        /// The album id being probed.
        id: String,
    },
}

/// Classified result of probing one album id.
#[derive(Debug)]
pub enum ResolveOutcome {
    /// Redirect landed on an allow-listed mirror host.
    Mirror(String),
    /// Redirect pointed outside the allow-list; excluded from output.
    OffListRedirect(String),
    /// The response carried no redirect for this album.
    NoRedirect,
    /// The request failed; the album is skipped.
    Failed(ResolveError),
}

/// Aggregated results of resolving a batch of album ids.
#[derive(Debug, Default)]
pub struct ResolveSummary {
    /// Deduplicated mirror links in ascending order.
    pub mirrors: BTreeSet<String>,
    /// Albums that answered without a redirect.
    pub no_redirect: usize,
    /// Albums that redirected outside the allow-list.
    pub off_list: usize,
    /// Albums skipped because the request failed.
    pub failed: usize,
}

/// Probes album ids for mirror links via the site's download form.
pub struct Resolver {
    client: Client,
    base_url: Url,
}

impl Resolver {
    /// Creates a resolver posting to the site root at `base_url`.
    ///
    /// The client must have redirects disabled so the `Location` header can
    /// be inspected directly (see [`crate::client::resolve_client`]).
    #[must_use]
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Probes a single album id and classifies the response.
    pub async fn resolve(&self, id: &str) -> ResolveOutcome {
        let form = DownloadForm::for_album(id);
        let response = match self
            .client
            .post(self.base_url.clone())
            .form(&form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(source) => {
                return ResolveOutcome::Failed(ResolveError::Request {
                    id: id.to_string(),
                    source,
                });
            }
        };

        if !is_download_redirect(response.status()) {
            return ResolveOutcome::NoRedirect;
        }

        let Some(location) = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
        else {
            return ResolveOutcome::Failed(ResolveError::BadLocation { id: id.to_string() });
        };

        if is_mirror_link(location) {
            ResolveOutcome::Mirror(location.to_string())
        } else {
            ResolveOutcome::OffListRedirect(location.to_string())
        }
    }

    /// Resolves every id in order, logging progress and aggregating outcomes.
    ///
    /// Per-album failures are counted, never fatal. Mirror links are
    /// deduplicated across albums that redirect to the same target.
    pub async fn resolve_all(&self, ids: &[String]) -> ResolveSummary {
        let mut summary = ResolveSummary::default();
        let total = ids.len();

        for (index, id) in ids.iter().enumerate() {
            let position = index + 1;
            match self.resolve(id).await {
                ResolveOutcome::Mirror(link) => {
                    info!(album = %id, "[{position}/{total}] mirror link captured");
                    summary.mirrors.insert(link);
                }
                ResolveOutcome::OffListRedirect(link) => {
                    debug!(album = %id, link = %link, "[{position}/{total}] redirect outside allow-list");
                    summary.off_list += 1;
                }
                ResolveOutcome::NoRedirect => {
                    info!(album = %id, "[{position}/{total}] no redirect link found");
                    summary.no_redirect += 1;
                }
                ResolveOutcome::Failed(error) => {
                    debug!(album = %id, error = %error, "[{position}/{total}] album skipped");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

/// Redirect statuses the site uses for download links.
///
/// Exactly 301/302/303/307; other 3xx codes do not carry download targets.
#[must_use]
pub fn is_download_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307)
}

/// Returns true when `link` points at one of the allow-listed file hosts.
#[must_use]
pub fn is_mirror_link(link: &str) -> bool {
    HOST_ALLOW_LIST.iter().any(|host| link.contains(host))
}

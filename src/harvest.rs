//! Search-page pagination and album id harvesting.
//!
//! Walks the site's search results one page at a time, extracting numeric
//! album ids from anchors inside the page's main content region. Pagination
//! stops after two stale pages (no ids at all, or the same ids as the
//! previous page). Any request failure aborts the remaining pages; ids
//! collected up to that point are kept.

use std::collections::BTreeSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

/// Consecutive stale pages tolerated before pagination halts.
pub const DUPLICATE_TOLERANCE: u32 = 2;

/// Fixed delay between search-page fetches.
pub const PAGE_DELAY: Duration = Duration::from_millis(300);

/// Album links look like `?p=page&type=1&id=12345`.
static ALBUM_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\?p=page&type=1&id=(\d+)")
        .unwrap_or_else(|e| panic!("invalid album id regex: {e}"))
});

/// Errors that abort the harvesting loop.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The search page could not be fetched.
    #[error("search page {page} could not be fetched: {source}")]
    Request {
        /// Zero-based page index.
        page: u32,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The search page answered with a non-success status.
    #[error("search page {page} returned HTTP {status}")]
    Status {
        /// Zero-based page index.
        page: u32,
        /// Status code the page answered with.
        status: u16,
    },

    /// The search page body could not be read.
    #[error("search page {page} body could not be read: {source}")]
    Body {
        /// Zero-based page index.
        page: u32,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
}

/// Result of one harvesting run.
#[derive(Debug)]
pub struct HarvestOutcome {
    /// Sorted unique album ids collected before pagination stopped.
    pub ids: Vec<String>,
    /// Search pages fetched successfully.
    pub pages_fetched: u32,
    /// Error that aborted pagination early, if any.
    pub abort: Option<HarvestError>,
}

/// Pages through search results and collects unique album ids.
pub struct Harvester {
    client: Client,
    base_url: Url,
    page_delay: Duration,
}

impl Harvester {
    /// Creates a harvester with the default inter-page delay.
    #[must_use]
    pub fn new(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            page_delay: PAGE_DELAY,
        }
    }

    /// Overrides the inter-page delay (tests pass zero).
    #[must_use]
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    fn search_url(&self, keyword: &str, page: u32) -> String {
        format!(
            "{}?p=search&source=1&type=blanket&result={keyword}&page={page}",
            self.base_url
        )
    }

    /// Collects unique album ids for `keyword` across all productive pages.
    ///
    /// The keyword must already be in the URL-encoded form the site's search
    /// expects. The returned ids are sorted; on an aborted run they cover
    /// every page fetched before the failure.
    pub async fn harvest(&self, keyword: &str) -> HarvestOutcome {
        let mut unique_ids: BTreeSet<String> = BTreeSet::new();
        let mut previous_ids: BTreeSet<String> = BTreeSet::new();
        let mut tolerance = DUPLICATE_TOLERANCE;
        let mut page: u32 = 0;
        let mut pages_fetched: u32 = 0;

        let abort = loop {
            let current_ids = match self.fetch_page_ids(keyword, page).await {
                Ok(ids) => ids,
                Err(error) => {
                    warn!(page, error = %error, "aborting search pagination");
                    break Some(error);
                }
            };
            pages_fetched += 1;

            if current_ids.is_empty() || (page > 0 && current_ids == previous_ids) {
                tolerance -= 1;
                debug!(page, tolerance, "stale search page");
                if tolerance == 0 {
                    break None;
                }
            }

            if !current_ids.is_empty() {
                info!(page, ids = current_ids.len(), "search page yielded album ids");
                unique_ids.extend(current_ids.iter().cloned());
            }

            previous_ids = current_ids;
            page += 1;
            sleep(self.page_delay).await;
        };

        HarvestOutcome {
            ids: unique_ids.into_iter().collect(),
            pages_fetched,
            abort,
        }
    }

    async fn fetch_page_ids(
        &self,
        keyword: &str,
        page: u32,
    ) -> Result<BTreeSet<String>, HarvestError> {
        let url = self.search_url(keyword, page);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| HarvestError::Request { page, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                page,
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|source| HarvestError::Body { page, source })?;

        Ok(extract_album_ids(&html))
    }
}

/// Extracts album ids from anchors inside the page's main content region.
///
/// The `mainbar` element isolates search results from sidebar listings such
/// as "hot albums"; when it is absent the whole document is scanned instead.
#[must_use]
pub fn extract_album_ids(html: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return BTreeSet::new();
    };
    let mainbar_selector = Selector::parse("mainbar").ok();

    let region = mainbar_selector
        .as_ref()
        .and_then(|selector| document.select(selector).next());

    let mut ids = BTreeSet::new();
    match region {
        Some(mainbar) => collect_ids(mainbar.select(&anchor_selector), &mut ids),
        None => collect_ids(document.select(&anchor_selector), &mut ids),
    }
    ids
}

fn collect_ids<'a>(
    anchors: impl Iterator<Item = ElementRef<'a>>,
    ids: &mut BTreeSet<String>,
) {
    for anchor in anchors {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if let Some(captures) = ALBUM_ID_RE.captures(href)
            && let Some(id) = captures.get(1)
        {
            ids.insert(id.as_str().to_string());
        }
    }
}

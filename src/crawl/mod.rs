//! One-hop, same-domain BFS crawler.
//!
//! Fetches a seed page, extracts its same-domain links, and follows them
//! in discovery order until the page budget is spent. Links discovered on
//! non-seed pages are never followed. Exactly one fetch is in flight at a
//! time, so the visited set and result list need no synchronization.

pub mod links;

pub use links::extract_links;

use std::collections::HashSet;

use glob::Pattern;
use tracing::{debug, info};
use url::Url;

use crate::config::CrawlOptions;
use crate::error::CrawlError;
use crate::fetch::{FetchResult, Fetcher};
use crate::urlnorm::NormalizedUrl;

/// Per-crawl state; lives exactly as long as one [`crawl`] call.
struct CrawlState {
    visited: HashSet<NormalizedUrl>,
    results: Vec<FetchResult>,
    max_pages: usize,
}

impl CrawlState {
    fn budget_exhausted(&self) -> bool {
        self.results.len() >= self.max_pages
    }
}

/// Follow links one level deep from `seed_url`, same domain only.
///
/// The seed page counts toward the budget and is always kept, even with
/// an error status; non-seed pages are kept only when their status is
/// below 400. A fetch failure on a non-seed link is logged and skipped —
/// a single bad page never aborts the crawl. A failure on the seed page
/// itself does.
pub async fn crawl(
    seed_url: &str,
    fetcher: &mut Fetcher,
    options: &CrawlOptions,
) -> Result<Vec<FetchResult>, CrawlError> {
    let seed = Url::parse(seed_url).map_err(crate::error::FetchError::from)?;
    let base_domain = links::authority(&seed);

    let pattern = options
        .url_pattern
        .as_deref()
        .map(Pattern::new)
        .transpose()?;

    let mut state = CrawlState {
        visited: HashSet::new(),
        results: Vec::new(),
        // The seed always occupies one budget slot.
        max_pages: options.max_pages.max(1),
    };

    let seed_result = fetcher.fetch(seed_url, &options.fetch).await?;
    if let Some(normalized) = NormalizedUrl::parse(seed_url) {
        state.visited.insert(normalized);
    }

    let mut discovered = links::extract_links(&seed_result.html, seed_url, &base_domain);
    if let Some(pattern) = &pattern {
        discovered.retain(|url| pattern.matches(url));
    }
    info!(
        links = discovered.len(),
        status = seed_result.status,
        "seed page fetched"
    );

    state.results.push(seed_result);

    for url in discovered {
        if state.budget_exhausted() {
            break;
        }

        let Some(normalized) = NormalizedUrl::parse(&url) else {
            continue;
        };
        if !state.visited.insert(normalized) {
            continue;
        }

        match fetcher.fetch(&url, &options.fetch).await {
            Ok(result) if result.status < 400 => state.results.push(result),
            Ok(result) => {
                debug!(%url, status = result.status, "dropping error-status page");
            }
            Err(err) => {
                // Per-link failure tolerance: only FetchError is caught
                // here; anything else propagates.
                debug!(%url, "skipping link after fetch failure: {err}");
            }
        }
    }

    Ok(state.results)
}

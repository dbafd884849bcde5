//! Same-domain link extraction.
//!
//! Produces the ordered, deduplicated set of navigable links on a page.
//! Dedup identity is [`NormalizedUrl`]; the returned strings are the
//! resolved absolute URLs, which is what navigation actually uses.

use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use crate::urlnorm::NormalizedUrl;

/// Extensions that never resolve to a crawlable document.
static NON_DOCUMENT_EXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpg|jpeg|png|gif|svg|pdf|zip|tar|gz|css|js|xml)$")
        .expect("NON_DOCUMENT_EXT: hardcoded regex is valid")
});

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("ANCHOR: hardcoded selector is valid"));

/// Extract same-domain links from a page.
///
/// Policy, applied in order: resolve each href against `page_url`; drop
/// in-page fragments and `javascript:`/`mailto:`/`tel:` schemes; drop
/// non-http(s) schemes; drop foreign authorities; drop known
/// non-document extensions; dedup by [`NormalizedUrl`] preserving
/// first-seen order.
#[must_use]
pub fn extract_links(html: &str, page_url: &str, base_domain: &str) -> Vec<String> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        if href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }

        let Ok(absolute) = base.join(href) else {
            continue;
        };

        if !matches!(absolute.scheme(), "http" | "https") {
            continue;
        }
        if authority(&absolute) != base_domain {
            continue;
        }
        if NON_DOCUMENT_EXT.is_match(absolute.path()) {
            continue;
        }

        links.push(absolute.to_string());
    }

    // Dedup while preserving first-seen order.
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for link in links {
        let Some(normalized) = NormalizedUrl::parse(&link) else {
            continue;
        };
        if seen.insert(normalized) {
            unique.push(link);
        }
    }

    unique
}

/// `host[:port]` of a URL; the port only appears when explicit in the
/// original, matching how [`NormalizedUrl`] treats authorities.
#[must_use]
pub(crate) fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

//! Option structs for fetching, crawling, and result refinement.
//!
//! All of these are plain data with `Default` impls and chainable `with_*`
//! setters; nothing here validates URLs or touches the network.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-fetch options shared by both fetch strategies.
///
/// `headers` and `verify_ssl` only apply to the static HTTP path;
/// `screenshot`, `pdf` and `wait_for` only apply to rendered fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Per-fetch timeout in seconds (navigation, selector wait, request).
    pub timeout_secs: u64,
    /// Extra request headers merged over the browser-like defaults.
    pub headers: HashMap<String, String>,
    /// Verify TLS certificates. The insecure retry in
    /// [`crate::fetch::fetch_static_with_tls_fallback`] flips this off
    /// for exactly one attempt.
    pub verify_ssl: bool,
    /// Capture a full-page PNG screenshot (rendered fetches only).
    pub screenshot: bool,
    /// Capture a PDF (rendered fetches only, and only in headless mode).
    pub pdf: bool,
    /// CSS selector to wait for after navigation (rendered fetches only).
    pub wait_for: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            headers: HashMap::new(),
            verify_ssl: true,
            screenshot: false,
            pdf: false,
            wait_for: None,
        }
    }
}

impl FetchOptions {
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    #[must_use]
    pub fn with_screenshot(mut self, screenshot: bool) -> Self {
        self.screenshot = screenshot;
        self
    }

    #[must_use]
    pub fn with_pdf(mut self, pdf: bool) -> Self {
        self.pdf = pdf;
        self
    }

    #[must_use]
    pub fn with_wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }
}

/// Options for the one-hop crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlOptions {
    /// Maximum number of pages in the result set, seed included.
    pub max_pages: usize,
    /// Optional glob pattern; discovered links must match to be followed.
    pub url_pattern: Option<String>,
    /// Per-page fetch options (timeout, screenshot/pdf capture, ...).
    pub fetch: FetchOptions,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 10,
            url_pattern: None,
            fetch: FetchOptions::default(),
        }
    }
}

impl CrawlOptions {
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    #[must_use]
    pub fn with_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchOptions) -> Self {
        self.fetch = fetch;
        self
    }
}

/// Post-crawl batch passes. Applied in a fixed order when enabled:
/// dedup, then sort-by-date, then limit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefineOptions {
    /// Drop results whose converted markdown fingerprints collide,
    /// keeping the first occurrence.
    pub dedupe: bool,
    /// Sort by best-effort publication date, newest first; undated
    /// results keep their relative order after all dated ones.
    pub sort_by_date: bool,
    /// Truncate to the first N results after the passes above.
    pub limit: Option<usize>,
}

impl RefineOptions {
    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    #[must_use]
    pub fn with_sort_by_date(mut self, sort: bool) -> Self {
        self.sort_by_date = sort;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

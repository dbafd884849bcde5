//! Content fetching: one-shot HTTP requests or a live rendering session.
//!
//! Both strategies produce the same [`FetchResult`] and fail with
//! [`FetchError`], so callers (the crawler in particular) can treat them
//! interchangeably through the [`Fetcher`] enum.

pub mod browser;
pub mod session;

pub use session::BrowserSession;

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::config::FetchOptions;
use crate::error::FetchError;

/// One fetched page.
///
/// Immutable once constructed; moved by value to downstream stages.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Raw (or rendered) HTML of the page.
    pub html: String,
    /// URL after redirects; may differ from the requested URL.
    pub final_url: String,
    /// HTTP status of the main document. 0 when the rendering engine
    /// produced no observable response.
    pub status: u16,
    /// Full-page PNG bytes, when requested from a rendered fetch.
    pub screenshot: Option<Vec<u8>>,
    /// PDF bytes, when requested from a headless rendered fetch.
    pub pdf: Option<Vec<u8>>,
    /// Response headers (static fetches only; rendered fetches leave
    /// this empty).
    pub headers: HashMap<String, String>,
}

/// The closed set of fetch strategies.
///
/// The caller picks a strategy up front; nothing downstream branches on
/// mode flags.
pub enum Fetcher {
    /// Stateless one-shot HTTP GET, no JS execution.
    Static,
    /// Fetches against a live [`BrowserSession`]; the session must be
    /// open before the first fetch.
    Rendered(BrowserSession),
}

impl Fetcher {
    /// Fetch one URL with this strategy.
    pub async fn fetch(
        &mut self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<FetchResult, FetchError> {
        match self {
            Self::Static => fetch_static(url, options).await,
            Self::Rendered(session) => session.fetch(url, options).await,
        }
    }
}

/// Fast fetch with reqwest (no JS rendering).
///
/// Issues a single GET with redirect following and a browser-like default
/// header set; caller headers override the defaults.
pub async fn fetch_static(url: &str, options: &FetchOptions) -> Result<FetchResult, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(options.timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers(default_headers(&options.headers))
        .danger_accept_invalid_certs(!options.verify_ssl)
        .build()?;

    let response = client.get(url).send().await?;

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect();
    let html = response.text().await?;

    debug!(%status, %final_url, "static fetch complete");

    Ok(FetchResult {
        html,
        final_url,
        status,
        screenshot: None,
        pdf: None,
        headers,
    })
}

/// Static fetch with the caller-level certificate fallback policy.
///
/// On a TLS certificate validation failure (and only then, and only when
/// verification was on), retries exactly once with verification disabled
/// and surfaces the downgrade as a `warn!` event. All other failures
/// propagate unchanged.
pub async fn fetch_static_with_tls_fallback(
    url: &str,
    options: &FetchOptions,
) -> Result<FetchResult, FetchError> {
    retry_insecure_once(options, |attempt| async move {
        fetch_static(url, &attempt).await
    })
    .await
}

/// Drive one fetch attempt, plus at most one insecure retry.
///
/// The retry fires only when the first attempt failed with a certificate
/// validation error and verification was on; the second attempt's outcome
/// is final either way.
async fn retry_insecure_once<F, Fut>(
    options: &FetchOptions,
    mut attempt: F,
) -> Result<FetchResult, FetchError>
where
    F: FnMut(FetchOptions) -> Fut,
    Fut: Future<Output = Result<FetchResult, FetchError>>,
{
    match attempt(options.clone()).await {
        Ok(result) => Ok(result),
        Err(err) if options.verify_ssl && err.is_certificate_error() => {
            warn!("TLS certificate validation failed, retrying without verification");
            attempt(options.clone().with_verify_ssl(false)).await
        }
        Err(err) => Err(err),
    }
}

fn default_headers(extra: &HashMap<String, String>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(browser::CHROME_USER_AGENT),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );

    for (name, value) in extra {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(%name, "skipping invalid request header"),
        }
    }

    headers
}

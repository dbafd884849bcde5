//! Error taxonomy for fetch and crawl operations.
//!
//! The crawl loop is only allowed to swallow `FetchError` values: transport
//! and navigation failures on individual pages. Anything else (poisoned
//! state, programming errors) panics or propagates normally.

use thiserror::Error;

/// Errors raised while acquiring a page, by either fetch strategy.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level HTTP failure (connection, TLS, body read).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Browser/CDP communication failure during a rendered fetch.
    #[error("browser error: {0}")]
    Browser(String),

    /// A per-fetch wait (navigation, selector, network idle) expired.
    #[error("{what} timeout after {secs} seconds")]
    Timeout { what: &'static str, secs: u64 },

    /// The rendering engine failed to start or open its context.
    /// Fatal: the session is unusable and must be closed.
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// `fetch` was called on a session outside the Open state.
    #[error("browser session is not open")]
    SessionNotOpen,

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors from a whole crawl run, as opposed to a single page fetch.
///
/// Only two things abort a crawl: a bad configuration (the glob pattern)
/// and a failure on the seed page itself. Non-seed fetch failures are
/// policy-swallowed inside the loop.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid url pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl From<chromiumoxide::error::CdpError> for FetchError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(err.to_string())
    }
}

impl FetchError {
    /// Whether this failure looks like a TLS certificate validation error.
    ///
    /// Drives the caller-level insecure-retry policy in
    /// [`crate::fetch::fetch_static_with_tls_fallback`]: only certificate
    /// failures are eligible for the one-shot retry with verification off.
    /// Covers both transport errors and certificate failures the rendering
    /// engine reports as `net::ERR_CERT_*` messages.
    #[must_use]
    pub fn is_certificate_error(&self) -> bool {
        match self {
            // reqwest wraps the rustls error several layers deep; walk
            // the source chain rather than trusting the top-level message.
            Self::Http(err) => {
                let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
                while let Some(err) = source {
                    if is_certificate_message(&err.to_string()) {
                        return true;
                    }
                    source = err.source();
                }
                false
            }
            Self::Browser(msg) => is_certificate_message(msg),
            _ => false,
        }
    }
}

fn is_certificate_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    msg.contains("certificate") || msg.contains("self-signed") || msg.contains("err_cert")
}

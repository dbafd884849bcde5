//! Stateful rendered-browser session.
//!
//! A [`BrowserSession`] owns one Chrome process and its CDP handler task.
//! Lifecycle is a strict three-state machine: Unopened -> Open -> Closed.
//! Only an Open session can fetch; each fetch runs on a fresh page handle
//! that is closed before the call returns, on every exit path.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::{EventResponseReceived, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, PrintToPdfParams};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::FetchResult;
use super::browser;
use crate::config::FetchOptions;
use crate::error::FetchError;

/// How long to scan buffered network events for the main document
/// response after navigation has settled.
const RESPONSE_SCAN_TIMEOUT: Duration = Duration::from_millis(500);

/// Distinguishes profile directories of sessions within one process.
static SESSION_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Unopened,
    Open,
    Closed,
}

/// A scoped rendering session: browser process + handler task + temp
/// profile directory.
///
/// ```no_run
/// # use sitemark::{BrowserSession, FetchOptions};
/// # async fn demo() -> Result<(), sitemark::FetchError> {
/// let mut session = BrowserSession::new(true);
/// session.open().await?;
/// let result = session.fetch("https://example.com", &FetchOptions::default()).await;
/// session.close().await;
/// result.map(|_| ())
/// # }
/// ```
pub struct BrowserSession {
    headless: bool,
    state: SessionState,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserSession {
    #[must_use]
    pub fn new(headless: bool) -> Self {
        Self {
            headless,
            state: SessionState::Unopened,
            browser: None,
            handler: None,
            user_data_dir: None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Launch the engine and open the browsing context.
    ///
    /// Fatal on failure: the session transitions straight to Closed and
    /// whatever was partially acquired is released before the error
    /// propagates.
    pub async fn open(&mut self) -> Result<(), FetchError> {
        if self.state != SessionState::Unopened {
            return Err(FetchError::Launch(
                "session was already opened; sessions are single-use".into(),
            ));
        }

        let user_data_dir = std::env::temp_dir().join(format!(
            "sitemark_chrome_{}_{}",
            std::process::id(),
            SESSION_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(e) = std::fs::create_dir_all(&user_data_dir) {
            self.state = SessionState::Closed;
            return Err(FetchError::Launch(format!(
                "failed to create user data directory: {e}"
            )));
        }

        match browser::launch(self.headless, Duration::from_secs(30), &user_data_dir).await {
            Ok((browser, handler)) => {
                self.browser = Some(browser);
                self.handler = Some(handler);
                self.user_data_dir = Some(user_data_dir);
                self.state = SessionState::Open;
                info!(headless = self.headless, "browser session opened");
                Ok(())
            }
            Err(e) => {
                // Partial-open cleanup: nothing else was acquired yet.
                if let Err(rm) = std::fs::remove_dir_all(&user_data_dir) {
                    debug!("failed to remove user data directory: {rm}");
                }
                self.state = SessionState::Closed;
                Err(FetchError::Launch(format!("{e:#}")))
            }
        }
    }

    /// Fetch one URL with the rendering engine.
    ///
    /// Navigates a fresh page handle, waits for the load to settle (and
    /// for `options.wait_for` if set), reads the rendered HTML, and
    /// optionally captures a full-page screenshot and/or a PDF. PDF
    /// capture silently yields `None` in headed sessions.
    pub async fn fetch(
        &mut self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<FetchResult, FetchError> {
        if self.state != SessionState::Open {
            return Err(FetchError::SessionNotOpen);
        }
        let Some(browser) = self.browser.as_ref() else {
            return Err(FetchError::SessionNotOpen);
        };

        let page = browser.new_page("about:blank").await?;

        // The page handle must not outlive this call, success or failure.
        let result = self.fetch_on_page(&page, url, options).await;
        if let Err(e) = page.close().await {
            debug!(%url, "failed to close page handle: {e}");
        }
        result
    }

    async fn fetch_on_page(
        &self,
        page: &Page,
        url: &str,
        options: &FetchOptions,
    ) -> Result<FetchResult, FetchError> {
        let timeout_secs = options.timeout_secs;

        // Subscribe before navigating so the document response is
        // buffered even though we only read it afterwards.
        let mut responses = page.event_listener::<EventResponseReceived>().await?;

        with_timeout(
            async {
                page.goto(url).await?;
                Ok(())
            },
            timeout_secs,
            "page navigation",
        )
        .await?;

        with_timeout(
            async {
                page.wait_for_navigation().await?;
                Ok(())
            },
            timeout_secs,
            "page load",
        )
        .await?;

        if let Some(selector) = &options.wait_for {
            wait_for_selector(page, selector, Duration::from_secs(timeout_secs)).await?;
        }

        let (status, headers) = document_response(&mut responses)
            .await
            .unwrap_or((0, HashMap::new()));

        let html = page.content().await?;

        // May differ from the requested URL if the site redirected.
        let final_url = match page.url().await {
            Ok(Some(u)) => u,
            Ok(None) | Err(_) => url.to_string(),
        };

        let screenshot = if options.screenshot {
            let params = ScreenshotParams::builder()
                .full_page(true)
                .format(CaptureScreenshotFormat::Png)
                .build();
            Some(page.screenshot(params).await?)
        } else {
            None
        };

        let pdf = if options.pdf && self.headless {
            let params = PrintToPdfParams {
                print_background: Some(true),
                ..PrintToPdfParams::default()
            };
            Some(page.pdf(params).await?)
        } else {
            // PDF generation only works in headless Chrome.
            None
        };

        debug!(%status, %final_url, "rendered fetch complete");

        Ok(FetchResult {
            html,
            final_url,
            status,
            screenshot,
            pdf,
            headers,
        })
    }

    /// Release the browsing context, then the engine.
    ///
    /// Safe to call in any state and after a failed fetch; repeated calls
    /// are no-ops. Runs the same cleanup `Drop` would, but can await the
    /// process exit properly.
    pub async fn close(&mut self) {
        self.state = SessionState::Closed;

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("failed to close browser cleanly: {e}");
            }
            if let Err(e) = browser.wait().await {
                warn!("failed to wait for browser exit: {e}");
            }
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        self.cleanup_user_data_dir();
        debug!("browser session closed");
    }

    /// Remove the temp profile directory, if still present.
    ///
    /// Blocking fs call so it is usable from `Drop`.
    fn cleanup_user_data_dir(&mut self) {
        if let Some(dir) = self.user_data_dir.take()
            && let Err(e) = std::fs::remove_dir_all(&dir)
        {
            warn!("failed to remove user data directory {}: {e}", dir.display());
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Last-resort cleanup when close() was never awaited. Browser's
        // own Drop kills the Chrome process.
        if let Some(handler) = self.handler.take() {
            warn!("browser session dropped without close(), aborting handler task");
            handler.abort();
        }
        self.cleanup_user_data_dir();
    }
}

/// Wrap a page operation with an explicit timeout so a stuck CDP call
/// cannot hang a fetch indefinitely.
async fn with_timeout<F, T>(operation: F, secs: u64, what: &'static str) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(Duration::from_secs(secs), operation).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout { what, secs }),
    }
}

/// Poll for a CSS selector until it appears or the timeout expires.
async fn wait_for_selector(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<(), FetchError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if page.find_element(selector).await.is_ok() {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(FetchError::Timeout {
                what: "selector wait",
                secs: timeout.as_secs(),
            });
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Scan buffered network events for the main document response.
///
/// Subresource responses (images, css, js) are skipped; redirects never
/// surface as Document responses, so the first one is the final document.
async fn document_response(
    events: &mut EventStream<EventResponseReceived>,
) -> Option<(u16, HashMap<String, String>)> {
    let scan = tokio::time::timeout(RESPONSE_SCAN_TIMEOUT, async {
        while let Some(event) = events.next().await {
            if event.r#type == ResourceType::Document {
                let status = u16::try_from(event.response.status).unwrap_or(0);
                let headers = event
                    .response
                    .headers
                    .inner()
                    .as_object()
                    .map(|map| {
                        map.iter()
                            .filter_map(|(k, v)| {
                                v.as_str().map(|v| (k.clone(), v.to_string()))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                return Some((status, headers));
            }
        }
        None
    })
    .await;

    scan.ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_before_open_is_rejected() {
        let mut session = BrowserSession::new(true);
        let err = session
            .fetch("https://example.com", &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::SessionNotOpen));
    }

    #[tokio::test]
    async fn close_is_idempotent_in_any_state() {
        let mut session = BrowserSession::new(true);
        session.close().await;
        session.close().await;
        assert!(!session.is_open());

        // A closed session can no longer fetch or reopen.
        let err = session
            .fetch("https://example.com", &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::SessionNotOpen));
        assert!(matches!(
            session.open().await.unwrap_err(),
            FetchError::Launch(_)
        ));
    }
}

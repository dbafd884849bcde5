pub mod config;
pub mod convert;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod markdown;
pub mod refine;
pub mod urlnorm;
pub mod utils;

pub use config::{CrawlOptions, FetchOptions, RefineOptions};
pub use convert::{ConversionOptions, html_to_markdown};
pub use crawl::{crawl, extract_links};
pub use error::{CrawlError, FetchError};
pub use fetch::{
    BrowserSession, FetchResult, Fetcher, fetch_static, fetch_static_with_tls_fallback,
};
pub use markdown::{add_citations, clean_markdown};
pub use refine::{extract_date, refine};
pub use urlnorm::NormalizedUrl;
pub use utils::url_to_slug;

/// Fetch a single page with the given strategy.
///
/// Static fetches go through the certificate fallback path; rendered
/// fetches require the session inside `fetcher` to be open.
pub async fn fetch_one(
    url: &str,
    fetcher: &mut Fetcher,
    options: &FetchOptions,
) -> Result<FetchResult, FetchError> {
    match fetcher {
        Fetcher::Static => fetch_static_with_tls_fallback(url, options).await,
        Fetcher::Rendered(_) => fetcher.fetch(url, options).await,
    }
}

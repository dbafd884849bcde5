//! Post-crawl result refinement: dedup, date sort, limit.
//!
//! Passes run in a fixed order when enabled (dedup, then sort, then
//! limit) so the option combinations compose predictably.

pub mod date;

pub use date::extract_date;

use std::collections::HashSet;

use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::config::RefineOptions;
use crate::convert::{ConversionOptions, html_to_markdown};
use crate::fetch::FetchResult;

/// Apply the enabled refinement passes to a crawl result set.
///
/// `conversion` must match the options the caller converts with, so the
/// dedup fingerprints key on the same content that gets emitted.
#[must_use]
pub fn refine(
    results: Vec<FetchResult>,
    options: &RefineOptions,
    conversion: &ConversionOptions,
) -> Vec<FetchResult> {
    let mut results = results;

    if options.dedupe {
        results = dedupe_by_fingerprint(results, conversion);
    }
    if options.sort_by_date {
        results = sort_by_date(results);
    }
    if let Some(limit) = options.limit {
        results.truncate(limit);
    }

    results
}

/// Content fingerprint for dedup equality. Computed over the converted
/// markdown so that pages differing only in markup noise still collide;
/// a conversion failure falls back to the raw HTML bytes.
fn fingerprint(result: &FetchResult, conversion: &ConversionOptions) -> u64 {
    match html_to_markdown(&result.html, conversion) {
        Ok(markdown) => xxh3_64(markdown.as_bytes()),
        Err(_) => xxh3_64(result.html.as_bytes()),
    }
}

/// Drop results whose content fingerprints collide, keeping the first.
fn dedupe_by_fingerprint(
    results: Vec<FetchResult>,
    conversion: &ConversionOptions,
) -> Vec<FetchResult> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(results.len());

    for result in results {
        if seen.insert(fingerprint(&result, conversion)) {
            kept.push(result);
        } else {
            debug!(url = %result.final_url, "dropping duplicate content");
        }
    }

    kept
}

/// Sort newest first; undated results follow all dated ones in their
/// original relative order. The sort is stable, so ties keep crawl order.
fn sort_by_date(results: Vec<FetchResult>) -> Vec<FetchResult> {
    let mut dated: Vec<_> = results
        .into_iter()
        .map(|result| (extract_date(&result.html), result))
        .collect();

    // Reverse(None) sorts after every Reverse(Some(_)).
    dated.sort_by_key(|(date, _)| std::cmp::Reverse(*date));

    dated.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn page(url: &str, html: &str) -> FetchResult {
        FetchResult {
            html: html.to_string(),
            final_url: url.to_string(),
            status: 200,
            screenshot: None,
            pdf: None,
            headers: HashMap::new(),
        }
    }

    fn urls(results: &[FetchResult]) -> Vec<&str> {
        results.iter().map(|r| r.final_url.as_str()).collect()
    }

    #[test]
    fn dedupe_keeps_the_first_of_equal_content() {
        let results = vec![
            page("https://a.com/1", "<p>same body</p>"),
            page("https://a.com/2", "<p>different body</p>"),
            page("https://a.com/3", "<p>same body</p>"),
        ];
        let refined = refine(
            results,
            &RefineOptions::default().with_dedupe(true),
            &ConversionOptions::default(),
        );
        assert_eq!(urls(&refined), vec!["https://a.com/1", "https://a.com/2"]);
    }

    #[test]
    fn dedupe_ignores_markup_only_differences() {
        let results = vec![
            page("https://a.com/1", "<div><p>same body</p></div>"),
            page("https://a.com/2", "<p>same body</p>"),
        ];
        let refined = refine(
            results,
            &RefineOptions::default().with_dedupe(true),
            &ConversionOptions::default(),
        );
        assert_eq!(urls(&refined), vec!["https://a.com/1"]);
    }

    #[test]
    fn dedupe_keys_on_the_callers_conversion_options() {
        // Same article body, different nav chrome. With boilerplate
        // stripping the pages collide; in raw mode the nav text is part
        // of the content and both survive.
        let results = || {
            vec![
                page(
                    "https://a.com/1",
                    "<nav>menu one</nav><p>same body</p>",
                ),
                page(
                    "https://a.com/2",
                    "<nav>menu two</nav><p>same body</p>",
                ),
            ]
        };
        let options = RefineOptions::default().with_dedupe(true);

        let stripped = refine(results(), &options, &ConversionOptions::default());
        assert_eq!(urls(&stripped), vec!["https://a.com/1"]);

        let raw = ConversionOptions {
            strip_boilerplate: false,
            selector: None,
        };
        let kept = refine(results(), &options, &raw);
        assert_eq!(urls(&kept), vec!["https://a.com/1", "https://a.com/2"]);
    }

    #[test]
    fn sort_puts_newest_first_and_undated_last() {
        let results = vec![
            page("old", r#"<meta name="date" content="2020-01-01">"#),
            page("undated-1", "<p>no date</p>"),
            page("new", r#"<meta name="date" content="2024-05-05">"#),
            page("undated-2", "<p>also no date</p>"),
        ];
        let refined = refine(
            results,
            &RefineOptions::default().with_sort_by_date(true),
            &ConversionOptions::default(),
        );
        assert_eq!(urls(&refined), vec!["new", "old", "undated-1", "undated-2"]);
    }

    #[test]
    fn limit_truncates_after_the_other_passes() {
        let results = vec![
            page("old", r#"<meta name="date" content="2020-01-01">"#),
            page("new", r#"<meta name="date" content="2024-05-05">"#),
            page("mid", r#"<meta name="date" content="2022-03-03">"#),
        ];
        let options = RefineOptions::default()
            .with_sort_by_date(true)
            .with_limit(2);
        let refined = refine(results, &options, &ConversionOptions::default());
        assert_eq!(urls(&refined), vec!["new", "mid"]);
    }

    #[test]
    fn no_passes_enabled_is_the_identity() {
        let results = vec![page("a", "<p>x</p>"), page("b", "<p>x</p>")];
        let refined = refine(
            results,
            &RefineOptions::default(),
            &ConversionOptions::default(),
        );
        assert_eq!(urls(&refined), vec!["a", "b"]);
    }
}

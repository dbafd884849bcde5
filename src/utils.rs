//! Small shared helpers.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-Z0-9]+").expect("NON_ALNUM: hardcoded regex is valid")
});

/// Filesystem-safe filename stem derived from a URL's host and path.
///
/// Non-alphanumeric runs collapse to single underscores; the result is
/// capped at 100 characters and falls back to `page` when nothing
/// usable remains.
#[must_use]
pub fn url_to_slug(url: &str) -> String {
    let raw = match Url::parse(url) {
        Ok(parsed) => format!("{}{}", parsed.host_str().unwrap_or_default(), parsed.path()),
        Err(_) => url.to_string(),
    };

    let slug = NON_ALNUM.replace_all(&raw, "_");
    let slug = slug.trim_matches('_');

    if slug.is_empty() {
        "page".to_string()
    } else {
        slug.chars().take(100).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_joins_host_and_path_with_underscores() {
        assert_eq!(
            url_to_slug("https://example.com/docs/getting-started"),
            "example_com_docs_getting_started"
        );
    }

    #[test]
    fn slug_strips_leading_and_trailing_separators() {
        assert_eq!(url_to_slug("https://example.com/"), "example_com");
    }

    #[test]
    fn slug_is_capped_at_100_chars() {
        let long = format!("https://example.com/{}", "a".repeat(300));
        assert_eq!(url_to_slug(&long).len(), 100);
    }

    #[test]
    fn unusable_input_falls_back_to_page() {
        assert_eq!(url_to_slug("///"), "page");
    }
}

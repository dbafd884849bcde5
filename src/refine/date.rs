//! Best-effort publication date extraction.
//!
//! Tries, in order: standard date meta tags, `<time datetime>` elements,
//! then date-looking patterns in the first part of the visible text. All
//! failures collapse to `None`; a page simply has no date.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Meta keys checked in priority order, matched against either the
/// `name` or the `property` attribute.
const DATE_META_NAMES: &[&str] = &[
    "date",
    "published",
    "datePublished",
    "article:published_time",
    "og:article:published_time",
    "pubdate",
    "publish_date",
    "DC.date.issued",
    "sailthru.date",
];

/// How much visible text to scan for a date pattern.
const TEXT_SCAN_CHARS: usize = 1000;

static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("META: hardcoded selector is valid"));

static TIME_DATETIME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("time[datetime]").expect("TIME_DATETIME: hardcoded selector is valid")
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}").expect("ISO_DATE: hardcoded regex is valid")
});

static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}",
    )
    .expect("MONTH_DAY_YEAR: hardcoded regex is valid")
});

static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\d{1,2}\s+(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}",
    )
    .expect("DAY_MONTH_YEAR: hardcoded regex is valid")
});

/// Extract a publication date from a page, if any source yields one.
#[must_use]
pub fn extract_date(html: &str) -> Option<NaiveDate> {
    let document = Html::parse_document(html);

    // First-seen meta content by key, name taking priority over property.
    let mut by_name: HashMap<&str, &str> = HashMap::new();
    let mut by_property: HashMap<&str, &str> = HashMap::new();
    for meta in document.select(&META) {
        let Some(content) = meta.value().attr("content") else {
            continue;
        };
        if let Some(name) = meta.value().attr("name") {
            by_name.entry(name).or_insert(content);
        }
        if let Some(property) = meta.value().attr("property") {
            by_property.entry(property).or_insert(content);
        }
    }

    for key in DATE_META_NAMES {
        let content = by_name.get(key).or_else(|| by_property.get(key));
        if let Some(date) = content.and_then(|c| parse_date_string(c)) {
            return Some(date);
        }
    }

    if let Some(time) = document.select(&TIME_DATETIME).next()
        && let Some(date) = time.value().attr("datetime").and_then(parse_date_string)
    {
        return Some(date);
    }

    let text: String = document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    let scan: String = text.chars().take(TEXT_SCAN_CHARS).collect();
    find_date_in_text(&scan)
}

/// Parse a machine-readable date string (ISO 8601 or plain `YYYY-MM-DD`).
fn parse_date_string(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.contains('T') {
        if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(value) {
            return Some(datetime.date_naive());
        }
        // Datetimes with no offset still carry the date up front.
    }
    let prefix: String = value.chars().take(10).collect();
    NaiveDate::parse_from_str(&prefix, "%Y-%m-%d").ok()
}

/// Scan free text for the first recognizable date.
fn find_date_in_text(text: &str) -> Option<NaiveDate> {
    if let Some(m) = ISO_DATE.find(text)
        && let Ok(date) = NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d")
    {
        return Some(date);
    }

    if let Some(m) = MONTH_DAY_YEAR.find(text) {
        let cleaned = m.as_str().replace([',', '.'], "");
        for format in ["%B %d %Y", "%b %d %Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
                return Some(date);
            }
        }
    }

    if let Some(m) = DAY_MONTH_YEAR.find(text)
        && let Ok(date) = NaiveDate::parse_from_str(m.as_str(), "%d %B %Y")
    {
        return Some(date);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reads_meta_name_tags() {
        let html = r#"<meta name="date" content="2024-03-15"><p>body</p>"#;
        assert_eq!(extract_date(html), Some(date(2024, 3, 15)));
    }

    #[test]
    fn reads_meta_property_tags() {
        let html =
            r#"<meta property="article:published_time" content="2023-11-02T08:30:00Z">"#;
        assert_eq!(extract_date(html), Some(date(2023, 11, 2)));
    }

    #[test]
    fn meta_priority_follows_the_key_order() {
        // "date" outranks "published" regardless of document order.
        let html = concat!(
            r#"<meta name="published" content="2020-01-01">"#,
            r#"<meta name="date" content="2024-06-30">"#,
        );
        assert_eq!(extract_date(html), Some(date(2024, 6, 30)));
    }

    #[test]
    fn falls_back_to_time_elements() {
        let html = r#"<time datetime="2022-07-04">July 4th</time>"#;
        assert_eq!(extract_date(html), Some(date(2022, 7, 4)));
    }

    #[test]
    fn finds_prose_dates_in_leading_text() {
        assert_eq!(
            extract_date("<p>Published March 5, 2021 by staff</p>"),
            Some(date(2021, 3, 5))
        );
        assert_eq!(
            extract_date("<p>Updated 17 August 2019</p>"),
            Some(date(2019, 8, 17))
        );
    }

    #[test]
    fn undated_pages_yield_none() {
        assert_eq!(extract_date("<p>No dates here at all.</p>"), None);
        assert_eq!(extract_date(""), None);
    }

    #[test]
    fn unparseable_meta_values_fall_through() {
        let html = concat!(
            r#"<meta name="date" content="last Tuesday">"#,
            r#"<time datetime="2022-01-09">x</time>"#,
        );
        assert_eq!(extract_date(html), Some(date(2022, 1, 9)));
    }
}

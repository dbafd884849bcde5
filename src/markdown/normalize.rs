//! Deterministic cleanup passes for converter output.
//!
//! Four ordered passes repair common HTML-to-markdown artifacts. Each is
//! pure and total; [`clean_markdown`] runs them all and trims the result.

use fancy_regex::Regex as FancyRegex;
use regex::Regex;
use std::sync::LazyLock;

/// A bare ATX heading marker with nothing after it.
static ORPHAN_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6})\s*$").expect("ORPHAN_HEADING: hardcoded regex is valid")
});

/// `text [N] text` where the trailing text repeats the leading text.
/// Needs a backreference, hence fancy-regex.
static DUPLICATED_CITATION: LazyLock<FancyRegex> = LazyLock::new(|| {
    FancyRegex::new(r"([\w][^\[\]]{0,60}?)\s*\[(\d+)\]\s*\1")
        .expect("DUPLICATED_CITATION: hardcoded regex is valid")
});

static EMPTY_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[\]\([^)]+\)\s*").expect("EMPTY_IMAGE: hardcoded regex is valid")
});

/// Empty non-image links; the lookbehind keeps `![](...)` out of reach
/// (those are handled by [`EMPTY_IMAGE`] first).
static EMPTY_LINK: LazyLock<FancyRegex> = LazyLock::new(|| {
    FancyRegex::new(r"(?<!!)\[\]\([^)]+\)\s*").expect("EMPTY_LINK: hardcoded regex is valid")
});

static EXCESS_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{4,}").expect("EXCESS_BLANK_LINES: hardcoded regex is valid")
});

/// Collapse word-per-line fragments that follow an orphaned heading marker.
///
/// Animated headings often wrap each word in its own element, which
/// converters render as a bare `#` line followed by one word per line.
/// A fragment is a non-blank line of at most three words that does not
/// start new structure (`#`, `-`, `*`, `[`, `|`, `>`, three backticks);
/// consumption stops at the first ineligible line. A marker with no
/// fragments after it is left alone.
#[must_use]
pub fn fix_heading_linebreaks(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut result = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(marker) = ORPHAN_HEADING.captures(line) {
            let level = &marker[1];

            let mut fragments = Vec::new();
            let mut j = i + 1;
            while j < lines.len() {
                let next = lines[j].trim();
                let structural = next.starts_with('#')
                    || next.starts_with('-')
                    || next.starts_with('*')
                    || next.starts_with('[')
                    || next.starts_with('|')
                    || next.starts_with('>')
                    || next.starts_with("```");
                if next.is_empty() || structural || next.split_whitespace().count() > 3 {
                    break;
                }
                fragments.push(next);
                j += 1;
            }

            if !fragments.is_empty() {
                result.push(format!("{level} {}", fragments.join(" ")));
                i = j;
                continue;
            }
        }

        result.push(line.to_string());
        i += 1;
    }

    result.join("\n")
}

/// Repair citation markers that duplicate their adjacent link text,
/// `Contact sales[39]Contact sales` becoming `Contact sales[39]`.
#[must_use]
pub fn fix_citation_duplication(markdown: &str) -> String {
    DUPLICATED_CITATION
        .replace_all(markdown, "${1}[${2}]")
        .into_owned()
}

/// Remove empty links, `![](url)` and `[](url)`, with any trailing
/// whitespace. Linked images with alt text (`[![alt](img)](url)`) are
/// left untouched.
#[must_use]
pub fn strip_empty_links(markdown: &str) -> String {
    let markdown = EMPTY_IMAGE.replace_all(markdown, "");
    EMPTY_LINK.replace_all(&markdown, "").into_owned()
}

/// Cap runs of blank lines at two.
#[must_use]
pub fn collapse_blank_lines(markdown: &str) -> String {
    EXCESS_BLANK_LINES.replace_all(markdown, "\n\n\n").into_owned()
}

/// Run every cleanup pass, in order, and trim the result.
///
/// Order matters: heading repair is structural and runs first, blank-line
/// collapsing is formatting and runs last. Empty input stays empty.
#[must_use]
pub fn clean_markdown(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let markdown = fix_heading_linebreaks(markdown);
    let markdown = fix_citation_duplication(&markdown);
    let markdown = strip_empty_links(&markdown);
    let markdown = collapse_blank_lines(&markdown);
    markdown.trim().to_string()
}

//! Inline links to numbered citations.
//!
//! `[text](url)` becomes `text [N]`, with a `## References` block mapping
//! each number back to its URL. Numbers are assigned per distinct URL in
//! first-encounter order, so repeated links share a number.

use fancy_regex::{Captures, Regex as FancyRegex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Inline non-image links. The lookbehind excludes `![alt](src)` images,
/// which keep their markdown form.
static INLINE_LINK: LazyLock<FancyRegex> = LazyLock::new(|| {
    FancyRegex::new(r"(?<!!)\[([^\]]*)\]\(([^)]+)\)")
        .expect("INLINE_LINK: hardcoded regex is valid")
});

/// Replace inline links with numbered citation markers.
///
/// Returns the annotated markdown and the references block. In-page
/// anchors (`#fragment` targets) are left as-is and get no number. With
/// no eligible links the input comes back unchanged and the references
/// block is empty.
#[must_use]
pub fn add_citations(markdown: &str) -> (String, String) {
    if markdown.is_empty() {
        return (String::new(), String::new());
    }

    let mut order: Vec<String> = Vec::new();
    let mut numbers: HashMap<String, usize> = HashMap::new();

    let cited = INLINE_LINK.replace_all(markdown, |caps: &Captures| {
        let text = caps.get(1).map_or("", |m| m.as_str());
        let url = caps.get(2).map_or("", |m| m.as_str());

        if url.starts_with('#') {
            return caps.get(0).map_or(String::new(), |m| m.as_str().to_string());
        }

        let number = *numbers.entry(url.to_string()).or_insert_with(|| {
            order.push(url.to_string());
            order.len()
        });

        if text.trim().is_empty() {
            format!("[{number}]")
        } else {
            format!("{text} [{number}]")
        }
    });

    if order.is_empty() {
        return (markdown.to_string(), String::new());
    }

    let mut lines = vec![String::new(), "## References".to_string(), String::new()];
    for (index, url) in order.iter().enumerate() {
        lines.push(format!("[{}] {url}", index + 1));
    }

    (cited.into_owned(), lines.join("\n"))
}

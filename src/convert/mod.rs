//! HTML to Markdown conversion seam.
//!
//! Wraps the htmd converter behind the narrow interface the rest of the
//! pipeline consumes: selector targeting, boilerplate tag stripping, then
//! conversion and output cleanup. A full readability-style extraction
//! algorithm stays an external collaborator; what lives here is only the
//! wiring this crate needs.

use anyhow::Result;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// Tags that never carry article content.
const NOISE_TAGS: &[&str] = &["script", "style"];

/// Chrome tags stripped when boilerplate removal is on.
const BOILERPLATE_TAGS: &[&str] = &["nav", "footer", "header", "aside"];

static EXCESS_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{4,}").expect("EXCESS_BLANK_LINES: hardcoded regex is valid")
});

/// How the converter targets and trims the input HTML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Strip page chrome (nav, footer, header, aside) before converting.
    pub strip_boilerplate: bool,
    /// CSS selector for content targeting; takes priority over
    /// boilerplate stripping. An empty selection falls through to the
    /// whole document.
    pub selector: Option<String>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            strip_boilerplate: true,
            selector: None,
        }
    }
}

/// Convert HTML to clean markdown (ATX headings, `-` bullets).
pub fn html_to_markdown(html: &str, options: &ConversionOptions) -> Result<String> {
    if html.trim().is_empty() {
        return Ok(String::new());
    }

    let mut content = html;
    let selected;
    if let Some(selector) = &options.selector {
        match select_fragments(html, selector) {
            Some(fragment) => {
                selected = fragment;
                content = &selected;
            }
            None => debug!(%selector, "selector matched nothing, converting whole document"),
        }
    }

    let mut skip: Vec<&str> = NOISE_TAGS.to_vec();
    if options.strip_boilerplate {
        skip.extend_from_slice(BOILERPLATE_TAGS);
    }

    let converter = htmd::HtmlToMarkdown::builder().skip_tags(skip).build();
    let markdown = converter
        .convert(content)
        .map_err(|e| anyhow::anyhow!("markdown conversion failed: {e}"))?;

    Ok(clean_output(&markdown))
}

/// Join the outer HTML of every element matching `selector`.
fn select_fragments(html: &str, selector: &str) -> Option<String> {
    let Ok(selector) = Selector::parse(selector) else {
        debug!("invalid content selector, ignoring");
        return None;
    };

    let document = Html::parse_document(html);
    let fragments: Vec<String> = document
        .select(&selector)
        .map(|element| element.html())
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join("\n"))
    }
}

/// Converter output cleanup: trailing whitespace per line, blank-line
/// runs capped, result trimmed.
fn clean_output(markdown: &str) -> String {
    let markdown = EXCESS_BLANK_LINES.replace_all(markdown, "\n\n\n");

    let trimmed: Vec<&str> = markdown.split('\n').map(str::trim_end).collect();
    trimmed.join("\n").trim().to_string()
}

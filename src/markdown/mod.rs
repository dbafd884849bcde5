//! Markdown post-processing and citation annotation.
//!
//! Everything here is pure text-to-text: the passes never fail, never
//! touch the network, and operate on converter output only.

pub mod citations;
pub mod normalize;

pub use citations::add_citations;
pub use normalize::clean_markdown;

/// Clean converted markdown and, when requested, annotate its inline
/// links with numbered citations and append the references block.
#[must_use]
pub fn finalize(markdown: &str, citations: bool) -> String {
    let cleaned = clean_markdown(markdown);
    if !citations {
        return cleaned;
    }

    let (cited, references) = add_citations(&cleaned);
    if references.is_empty() {
        cited
    } else {
        format!("{cited}\n{references}")
    }
}

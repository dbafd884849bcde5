// Byte-level scenarios for the markdown cleanup passes and the citation
// engine, end to end through the public API.

use sitemark::{add_citations, clean_markdown, extract_links};

#[test]
fn duplicated_citation_text_is_repaired() {
    assert_eq!(
        clean_markdown("Contact sales[39]Contact sales"),
        "Contact sales[39]"
    );
}

#[test]
fn orphaned_heading_is_reassembled() {
    let input = "#\nComplete\nGuide\nto\n\nBody text.";
    assert_eq!(clean_markdown(input), "# Complete Guide to\n\nBody text.");
}

#[test]
fn empty_image_links_are_stripped_but_alt_images_kept() {
    assert_eq!(
        clean_markdown("Before ![](https://x.com/img.png) After"),
        "Before After"
    );
    assert_eq!(
        clean_markdown("![alt](https://x.com/img.png)"),
        "![alt](https://x.com/img.png)"
    );
}

#[test]
fn citations_number_urls_in_first_seen_order() {
    let input = "See [one](https://a.com) then [two](https://b.com) then [one again](https://a.com).";
    let (cited, references) = add_citations(input);
    assert_eq!(cited, "See one [1] then two [2] then one again [1].");
    assert_eq!(
        references,
        "\n## References\n\n[1] https://a.com\n[2] https://b.com"
    );
}

#[test]
fn cleanup_then_citation_composes() {
    let input = "#\nRelease\nNotes\n\nRead [more](https://a.com/notes).\n\n\n\n\nEnd.";
    let cleaned = clean_markdown(input);
    let (cited, references) = add_citations(&cleaned);

    assert!(cited.starts_with("# Release Notes"));
    assert!(cited.contains("more [1]"));
    assert!(!cited.contains("\n\n\n\n"));
    assert_eq!(references, "\n## References\n\n[1] https://a.com/notes");
}

#[test]
fn cleanup_is_idempotent() {
    let input = "#\nQuick\nStart\n\nSales[3]Sales and ![](https://x.com/i.png) done.\n\n\n\n\nEnd.";
    let once = clean_markdown(input);
    assert_eq!(clean_markdown(&once), once);
}

#[test]
fn citation_pass_is_stable_on_annotated_text() {
    let (once, _) = add_citations("Read [this](https://a.com).");
    let (twice, references) = add_citations(&once);
    assert_eq!(twice, once);
    assert_eq!(references, "");
}

#[test]
fn link_extraction_dedups_trailing_slash_variants() {
    let html = concat!(
        r#"<a href="/page">a</a>"#,
        r#"<a href="/page/">b</a>"#,
        r#"<a href="/page#section">c</a>"#,
    );
    let links = extract_links(html, "https://example.com/", "example.com");
    assert_eq!(links, vec!["https://example.com/page".to_string()]);
}

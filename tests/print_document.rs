mod common;

use richdoc_export::print::{PRINT_DELAY_MS, css_content, render_print_document};
use richdoc_export::template::HeaderFooterSettings;

#[test]
fn page_rule_matches_format() {
    let doc = render_print_document("<p>x</p>", &common::options("a4", Default::default()));
    assert!(doc.contains("size: 8.27in 11.69in;"), "{doc}");
    assert!(doc.contains("margin: 1in 1in 1in 1in;"));

    let a5 = render_print_document("<p>x</p>", &common::options("a5", Default::default()));
    assert!(a5.contains("size: 5.83in 8.27in;"));
    assert!(a5.contains("margin: 0.75in"));
}

#[test]
fn footer_uses_page_counter() {
    let doc = render_print_document("<p>x</p>", &Default::default());
    assert!(doc.contains(r#"@bottom-right { content: "Page " counter(page);"#));
    assert!(!doc.contains("@top-left"));
}

#[test]
fn empty_templates_add_no_margin_boxes() {
    let doc = render_print_document(
        "<p>x</p>",
        &common::options("letter", HeaderFooterSettings::empty()),
    );
    assert!(!doc.contains("counter(page)"));
    assert!(!doc.contains("@bottom-right"));
}

#[test]
fn content_is_embedded_verbatim() {
    let html = r##"<h1>Title</h1><p><mark data-color="#bbf7d0">hi</mark></p>"##;
    let doc = render_print_document(html, &Default::default());
    assert!(doc.starts_with("<!DOCTYPE html>"));
    assert!(doc.contains(html));
    assert!(doc.contains(&format!("}}, {PRINT_DELAY_MS});")));
}

#[test]
fn template_text_cannot_close_the_style_element() {
    assert_eq!(css_content("</style>"), r#""\3C /style>""#);
    assert_eq!(css_content("a\nb"), r#""a\A b""#);
}

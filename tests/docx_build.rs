mod common;

use richdoc_export::docx::{self, BodyElement, HighlightColor, ParagraphChild};
use richdoc_export::html::normalize;
use richdoc_export::render_docx;
use richdoc_export::template::HeaderFooterSettings;

const SAMPLE: &str =
    "<h1>Title</h1><p><u>Hello</u> world</p><table><tr><th>A</th></tr><tr><td>1</td></tr></table>";

#[test]
fn round_trip_through_the_package() {
    common::init_logging();
    let bytes = render_docx(SAMPLE, &Default::default()).expect("render");
    let xml = common::docx_part(&bytes, "word/document.xml").expect("document part");
    let tree = roxmltree::Document::parse(&xml).expect("well-formed document.xml");
    let body = common::w_children(tree.root(), "body").next().expect("body");

    let blocks: Vec<_> = body
        .children()
        .filter(|n| n.is_element() && matches!(n.tag_name().name(), "p" | "tbl"))
        .collect();
    assert_eq!(blocks[0].tag_name().name(), "p");
    let style = common::w_children(blocks[0], "pStyle").next().expect("pStyle");
    assert_eq!(common::w_attr(style, "val"), Some("Heading1"));

    let runs: Vec<_> = common::w_children(blocks[1], "r").collect();
    assert_eq!(runs.len(), 2);
    assert!(common::w_children(runs[0], "u").next().is_some());
    assert!(common::w_children(runs[1], "u").next().is_none());
    let texts: Vec<&str> = common::w_children(blocks[1], "t")
        .filter_map(|t| t.text())
        .collect();
    assert_eq!(texts, vec!["Hello", " world"]);

    let table = blocks[2];
    assert_eq!(table.tag_name().name(), "tbl");
    let cells: Vec<_> = common::w_children(table, "tc").collect();
    assert_eq!(cells.len(), 2);
    let shd = common::w_children(cells[0], "shd").next().expect("header shading");
    assert_eq!(common::w_attr(shd, "fill"), Some("F0F0F0"));
    assert!(common::w_children(cells[1], "shd").next().is_none());
    let cell_text = |cell: roxmltree::Node| -> String {
        common::w_children(cell, "t").filter_map(|t| t.text()).collect()
    };
    assert_eq!(cell_text(cells[0]), "A");
    assert_eq!(cell_text(cells[1]), "1");

    let tbl_w = common::w_children(table, "tblW").next().expect("tblW");
    assert_eq!(common::w_attr(tbl_w, "type"), Some("pct"));
    assert_eq!(common::w_attr(tbl_w, "w"), Some("5000"));
}

#[test]
fn package_contains_required_parts() {
    let bytes = render_docx("<p>x</p>", &Default::default()).expect("render");
    let names = common::docx_part_names(&bytes);
    for part in [
        "[Content_Types].xml",
        "_rels/.rels",
        "word/document.xml",
        "word/styles.xml",
        "word/_rels/document.xml.rels",
        "word/footer1.xml",
    ] {
        assert!(names.iter().any(|n| n == part), "missing {part}");
    }
    assert!(!names.iter().any(|n| n == "word/header1.xml"));
    for name in &names {
        let xml = common::docx_part(&bytes, name).expect("readable part");
        roxmltree::Document::parse(&xml).unwrap_or_else(|e| panic!("{name}: {e}"));
    }
}

#[test]
fn section_uses_twips() {
    let bytes = render_docx("<p>x</p>", &common::options("letter", Default::default()))
        .expect("render");
    let xml = common::docx_part(&bytes, "word/document.xml").expect("document part");
    assert!(xml.contains(r#"<w:pgSz w:w="12240" w:h="15840"/>"#));
    assert!(xml.contains(r#"w:top="1440" w:right="1440" w:bottom="1440" w:left="1440""#));

    let a5 = docx::build(&normalize("<p>x</p>"), &common::options("a5", Default::default()));
    assert_eq!(a5.section.margin_left, 1080);
}

#[test]
fn footer_carries_a_live_page_field() {
    let bytes = render_docx("<p>x</p>", &Default::default()).expect("render");
    let footer = common::docx_part(&bytes, "word/footer1.xml").expect("footer part");
    assert!(footer.contains(r#"<w:fldChar w:fldCharType="begin"/>"#));
    assert!(footer.contains(" PAGE "));
    assert!(footer.contains(r#"<w:tab w:val="right" w:pos="9360"/>"#));
    assert!(footer.contains(">Page </w:t>"));
}

#[test]
fn header_page_token_becomes_field() {
    let settings = HeaderFooterSettings {
        header_right: "Page {page}".to_string(),
        ..HeaderFooterSettings::empty()
    };
    let bytes = render_docx("<p>x</p>", &common::options("a4", settings)).expect("render");
    let header = common::docx_part(&bytes, "word/header1.xml").expect("header part");
    assert!(header.contains(r#"<w:instrText xml:space="preserve"> PAGE </w:instrText>"#));
    let rels = common::docx_part(&bytes, "word/_rels/document.xml.rels").expect("rels");
    assert!(rels.contains(r#"Target="header1.xml""#));
    assert!(!rels.contains("footer1.xml"));
}

#[test]
fn header_without_token_is_literal() {
    let settings = HeaderFooterSettings {
        header_left: "Draft".to_string(),
        ..HeaderFooterSettings::empty()
    };
    let doc = docx::build(&normalize("<p>x</p>"), &common::options("letter", settings));
    let header = doc.header.expect("header paragraph");
    assert_eq!(header.text(), "Draft");
    assert!(!header.children.contains(&ParagraphChild::PageNumber));
    assert!(!header.children.contains(&ParagraphChild::Tab));
    assert!(doc.footer.is_none());
}

#[test]
fn no_parts_for_empty_header_footer() {
    let opts = common::options("letter", HeaderFooterSettings::empty());
    let bytes = render_docx("<p>x</p>", &opts).expect("render");
    let names = common::docx_part_names(&bytes);
    assert!(!names.iter().any(|n| n.contains("header") || n.contains("footer")));
    let xml = common::docx_part(&bytes, "word/document.xml").expect("document part");
    assert!(!xml.contains("headerReference"));
}

#[test]
fn list_items_get_literal_markers_and_indent() {
    let doc = docx::build(
        &normalize("<ol><li>first</li><li>second<ul><li>deep</li></ul></li></ol>"),
        &Default::default(),
    );
    let paras: Vec<_> = doc
        .body
        .iter()
        .map(|b| match b {
            BodyElement::Paragraph(p) => p,
            BodyElement::Table(_) => panic!("unexpected table"),
        })
        .collect();
    assert_eq!(paras[0].text(), "1. first");
    assert_eq!(paras[1].text(), "2. second");
    assert_eq!(paras[2].text(), "\u{2022} deep");
    assert_eq!(paras[0].indent_left, Some(720));
    assert_eq!(paras[2].indent_left, Some(1080));
}

#[test]
fn highlights_map_to_palette() {
    let doc = docx::build(
        &normalize(
            r##"<p><mark>a</mark><mark data-color="#bbf7d0">b</mark><mark data-color="rgb(1,2,3)">c</mark></p>"##,
        ),
        &Default::default(),
    );
    let BodyElement::Paragraph(p) = &doc.body[0] else {
        panic!("expected paragraph");
    };
    let colours: Vec<_> = p.runs().map(|r| r.highlight).collect();
    assert_eq!(
        colours,
        vec![
            Some(HighlightColor::Yellow),
            Some(HighlightColor::Green),
            Some(HighlightColor::Yellow),
        ]
    );
}

#[test]
fn special_characters_are_escaped() {
    let bytes = render_docx("<p>a &lt;b&gt; &amp; \"c\"</p>", &Default::default())
        .expect("render");
    let xml = common::docx_part(&bytes, "word/document.xml").expect("document part");
    let tree = roxmltree::Document::parse(&xml).expect("well-formed");
    let text: String = common::w_children(tree.root(), "t")
        .filter_map(|t| t.text())
        .collect();
    assert_eq!(text, "a <b> & \"c\"");
}

#[test]
fn control_characters_do_not_break_the_xml() {
    let bytes = render_docx("<p>tab\u{b}bed \u{1}x</p>", &Default::default()).expect("render");
    let xml = common::docx_part(&bytes, "word/document.xml").expect("document part");
    let tree = roxmltree::Document::parse(&xml).expect("well-formed");
    let text: String = common::w_children(tree.root(), "t")
        .filter_map(|t| t.text())
        .collect();
    assert_eq!(text, "tabbed x");
}

#[test]
fn trailing_table_is_followed_by_a_paragraph() {
    let bytes = render_docx("<table><tr><td>x</td></tr></table>", &Default::default())
        .expect("render");
    let xml = common::docx_part(&bytes, "word/document.xml").expect("document part");
    assert!(xml.contains("</w:tbl><w:p/><w:sectPr>"));
}

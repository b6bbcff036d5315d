//! Serializes a [`DocxDocument`] into WordprocessingML parts and zips them.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Error;
use crate::model::Alignment;

use super::styles::styles_xml;
use super::{
    BodyElement, DocxDocument, DocxParagraph, DocxRun, DocxTable, ParagraphChild, REL_NS,
    SectionSetup, TABLE_WIDTH_PCT, WML_NS,
};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// Distance of header and footer from the page edge.
const HEADER_FOOTER_DISTANCE: u32 = 720;

pub const HEADER_PART: &str = "word/header1.xml";
pub const FOOTER_PART: &str = "word/footer1.xml";

fn jc_value(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

fn write_run(xml: &mut String, run: &DocxRun) {
    xml.push_str("<w:r>");
    let has_props =
        run.bold || run.italic || run.strike || run.underline || run.highlight.is_some();
    if has_props {
        xml.push_str("<w:rPr>");
        if run.bold {
            xml.push_str("<w:b/>");
        }
        if run.italic {
            xml.push_str("<w:i/>");
        }
        if run.strike {
            xml.push_str("<w:strike/>");
        }
        if let Some(h) = run.highlight {
            xml.push_str(&format!(r#"<w:highlight w:val="{}"/>"#, h.as_str()));
        }
        if run.underline {
            xml.push_str(r#"<w:u w:val="single"/>"#);
        }
        xml.push_str("</w:rPr>");
    }
    let text: String = run.text.chars().filter(|&c| is_xml_char(c)).collect();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        if !line.is_empty() || i == 0 {
            xml.push_str(&format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape(line)
            ));
        }
    }
    xml.push_str("</w:r>");
}

/// Characters XML 1.0 allows in character data.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn write_page_field(xml: &mut String) {
    xml.push_str(r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#);
    xml.push_str(r#"<w:r><w:instrText xml:space="preserve"> PAGE </w:instrText></w:r>"#);
    xml.push_str(r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#);
    xml.push_str("<w:r><w:t>1</w:t></w:r>");
    xml.push_str(r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#);
}

fn write_paragraph(xml: &mut String, para: &DocxParagraph) {
    xml.push_str("<w:p>");
    let has_props = para.style.is_some()
        || para.alignment.is_some()
        || para.spacing_after.is_some()
        || para.indent_left.is_some()
        || !para.right_tabs.is_empty();
    if has_props {
        xml.push_str("<w:pPr>");
        if let Some(style) = &para.style {
            xml.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape(style.as_str())));
        }
        if !para.right_tabs.is_empty() {
            xml.push_str("<w:tabs>");
            for pos in &para.right_tabs {
                xml.push_str(&format!(r#"<w:tab w:val="right" w:pos="{pos}"/>"#));
            }
            xml.push_str("</w:tabs>");
        }
        if let Some(after) = para.spacing_after {
            xml.push_str(&format!(r#"<w:spacing w:after="{after}"/>"#));
        }
        if let Some(left) = para.indent_left {
            xml.push_str(&format!(r#"<w:ind w:left="{left}"/>"#));
        }
        if let Some(alignment) = para.alignment {
            xml.push_str(&format!(r#"<w:jc w:val="{}"/>"#, jc_value(alignment)));
        }
        xml.push_str("</w:pPr>");
    }
    for child in &para.children {
        match child {
            ParagraphChild::Run(run) => write_run(xml, run),
            ParagraphChild::Tab => xml.push_str("<w:r><w:tab/></w:r>"),
            ParagraphChild::PageNumber => write_page_field(xml),
        }
    }
    xml.push_str("</w:p>");
}

fn write_table(xml: &mut String, table: &DocxTable, content_width: u32) {
    let col_width = content_width / table.columns.max(1) as u32;
    xml.push_str("<w:tbl><w:tblPr>");
    xml.push_str(&format!(
        r#"<w:tblW w:w="{TABLE_WIDTH_PCT}" w:type="pct"/>"#
    ));
    xml.push_str("<w:tblBorders>");
    for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        xml.push_str(&format!(
            r#"<w:{side} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#
        ));
    }
    xml.push_str("</w:tblBorders></w:tblPr><w:tblGrid>");
    for _ in 0..table.columns {
        xml.push_str(&format!(r#"<w:gridCol w:w="{col_width}"/>"#));
    }
    xml.push_str("</w:tblGrid>");

    for row in &table.rows {
        xml.push_str("<w:tr>");
        if row.cells.iter().any(|c| c.is_header) {
            xml.push_str("<w:trPr><w:tblHeader/></w:trPr>");
        }
        for cell in &row.cells {
            xml.push_str("<w:tc><w:tcPr>");
            xml.push_str(&format!(r#"<w:tcW w:w="{col_width}" w:type="dxa"/>"#));
            if let Some(fill) = cell.shading {
                xml.push_str(&format!(
                    r#"<w:shd w:val="clear" w:color="auto" w:fill="{fill}"/>"#
                ));
            }
            xml.push_str("</w:tcPr>");
            write_paragraph(xml, &cell.paragraph);
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
}

fn write_section(xml: &mut String, s: &SectionSetup, header: bool, footer: bool) {
    xml.push_str("<w:sectPr>");
    if header {
        xml.push_str(r#"<w:headerReference w:type="default" r:id="rId3"/>"#);
    }
    if footer {
        xml.push_str(r#"<w:footerReference w:type="default" r:id="rId4"/>"#);
    }
    xml.push_str(&format!(
        r#"<w:pgSz w:w="{}" w:h="{}"/>"#,
        s.page_width, s.page_height
    ));
    xml.push_str(&format!(
        r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{d}" w:footer="{d}" w:gutter="0"/>"#,
        s.margin_top,
        s.margin_right,
        s.margin_bottom,
        s.margin_left,
        d = HEADER_FOOTER_DISTANCE,
    ));
    xml.push_str("</w:sectPr>");
}

pub fn document_xml(doc: &DocxDocument) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push('\n');
    xml.push_str(&format!(
        r#"<w:document xmlns:w="{WML_NS}" xmlns:r="{REL_NS}"><w:body>"#
    ));
    let content_width = doc.section.content_width();
    for element in &doc.body {
        match element {
            BodyElement::Paragraph(p) => write_paragraph(&mut xml, p),
            BodyElement::Table(t) => write_table(&mut xml, t, content_width),
        }
    }
    // Word rejects a body whose last block before sectPr is a table.
    if matches!(doc.body.last(), Some(BodyElement::Table(_))) {
        xml.push_str("<w:p/>");
    }
    write_section(
        &mut xml,
        &doc.section,
        doc.header.is_some(),
        doc.footer.is_some(),
    );
    xml.push_str("</w:body></w:document>");
    xml
}

fn header_footer_xml(root: &str, para: &DocxParagraph) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push('\n');
    xml.push_str(&format!(
        r#"<w:{root} xmlns:w="{WML_NS}" xmlns:r="{REL_NS}">"#
    ));
    write_paragraph(&mut xml, para);
    xml.push_str(&format!("</w:{root}>"));
    xml
}

fn content_types_xml(header: bool, footer: bool) -> String {
    const MAIN: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml";
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push('\n');
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    let mut overrides = vec![
        ("/word/document.xml", format!("{MAIN}.document.main+xml")),
        ("/word/styles.xml", format!("{MAIN}.styles+xml")),
        ("/word/settings.xml", format!("{MAIN}.settings+xml")),
        (
            "/docProps/core.xml",
            "application/vnd.openxmlformats-package.core-properties+xml".to_string(),
        ),
    ];
    if header {
        overrides.push(("/word/header1.xml", format!("{MAIN}.header+xml")));
    }
    if footer {
        overrides.push(("/word/footer1.xml", format!("{MAIN}.footer+xml")));
    }
    for (part, content_type) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn relationships_xml(rels: &[(&str, &str, &str)]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push('\n');
    xml.push_str(&format!(r#"<Relationships xmlns="{PKG_REL_NS}">"#));
    for (id, kind, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{kind}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn settings_xml() -> String {
    format!(
        r#"{XML_DECL}
<w:settings xmlns:w="{WML_NS}"><w:defaultTabStop w:val="720"/><w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat></w:settings>"#
    )
}

fn core_xml() -> String {
    format!(
        r#"{XML_DECL}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:creator>{}</dc:creator></cp:coreProperties>"#,
        env!("CARGO_PKG_NAME")
    )
}

struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PackageWriter {
    fn write_file(&mut self, path: &str, content: &str) -> Result<(), Error> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.zip.start_file(path, options)?;
        self.zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Zip every part of the document into `.docx` bytes.
pub fn write(doc: &DocxDocument) -> Result<Vec<u8>, Error> {
    let header = doc.header.is_some();
    let footer = doc.footer.is_some();
    let mut w = PackageWriter {
        zip: ZipWriter::new(Cursor::new(Vec::new())),
    };

    w.write_file("[Content_Types].xml", &content_types_xml(header, footer))?;
    let office_rel = format!("{REL_TYPE}/officeDocument");
    w.write_file(
        "_rels/.rels",
        &relationships_xml(&[
            ("rId1", office_rel.as_str(), "word/document.xml"),
            (
                "rId2",
                "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
                "docProps/core.xml",
            ),
        ]),
    )?;
    w.write_file("word/document.xml", &document_xml(doc))?;
    w.write_file("word/styles.xml", &styles_xml())?;
    w.write_file("word/settings.xml", &settings_xml())?;

    let styles_rel = format!("{REL_TYPE}/styles");
    let settings_rel = format!("{REL_TYPE}/settings");
    let header_rel = format!("{REL_TYPE}/header");
    let footer_rel = format!("{REL_TYPE}/footer");
    let mut doc_rels = vec![
        ("rId1", styles_rel.as_str(), "styles.xml"),
        ("rId2", settings_rel.as_str(), "settings.xml"),
    ];
    if let Some(para) = &doc.header {
        doc_rels.push(("rId3", header_rel.as_str(), "header1.xml"));
        w.write_file(HEADER_PART, &header_footer_xml("hdr", para))?;
    }
    if let Some(para) = &doc.footer {
        doc_rels.push(("rId4", footer_rel.as_str(), "footer1.xml"));
        w.write_file(FOOTER_PART, &header_footer_xml("ftr", para))?;
    }
    w.write_file("word/_rels/document.xml.rels", &relationships_xml(&doc_rels))?;
    w.write_file("docProps/core.xml", &core_xml())?;

    let cursor = w.zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_text_is_escaped_and_breaks_become_br() {
        let mut xml = String::new();
        write_run(&mut xml, &DocxRun::text("a < b\nc & d"));
        assert_eq!(
            xml,
            r#"<w:r><w:t xml:space="preserve">a &lt; b</w:t><w:br/><w:t xml:space="preserve">c &amp; d</w:t></w:r>"#
        );
    }

    #[test]
    fn control_characters_are_dropped_from_runs() {
        let mut xml = String::new();
        write_run(&mut xml, &DocxRun::text("a\u{1}b\u{b}\u{fffe}c\td"));
        assert_eq!(
            xml,
            "<w:r><w:t xml:space=\"preserve\">abc\td</w:t></w:r>"
        );
    }

    #[test]
    fn page_field_is_a_complex_field() {
        let mut xml = String::new();
        write_page_field(&mut xml);
        assert!(xml.contains(r#"w:fldCharType="begin""#));
        assert!(xml.contains(" PAGE "));
        assert!(xml.contains(r#"w:fldCharType="end""#));
    }
}

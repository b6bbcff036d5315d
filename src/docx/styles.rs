use super::WML_NS;

/// (style id, display name, half-point size, outline level)
const HEADINGS: [(&str, &str, u32, u32); 3] = [
    ("Heading1", "heading 1", 32, 0),
    ("Heading2", "heading 2", 26, 1),
    ("Heading3", "heading 3", 24, 2),
];

/// Body text size in half-points.
const NORMAL_SIZE: u32 = 22;

pub(super) fn styles_xml() -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:styles xmlns:w="{WML_NS}">"#));
    xml.push_str(&format!(
        r#"<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="{NORMAL_SIZE}"/><w:szCs w:val="{NORMAL_SIZE}"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="276" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>"#
    ));
    xml.push_str(
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
    );
    for (id, name, size, level) in HEADINGS {
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="{name}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240"/><w:outlineLvl w:val="{level}"/></w:pPr><w:rPr><w:b/><w:bCs/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:style>"#
        ));
    }
    xml.push_str("</w:styles>");
    xml
}

#![allow(dead_code)]

use std::io::{Cursor, Read};

use richdoc_export::ExportOptions;
use richdoc_export::template::HeaderFooterSettings;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn options(page_format: &str, header_footer: HeaderFooterSettings) -> ExportOptions {
    ExportOptions {
        page_format: richdoc_export::PageFormatId::parse_or_default(page_format),
        header_footer,
    }
}

/// Read one part of a `.docx` archive as text.
pub fn docx_part(bytes: &[u8], name: &str) -> Option<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).ok()?;
    let mut file = archive.by_name(name).ok()?;
    let mut xml = String::new();
    file.read_to_string(&mut xml).ok()?;
    Some(xml)
}

pub fn docx_part_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    archive.file_names().map(str::to_string).collect()
}

/// `w:`-namespaced descendants of `node` with local name `name`.
pub fn w_children<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a {
    node.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

pub fn w_attr<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == name)
        .map(|a| a.value())
}

/// Number of pages declared by the page tree.
pub fn pdf_page_count(pdf: &[u8]) -> usize {
    let text = String::from_utf8_lossy(pdf);
    let at = text.find("/Count ").expect("page tree with /Count");
    text[at + 7..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .expect("numeric /Count")
}

/// Inflated content streams, in page order.
pub fn pdf_page_streams(pdf: &[u8]) -> Vec<String> {
    let mut streams = Vec::new();
    let mut pos = 0;
    while let Some(found) = find(&pdf[pos..], b"stream\n") {
        let start_kw = pos + found;
        let data_start = start_kw + b"stream\n".len();
        if start_kw >= 3 && &pdf[start_kw - 3..start_kw] == b"end" {
            pos = data_start;
            continue;
        }
        let Some(len) = find(&pdf[data_start..], b"\nendstream") else {
            break;
        };
        let data = &pdf[data_start..data_start + len];
        let raw = miniz_oxide::inflate::decompress_to_vec_zlib(data).expect("zlib stream");
        streams.push(String::from_utf8_lossy(&raw).into_owned());
        pos = data_start + len + b"\nendstream".len();
    }
    streams
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

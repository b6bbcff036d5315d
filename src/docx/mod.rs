//! DOCX object graph built from the normalized document, and its packaging
//! into a `.docx` archive (see [`package`]).

pub mod package;
mod styles;

use crate::ExportOptions;
use crate::error::Error;
use crate::geometry::{px_to_twips, resolve_format, to_pixel_dimensions};
use crate::model::{Alignment, Block, Document, Run, TableRow};
use crate::template::{self, TemplatePart};

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const HEADING_SPACING_AFTER: [u32; 3] = [200, 160, 120];
const PARAGRAPH_SPACING_AFTER: u32 = 200;
const LIST_SPACING_AFTER: u32 = 100;
const LIST_INDENT: u32 = 720;
const LIST_DEPTH_INDENT: u32 = 360;
const QUOTE_INDENT: u32 = 720;
pub(crate) const HEADER_CELL_SHADING: &str = "F0F0F0";
/// Full table width in fiftieths of a percent.
pub(crate) const TABLE_WIDTH_PCT: u32 = 5000;

/// The palette a DOCX `w:highlight` can express.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HighlightColor {
    Yellow,
    Green,
    Cyan,
    Magenta,
    Blue,
    Red,
}

impl HighlightColor {
    pub fn as_str(self) -> &'static str {
        match self {
            HighlightColor::Yellow => "yellow",
            HighlightColor::Green => "green",
            HighlightColor::Cyan => "cyan",
            HighlightColor::Magenta => "magenta",
            HighlightColor::Blue => "blue",
            HighlightColor::Red => "red",
        }
    }

    /// Map an editor highlight colour onto the palette. Anything
    /// unrecognised becomes yellow.
    pub fn from_css(color: &str) -> Self {
        let c = color.trim().to_ascii_lowercase();
        let is = |hex: &[&str], names: &[&str]| {
            hex.contains(&c.as_str()) || names.iter().any(|n| c.contains(n))
        };
        if is(&["#fef08a", "#ffff00"], &["yellow"]) {
            HighlightColor::Yellow
        } else if is(&["#bbf7d0", "#00ff00"], &["green"]) {
            HighlightColor::Green
        } else if is(&["#a5f3fc", "#00ffff"], &["cyan"]) {
            HighlightColor::Cyan
        } else if is(&["#fecdd3"], &["magenta", "pink"]) {
            HighlightColor::Magenta
        } else if is(&["#bfdbfe"], &["blue"]) {
            HighlightColor::Blue
        } else if is(&["#fecaca"], &["red"]) {
            HighlightColor::Red
        } else {
            log::debug!("highlight {color:?} has no DOCX equivalent, using yellow");
            HighlightColor::Yellow
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DocxRun {
    /// May contain `'\n'`, written as `w:br`.
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub highlight: Option<HighlightColor>,
}

impl DocxRun {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    fn from_run(run: &Run) -> Self {
        Self {
            text: run.text.clone(),
            bold: run.bold,
            italic: run.italic,
            underline: run.underline,
            strike: run.strike,
            highlight: run.highlight.as_deref().map(HighlightColor::from_css),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParagraphChild {
    Run(DocxRun),
    Tab,
    /// Live current-page field.
    PageNumber,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DocxParagraph {
    pub style: Option<String>,
    pub alignment: Option<Alignment>,
    pub spacing_after: Option<u32>,
    pub indent_left: Option<u32>,
    /// Right-aligned tab stop positions, in twips.
    pub right_tabs: Vec<u32>,
    pub children: Vec<ParagraphChild>,
}

impl DocxParagraph {
    pub fn runs(&self) -> impl Iterator<Item = &DocxRun> {
        self.children.iter().filter_map(|c| match c {
            ParagraphChild::Run(r) => Some(r),
            _ => None,
        })
    }

    pub fn text(&self) -> String {
        self.runs().map(|r| r.text.as_str()).collect()
    }

    fn with_runs(runs: &[Run]) -> Self {
        Self {
            children: runs
                .iter()
                .map(|r| ParagraphChild::Run(DocxRun::from_run(r)))
                .collect(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocxTableCell {
    pub is_header: bool,
    /// Background fill as `RRGGBB`.
    pub shading: Option<&'static str>,
    pub paragraph: DocxParagraph,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocxTableRow {
    pub cells: Vec<DocxTableCell>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocxTable {
    pub columns: usize,
    pub rows: Vec<DocxTableRow>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BodyElement {
    Paragraph(DocxParagraph),
    Table(DocxTable),
}

/// Page setup, all values in twips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionSetup {
    pub page_width: u32,
    pub page_height: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    pub margin_right: u32,
}

impl SectionSetup {
    pub fn content_width(&self) -> u32 {
        self.page_width
            .saturating_sub(self.margin_left + self.margin_right)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocxDocument {
    pub section: SectionSetup,
    pub body: Vec<BodyElement>,
    pub header: Option<DocxParagraph>,
    pub footer: Option<DocxParagraph>,
}

fn section_setup(options: &ExportOptions) -> SectionSetup {
    let format = resolve_format(options.page_format);
    let dims = to_pixel_dimensions(format);
    let twips = |px: f32| px_to_twips(px).round() as u32;
    SectionSetup {
        page_width: twips(dims.width),
        page_height: twips(dims.height),
        margin_top: twips(dims.margin_top),
        margin_bottom: twips(dims.margin_bottom),
        margin_left: twips(dims.margin_left),
        margin_right: twips(dims.margin_right),
    }
}

fn template_children(tpl: &str, out: &mut Vec<ParagraphChild>) {
    for part in template::split(tpl) {
        out.push(match part {
            TemplatePart::Text(text) => ParagraphChild::Run(DocxRun::text(text)),
            TemplatePart::PageNumber => ParagraphChild::PageNumber,
        });
    }
}

/// Left template, tab, right template. `None` when both sides are empty.
fn header_footer_paragraph(left: &str, right: &str, tab_pos: u32) -> Option<DocxParagraph> {
    if left.is_empty() && right.is_empty() {
        return None;
    }
    let mut children = Vec::new();
    template_children(left, &mut children);
    if !right.is_empty() {
        children.push(ParagraphChild::Tab);
        template_children(right, &mut children);
    }
    Some(DocxParagraph {
        right_tabs: vec![tab_pos],
        children,
        ..DocxParagraph::default()
    })
}

fn table(rows: &[TableRow]) -> DocxTable {
    let columns = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0).max(1);
    let rows = rows
        .iter()
        .map(|row| DocxTableRow {
            cells: row
                .cells
                .iter()
                .map(|cell| DocxTableCell {
                    is_header: cell.is_header,
                    shading: cell.is_header.then_some(HEADER_CELL_SHADING),
                    paragraph: DocxParagraph::with_runs(&cell.runs),
                })
                .collect(),
        })
        .collect();
    DocxTable { columns, rows }
}

fn body_element(block: &Block) -> BodyElement {
    match block {
        Block::Heading { level, runs } => {
            let level = (*level).clamp(1, 3);
            BodyElement::Paragraph(DocxParagraph {
                style: Some(format!("Heading{level}")),
                spacing_after: Some(HEADING_SPACING_AFTER[usize::from(level) - 1]),
                ..DocxParagraph::with_runs(runs)
            })
        }
        Block::Paragraph { runs, alignment } => BodyElement::Paragraph(DocxParagraph {
            alignment: Some(*alignment),
            spacing_after: Some(PARAGRAPH_SPACING_AFTER),
            ..DocxParagraph::with_runs(runs)
        }),
        Block::ListItem {
            marker,
            depth,
            runs,
        } => {
            let mut children = vec![ParagraphChild::Run(DocxRun::text(format!(
                "{} ",
                marker.label()
            )))];
            children.extend(
                runs.iter()
                    .map(|r| ParagraphChild::Run(DocxRun::from_run(r))),
            );
            BodyElement::Paragraph(DocxParagraph {
                spacing_after: Some(LIST_SPACING_AFTER),
                indent_left: Some(LIST_INDENT + u32::from(*depth) * LIST_DEPTH_INDENT),
                children,
                ..DocxParagraph::default()
            })
        }
        Block::Blockquote { runs } => BodyElement::Paragraph(DocxParagraph {
            spacing_after: Some(PARAGRAPH_SPACING_AFTER),
            indent_left: Some(QUOTE_INDENT),
            ..DocxParagraph::with_runs(runs)
        }),
        Block::Table { rows } => BodyElement::Table(table(rows)),
    }
}

/// Build the DOCX object graph for a normalized document.
pub fn build(doc: &Document, options: &ExportOptions) -> DocxDocument {
    let section = section_setup(options);
    let tab = section.content_width();
    let hf = &options.header_footer;
    DocxDocument {
        section,
        body: doc.blocks.iter().map(body_element).collect(),
        header: header_footer_paragraph(&hf.header_left, &hf.header_right, tab),
        footer: header_footer_paragraph(&hf.footer_left, &hf.footer_right, tab),
    }
}

pub fn render(doc: &Document, options: &ExportOptions) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let docx = build(doc, options);
    let t_build = t0.elapsed();
    let bytes = package::write(&docx)?;
    log::info!(
        "DOCX phases: build={:.1}ms, package={:.1}ms ({} body elements)",
        t_build.as_secs_f64() * 1000.0,
        (t0.elapsed() - t_build).as_secs_f64() * 1000.0,
        docx.body.len(),
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_palette() {
        assert_eq!(HighlightColor::from_css("#FEF08A"), HighlightColor::Yellow);
        assert_eq!(HighlightColor::from_css("#bbf7d0"), HighlightColor::Green);
        assert_eq!(HighlightColor::from_css("lightgreen"), HighlightColor::Green);
        assert_eq!(HighlightColor::from_css("#a5f3fc"), HighlightColor::Cyan);
        assert_eq!(HighlightColor::from_css("hotpink"), HighlightColor::Magenta);
        assert_eq!(HighlightColor::from_css("#bfdbfe"), HighlightColor::Blue);
        assert_eq!(HighlightColor::from_css("#fecaca"), HighlightColor::Red);
        assert_eq!(HighlightColor::from_css("#123456"), HighlightColor::Yellow);
    }

    #[test]
    fn footer_splits_at_page_token() {
        let p = header_footer_paragraph("", "Page {page} of many", 9360).unwrap();
        assert_eq!(
            p.children,
            vec![
                ParagraphChild::Tab,
                ParagraphChild::Run(DocxRun::text("Page ")),
                ParagraphChild::PageNumber,
                ParagraphChild::Run(DocxRun::text(" of many")),
            ]
        );
        assert!(header_footer_paragraph("", "", 9360).is_none());
    }

    #[test]
    fn letter_section_in_twips() {
        let s = section_setup(&ExportOptions::default());
        assert_eq!((s.page_width, s.page_height), (12240, 15840));
        assert_eq!(s.margin_left, 1440);
        assert_eq!(s.content_width(), 9360);
    }
}

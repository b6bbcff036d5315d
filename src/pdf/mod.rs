mod layout;
mod table;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

use crate::ExportOptions;
use crate::error::Error;
use crate::fonts::{StandardFont, write_standard_fonts};
use crate::geometry::{inch_to_pt, mm_to_pt, px_to_pt, resolve_format, to_pixel_dimensions};
use crate::model::{Alignment, Block, DEFAULT_HIGHLIGHT, Document, Run};
use crate::template;

use layout::{RunStyle, build_paragraph_lines, render_paragraph_lines, show_text};
use table::render_table;

/// Space kept free under the top margin for the header, and above the
/// bottom margin for the footer.
const HEADER_CLEARANCE_MM: f32 = 5.0;
/// Offset of header/footer baselines from the margin edge.
const HEADER_FOOTER_OFFSET_MM: f32 = 2.0;
const HEADER_FOOTER_FONT_SIZE: f32 = 10.0;
const HEADER_FOOTER_GRAY: f32 = 128.0 / 255.0;
const LIST_INDENT_MM: f32 = 5.0;
const QUOTE_INDENT_MM: f32 = 5.0;
const QUOTE_BAR_WIDTH_MM: f32 = 1.0;
const QUOTE_BAR_GRAY: f32 = 204.0 / 255.0;
const QUOTE_TEXT: [u8; 3] = [0x66, 0x66, 0x66];
const TABLE_GAP_MM: f32 = 2.0;

/// Font size, line pitch and trailing gap of a text block.
#[derive(Clone, Copy, Debug, PartialEq)]
struct BlockMetrics {
    font_size: f32,
    pitch_mm: f32,
    gap_mm: f32,
}

const fn metrics(font_size: f32, pitch_mm: f32, gap_mm: f32) -> BlockMetrics {
    BlockMetrics {
        font_size,
        pitch_mm,
        gap_mm,
    }
}

fn heading_metrics(level: u8) -> BlockMetrics {
    match level {
        1 => metrics(24.0, 8.0, 3.0),
        2 => metrics(18.0, 7.0, 2.0),
        _ => metrics(14.0, 6.0, 1.0),
    }
}

const BODY: BlockMetrics = metrics(12.0, 5.0, 2.0);

/// Page being filled plus the pages already finished. `y` is the baseline
/// of the next line, in points from the top edge.
pub(crate) struct Canvas {
    page_width: f32,
    page_height: f32,
    margin_top: f32,
    margin_bottom: f32,
    margin_left: f32,
    margin_right: f32,
    finished: Vec<Content>,
    current: Content,
    pub(crate) y: f32,
}

impl Canvas {
    fn new(options: &ExportOptions) -> Self {
        let format = resolve_format(options.page_format);
        let dims = to_pixel_dimensions(format);
        let mut canvas = Self {
            page_width: inch_to_pt(format.width),
            page_height: inch_to_pt(format.height),
            margin_top: px_to_pt(dims.margin_top),
            margin_bottom: px_to_pt(dims.margin_bottom),
            margin_left: px_to_pt(dims.margin_left),
            margin_right: px_to_pt(dims.margin_right),
            finished: Vec::new(),
            current: Content::new(),
            y: 0.0,
        };
        canvas.y = canvas.top();
        canvas
    }

    fn top(&self) -> f32 {
        self.margin_top + mm_to_pt(HEADER_CLEARANCE_MM)
    }

    fn limit(&self) -> f32 {
        self.page_height - self.margin_bottom - mm_to_pt(HEADER_CLEARANCE_MM)
    }

    pub(crate) fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    pub(crate) fn margin_left(&self) -> f32 {
        self.margin_left
    }

    pub(crate) fn content(&mut self) -> &mut Content {
        &mut self.current
    }

    /// Top-down distance to PDF user space.
    pub(crate) fn to_pdf_y(&self, y_from_top: f32) -> f32 {
        self.page_height - y_from_top
    }

    fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    fn new_page(&mut self) {
        self.finished
            .push(std::mem::replace(&mut self.current, Content::new()));
        self.y = self.top();
        log::debug!("PDF page break, now on page {}", self.page_count());
    }

    /// Start a new page when `height` more points would cross the bottom
    /// limit. A fresh page always accepts the content.
    pub(crate) fn ensure_room(&mut self, height: f32) {
        let at_page_top = (self.y - self.top()).abs() < 0.01;
        if !at_page_top && self.y + height > self.limit() {
            self.new_page();
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y += mm_to_pt(mm);
    }

    /// Hand out every page drawn so far, the current one included.
    fn take_pages(&mut self) -> Vec<Content> {
        let mut pages = std::mem::take(&mut self.finished);
        pages.push(std::mem::replace(&mut self.current, Content::new()));
        pages
    }
}

/// Parse a CSS colour (`#rgb`, `#rrggbb`, `rgb()`/`rgba()` or a basic
/// name). Highlights that do not parse use the default highlight.
pub(crate) fn parse_css_color(value: &str) -> Option<[u8; 3]> {
    let v = value.trim().to_ascii_lowercase();
    if let Some(hex) = v.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;
        return match digits.as_slice() {
            [r, g, b] => Some([r * 17, g * 17, b * 17]),
            [r1, r0, g1, g0, b1, b0] | [r1, r0, g1, g0, b1, b0, _, _] => {
                Some([r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0])
            }
            _ => None,
        };
    }
    if let Some(args) = v
        .strip_prefix("rgba(")
        .or_else(|| v.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<u8> = args
            .split([',', ' ', '/'])
            .filter(|p| !p.is_empty())
            .take(3)
            .map(|p| p.parse::<f32>().ok().map(|n| n.clamp(0.0, 255.0).round() as u8))
            .collect::<Option<_>>()?;
        return match parts.as_slice() {
            [r, g, b] => Some([*r, *g, *b]),
            _ => None,
        };
    }
    let named = match v.as_str() {
        "yellow" => [255, 255, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "cyan" | "aqua" => [0, 255, 255],
        "magenta" | "fuchsia" => [255, 0, 255],
        "pink" => [255, 192, 203],
        "blue" => [0, 0, 255],
        "red" => [255, 0, 0],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        "gray" | "grey" => [128, 128, 128],
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        _ => return None,
    };
    Some(named)
}

fn highlight_rgb(value: &str) -> [u8; 3] {
    parse_css_color(value).unwrap_or_else(|| {
        log::debug!("unrecognised highlight colour {value:?}, using {DEFAULT_HIGHLIGHT}");
        [0xfe, 0xf0, 0x8a]
    })
}

/// Lay out runs line by line, breaking pages before any line whose pitch
/// would cross the bottom limit.
fn place_runs(
    canvas: &mut Canvas,
    runs: &[Run],
    style: &RunStyle,
    pitch: f32,
    alignment: Alignment,
    indent: f32,
    hanging: f32,
    quote_bar: bool,
) {
    let left = canvas.margin_left() + indent + hanging;
    let width = (canvas.content_width() - indent - hanging).max(1.0);
    let lines = build_paragraph_lines(runs, style, width, hanging, highlight_rgb);
    let total = lines.len();
    for (i, line) in lines.iter().enumerate() {
        canvas.ensure_room(pitch);
        let baseline = canvas.to_pdf_y(canvas.y);
        if quote_bar {
            let bar_x = canvas.margin_left();
            let bar_bottom = canvas.to_pdf_y(canvas.y + pitch - style.font_size);
            let content = canvas.content();
            content.save_state();
            content.set_fill_gray(QUOTE_BAR_GRAY);
            content.rect(bar_x, bar_bottom, mm_to_pt(QUOTE_BAR_WIDTH_MM), pitch);
            content.fill_nonzero();
            content.restore_state();
        }
        render_paragraph_lines(
            canvas.content(),
            std::slice::from_ref(line),
            alignment,
            left,
            width,
            baseline,
            pitch,
            total,
            i,
            hanging,
        );
        canvas.y += pitch;
    }
}

fn render_block(canvas: &mut Canvas, block: &Block, next: Option<&Block>) {
    match block {
        Block::Heading { level, runs } => {
            let m = heading_metrics(*level);
            let style = RunStyle {
                font_size: m.font_size,
                force_bold: true,
                color: None,
            };
            let pitch = mm_to_pt(m.pitch_mm);
            place_runs(canvas, runs, &style, pitch, Alignment::Left, 0.0, 0.0, false);
            canvas.gap(m.gap_mm);
        }
        Block::Paragraph { runs, alignment } => {
            let style = RunStyle {
                font_size: BODY.font_size,
                force_bold: false,
                color: None,
            };
            let pitch = mm_to_pt(BODY.pitch_mm);
            place_runs(canvas, runs, &style, pitch, *alignment, 0.0, 0.0, false);
            canvas.gap(BODY.gap_mm);
        }
        Block::ListItem {
            marker,
            depth,
            runs,
        } => {
            let style = RunStyle {
                font_size: BODY.font_size,
                force_bold: false,
                color: None,
            };
            let mut labelled = Vec::with_capacity(runs.len() + 1);
            labelled.push(Run::plain(format!("{} ", marker.label())));
            labelled.extend(runs.iter().cloned());
            let indent = mm_to_pt(LIST_INDENT_MM) * f32::from(*depth);
            let pitch = mm_to_pt(BODY.pitch_mm);
            let hanging = mm_to_pt(LIST_INDENT_MM);
            place_runs(
                canvas,
                &labelled,
                &style,
                pitch,
                Alignment::Left,
                indent,
                hanging,
                false,
            );
            if !next.is_some_and(Block::is_list_item) {
                canvas.gap(BODY.gap_mm);
            }
        }
        Block::Blockquote { runs } => {
            let style = RunStyle {
                font_size: BODY.font_size,
                force_bold: false,
                color: Some(QUOTE_TEXT),
            };
            let pitch = mm_to_pt(BODY.pitch_mm);
            let indent = mm_to_pt(QUOTE_INDENT_MM);
            place_runs(canvas, runs, &style, pitch, Alignment::Left, indent, 0.0, true);
            canvas.gap(BODY.gap_mm);
        }
        Block::Table { rows } => {
            render_table(canvas, rows);
            canvas.gap(TABLE_GAP_MM);
        }
    }
}

/// Second pass: header/footer text on every finished page.
fn render_header_footer(
    content: &mut Content,
    canvas: &Canvas,
    settings: &template::HeaderFooterSettings,
    page_num: usize,
) {
    let font = StandardFont::Regular;
    let fs = HEADER_FOOTER_FONT_SIZE;
    let offset = mm_to_pt(HEADER_FOOTER_OFFSET_MM);
    let header_y = canvas.to_pdf_y(canvas.margin_top - offset);
    let footer_y = canvas.to_pdf_y(canvas.page_height - canvas.margin_bottom + offset);
    let right_edge = canvas.page_width - canvas.margin_right;

    content.save_state();
    content.set_fill_gray(HEADER_FOOTER_GRAY);
    for (tpl, y, right) in [
        (&settings.header_left, header_y, false),
        (&settings.header_right, header_y, true),
        (&settings.footer_left, footer_y, false),
        (&settings.footer_right, footer_y, true),
    ] {
        if tpl.is_empty() {
            continue;
        }
        let text = template::expand(tpl, page_num);
        let x = if right {
            right_edge - font.word_width(&text, fs)
        } else {
            canvas.margin_left
        };
        show_text(content, font, fs, x, y, &text);
    }
    content.restore_state();
}

pub fn render(doc: &Document, options: &ExportOptions) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let font_refs = write_standard_fonts(&mut pdf, &mut alloc);

    let mut canvas = Canvas::new(options);
    if canvas.content_width() <= 0.0 || canvas.limit() <= canvas.top() {
        return Err(Error::Pdf(format!(
            "page format {} leaves no room for content",
            options.page_format
        )));
    }

    for (i, block) in doc.blocks.iter().enumerate() {
        render_block(&mut canvas, block, doc.blocks.get(i + 1));
    }
    let t_layout = t0.elapsed();

    let (page_width, page_height) = (canvas.page_width, canvas.page_height);
    let mut all_contents = canvas.take_pages();

    if !options.header_footer.is_empty() {
        for (i, content) in all_contents.iter_mut().enumerate() {
            render_header_footer(content, &canvas, &options.header_footer, i + 1);
        }
    }
    let t_headers = t0.elapsed();

    let n = all_contents.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in all_contents.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed)
            .filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, page_width, page_height))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut fonts = resources.fonts();
        for (font, font_ref) in &font_refs {
            fonts.pair(Name(font.pdf_name()), *font_ref);
        }
    }

    let t_assembly = t0.elapsed();
    log::info!(
        "Render phases: layout={:.1}ms, headers={:.1}ms, assembly={:.1}ms ({} pages)",
        t_layout.as_secs_f64() * 1000.0,
        (t_headers - t_layout).as_secs_f64() * 1000.0,
        (t_assembly - t_headers).as_secs_f64() * 1000.0,
        n,
    );

    Ok(pdf.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_colours() {
        assert_eq!(parse_css_color("#fef08a"), Some([0xfe, 0xf0, 0x8a]));
        assert_eq!(parse_css_color("#FF0"), Some([255, 255, 0]));
        assert_eq!(parse_css_color("rgb(187, 247, 208)"), Some([187, 247, 208]));
        assert_eq!(parse_css_color("Yellow"), Some([255, 255, 0]));
        assert_eq!(parse_css_color("not-a-colour"), None);
        assert_eq!(highlight_rgb("#zzzzzz"), [0xfe, 0xf0, 0x8a]);
    }

    #[test]
    fn canvas_breaks_only_when_line_overflows() {
        let mut canvas = Canvas::new(&ExportOptions::default());
        canvas.ensure_room(1000.0);
        assert_eq!(canvas.page_count(), 1, "fresh page accepts anything");
        canvas.y = canvas.limit() - 10.0;
        canvas.ensure_room(5.0);
        assert_eq!(canvas.page_count(), 1);
        canvas.ensure_room(20.0);
        assert_eq!(canvas.page_count(), 2);
        assert_eq!(canvas.y, canvas.top());
    }
}

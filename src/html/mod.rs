//! Normalizes editor HTML into the format-independent block model that both
//! exporters consume.

pub mod dom;

use crate::model::{
    Alignment, Block, DEFAULT_HIGHLIGHT, Document, ListMarker, Run, RunFormat, TableCell,
    TableRow,
};

use dom::{Element, Node};

/// Subtrees that never contribute content.
fn is_ignored(tag: &str) -> bool {
    matches!(
        tag,
        "head"
            | "style"
            | "script"
            | "title"
            | "template"
            | "noscript"
            | "img"
            | "video"
            | "audio"
            | "iframe"
            | "object"
            | "svg"
            | "canvas"
    )
}

fn is_inline(tag: &str) -> bool {
    matches!(
        tag,
        "a" | "abbr"
            | "b"
            | "bdi"
            | "bdo"
            | "br"
            | "cite"
            | "code"
            | "data"
            | "del"
            | "dfn"
            | "em"
            | "font"
            | "i"
            | "ins"
            | "kbd"
            | "label"
            | "mark"
            | "q"
            | "s"
            | "samp"
            | "small"
            | "span"
            | "strike"
            | "strong"
            | "sub"
            | "sup"
            | "time"
            | "u"
            | "var"
            | "wbr"
    )
}

/// Elements whose boundaries force a line break when flattened into runs.
fn breaks_line(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "blockquote"
            | "pre"
            | "tr"
            | "table"
            | "ul"
            | "ol"
    )
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_ws = false;
    for ch in text.chars() {
        if matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0c') {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(ch);
            in_ws = false;
        }
    }
    out
}

fn apply_format(el: &Element, parent: &RunFormat) -> RunFormat {
    let mut format = parent.clone();
    match el.tag.as_str() {
        "strong" | "b" => format.bold = true,
        "em" | "i" => format.italic = true,
        "u" => format.underline = true,
        "s" | "strike" | "del" => format.strike = true,
        "mark" => {
            let color = el
                .attr("data-color")
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .or_else(|| el.style_value("background-color"))
                .unwrap_or(DEFAULT_HIGHLIGHT);
            format.highlight = Some(color.to_string());
        }
        _ => {}
    }
    format
}

/// Accumulates maximal constant-format runs while walking inline content.
#[derive(Default)]
struct RunCollector<'a> {
    runs: Vec<Run>,
    /// When set, nested lists are handed back instead of flattened.
    nested_lists: Option<Vec<&'a Element>>,
}

impl<'a> RunCollector<'a> {
    fn at_line_start(&self) -> bool {
        self.runs
            .iter()
            .rev()
            .find_map(|r| r.text.chars().last())
            .is_none_or(|c| c == '\n')
    }

    fn push_text(&mut self, text: &str, format: &RunFormat) {
        let text = if self.at_line_start() {
            text.trim_start_matches(' ')
        } else {
            text
        };
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.same_format(format) => last.text.push_str(text),
            _ => self.runs.push(Run::with_format(text, format)),
        }
    }

    fn line_break(&mut self, format: &RunFormat) {
        if self.at_line_start() {
            return;
        }
        if let Some(last) = self.runs.last_mut() {
            let trimmed = last.text.trim_end_matches(' ').len();
            last.text.truncate(trimmed);
        }
        self.runs.retain(|r| !r.text.is_empty());
        match self.runs.last_mut() {
            Some(last) if last.same_format(format) => last.text.push('\n'),
            _ => self.runs.push(Run::with_format("\n", format)),
        }
    }

    fn walk(&mut self, nodes: &'a [Node], format: &RunFormat) {
        for node in nodes {
            match node {
                Node::Text(text) => self.push_text(&collapse_whitespace(text), format),
                Node::Element(el) => self.walk_element(el, format),
            }
        }
    }

    fn walk_element(&mut self, el: &'a Element, format: &RunFormat) {
        let tag = el.tag.as_str();
        if is_ignored(tag) {
            return;
        }
        if tag == "br" {
            // Every <br> breaks, even at line start, so <br><br> leaves a
            // blank line. Trailing breaks are trimmed in `finish`.
            match self.runs.last_mut() {
                Some(last) if last.same_format(format) => last.text.push('\n'),
                _ => self.runs.push(Run::with_format("\n", format)),
            }
            return;
        }
        if matches!(tag, "ul" | "ol") {
            if let Some(lists) = self.nested_lists.as_mut() {
                lists.push(el);
                return;
            }
        }
        let format = apply_format(el, format);
        if breaks_line(tag) {
            self.line_break(&format);
            self.walk(&el.children, &format);
            self.line_break(&format);
        } else {
            self.walk(&el.children, &format);
        }
    }

    /// Trims the edges and guarantees at least one run.
    fn finish(mut self) -> (Vec<Run>, Vec<&'a Element>) {
        while let Some(last) = self.runs.last_mut() {
            let trimmed = last.text.trim_end_matches([' ', '\n']).len();
            last.text.truncate(trimmed);
            if last.text.is_empty() {
                self.runs.pop();
            } else {
                break;
            }
        }
        if self.runs.is_empty() {
            self.runs.push(Run::plain(""));
        }
        (self.runs, self.nested_lists.unwrap_or_default())
    }
}

pub fn inline_runs(nodes: &[Node]) -> Vec<Run> {
    let mut collector = RunCollector::default();
    collector.walk(nodes, &RunFormat::default());
    collector.finish().0
}

fn alignment_of(el: &Element) -> Alignment {
    el.style_value("text-align")
        .and_then(Alignment::from_css)
        .unwrap_or_default()
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        _ => None,
    }
}

fn list_items(list: &Element, depth: u8, out: &mut Vec<Block>) {
    let ordered = list.tag == "ol";
    let mut ordinal = 1;
    for li in list.child_elements().filter(|e| e.tag == "li") {
        let marker = if ordered {
            let m = ListMarker::Ordinal(ordinal);
            ordinal += 1;
            m
        } else {
            ListMarker::Bullet
        };
        let mut collector = RunCollector {
            nested_lists: Some(Vec::new()),
            ..RunCollector::default()
        };
        collector.walk(&li.children, &RunFormat::default());
        let (runs, nested) = collector.finish();
        out.push(Block::ListItem {
            marker,
            depth,
            runs,
        });
        for sub in nested {
            list_items(sub, depth.saturating_add(1), out);
        }
    }
}

fn collect_rows(el: &Element, rows: &mut Vec<TableRow>) {
    for child in el.child_elements() {
        match child.tag.as_str() {
            "tr" => {
                let cells: Vec<TableCell> = child
                    .child_elements()
                    .filter(|c| c.tag == "td" || c.tag == "th")
                    .map(|c| TableCell {
                        is_header: c.tag == "th",
                        runs: inline_runs(&c.children),
                    })
                    .collect();
                if cells.is_empty() {
                    continue;
                }
                rows.push(TableRow {
                    is_header: cells.iter().any(|c| c.is_header),
                    cells,
                });
            }
            "table" | "caption" | "colgroup" => {}
            _ => collect_rows(child, rows),
        }
    }
}

fn table(el: &Element) -> Option<Block> {
    let mut rows = Vec::new();
    collect_rows(el, &mut rows);
    if rows.is_empty() {
        log::debug!("dropping table without rows");
        return None;
    }
    Some(Block::Table { rows })
}

fn flush_inline(pending: &mut Vec<&Node>, out: &mut Vec<Block>) {
    if pending.is_empty() {
        return;
    }
    let plain = RunFormat::default();
    let mut collector = RunCollector::default();
    for node in pending.drain(..) {
        match node {
            Node::Text(text) => collector.push_text(&collapse_whitespace(text), &plain),
            Node::Element(el) => collector.walk_element(el, &plain),
        }
    }
    let (runs, _) = collector.finish();
    if runs.iter().any(|r| !r.text.trim().is_empty()) {
        out.push(Block::Paragraph {
            runs,
            alignment: Alignment::Left,
        });
    }
}

fn collect_blocks(nodes: &[Node], out: &mut Vec<Block>) {
    // Loose inline content between blocks is gathered into one paragraph.
    let mut pending: Vec<&Node> = Vec::new();
    for node in nodes {
        let el = match node {
            Node::Element(el) if !is_inline(&el.tag) => el,
            _ => {
                pending.push(node);
                continue;
            }
        };
        flush_inline(&mut pending, out);
        let tag = el.tag.as_str();
        if let Some(level) = heading_level(tag) {
            out.push(Block::Heading {
                level,
                runs: inline_runs(&el.children),
            });
            continue;
        }
        match tag {
            "p" => out.push(Block::Paragraph {
                runs: inline_runs(&el.children),
                alignment: alignment_of(el),
            }),
            "ul" | "ol" => list_items(el, 0, out),
            "table" => out.extend(table(el)),
            "blockquote" => out.push(Block::Blockquote {
                runs: inline_runs(&el.children),
            }),
            t if is_ignored(t) => {}
            _ => collect_blocks(&el.children, out),
        }
    }
    flush_inline(&mut pending, out);
}

/// Convert editor HTML into the intermediate block sequence.
pub fn normalize(html: &str) -> Document {
    let nodes = dom::parse(html);
    let mut blocks = Vec::new();
    collect_blocks(&nodes, &mut blocks);
    log::debug!(
        "normalized {} bytes of HTML into {} blocks",
        html.len(),
        blocks.len()
    );
    Document { blocks }
}

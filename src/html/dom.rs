use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(tag: String) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Value of one declaration of the inline `style` attribute.
    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.attr("style")?.split(';').find_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case(property)
                .then(|| value.trim())
                .filter(|v| !v.is_empty())
        })
    }
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Whether opening `new` implicitly ends the still-open `open` element.
fn implicitly_closes(open: &str, new: &str) -> bool {
    match open {
        "p" => matches!(
            new,
            "p" | "div"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "ul"
                | "ol"
                | "li"
                | "table"
                | "tr"
                | "td"
                | "th"
                | "blockquote"
                | "pre"
                | "hr"
        ),
        "li" => new == "li",
        "td" | "th" => matches!(new, "td" | "th" | "tr"),
        "tr" => new == "tr",
        _ => false,
    }
}

fn resolve_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{a0}",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "bull" => "\u{2022}",
        "middot" => "\u{b7}",
        "euro" => "\u{20ac}",
        _ => return None,
    })
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn start_element(start: &BytesStart) -> Element {
    let mut el = Element::new(lossy(start.name().as_ref()).to_ascii_lowercase());
    for attr in start.html_attributes().flatten() {
        let key = lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = attr
            .unescape_value()
            .map(Cow::into_owned)
            .unwrap_or_else(|_| lossy(&attr.value));
        el.attrs.push((key, value));
    }
    el
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn close_top(&mut self) {
        if let Some(el) = self.open.pop() {
            self.append(Node::Element(el));
        }
    }

    fn start(&mut self, el: Element, self_closing: bool) {
        while self
            .open
            .last()
            .is_some_and(|top| implicitly_closes(&top.tag, &el.tag))
        {
            self.close_top();
        }
        if self_closing || is_void(&el.tag) {
            self.append(Node::Element(el));
        } else {
            self.open.push(el);
        }
    }

    fn end(&mut self, tag: &str) {
        match self.open.iter().rposition(|e| e.tag == tag) {
            Some(pos) => {
                while self.open.len() > pos {
                    self.close_top();
                }
            }
            None => log::debug!("ignoring unmatched </{tag}>"),
        }
    }

    fn text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        let siblings = match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        };
        if let Some(Node::Text(prev)) = siblings.last_mut() {
            prev.push_str(&text);
        } else {
            siblings.push(Node::Text(text));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_top();
        }
        self.root
    }
}

/// Escape `<` that cannot open a tag, so `a < b` stays text.
fn escape_stray_lt(html: &str) -> Cow<'_, str> {
    let opens_markup = |rest: &str| {
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '!' || c == '?' => true,
            Some('/') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
            _ => false,
        }
    };
    let stray: Vec<usize> = html
        .match_indices('<')
        .map(|(i, _)| i)
        .filter(|&i| !opens_markup(&html[i + 1..]))
        .collect();
    if stray.is_empty() {
        return Cow::Borrowed(html);
    }
    let mut out = String::with_capacity(html.len() + stray.len() * 3);
    let mut last = 0;
    for i in stray {
        out.push_str(&html[last..i]);
        out.push_str("&lt;");
        last = i + 1;
    }
    out.push_str(&html[last..]);
    Cow::Owned(out)
}

/// Parse editor HTML into a node forest. Malformed input is recovered
/// locally: markup the tokenizer rejects is kept as text and parsing
/// resumes right after it.
pub fn parse(html: &str) -> Vec<Node> {
    let html = escape_stray_lt(html);
    let mut builder = TreeBuilder::default();
    let mut offset = 0;
    while offset < html.len() {
        offset = tokenize(&html, offset, &mut builder);
    }
    builder.finish()
}

/// Feed `html[offset..]` to `builder`. Returns where to resume after a
/// tokenizer error, or `html.len()` once the input is exhausted.
fn tokenize(html: &str, offset: usize, builder: &mut TreeBuilder) -> usize {
    let mut reader = Reader::from_str(&html[offset..]);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.check_comments = false;

    loop {
        let event_start = offset + reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) => builder.start(start_element(&e), false),
            Ok(Event::Empty(e)) => builder.start(start_element(&e), true),
            Ok(Event::End(e)) => {
                let tag = lossy(e.name().as_ref()).to_ascii_lowercase();
                builder.end(&tag);
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape_with(resolve_entity)
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| lossy(&e));
                builder.text(text);
            }
            Ok(Event::CData(e)) => builder.text(lossy(&e)),
            Ok(Event::Eof) => return html.len(),
            Ok(_) => {}
            Err(e) => {
                log::warn!("HTML parse error at byte {event_start}: {e}; reading it as text");
                // The rejected `<` becomes text; everything after it is
                // tokenized again.
                let Some(c) = html.get(event_start..).and_then(|rest| rest.chars().next()) else {
                    return html.len();
                };
                builder.text(c.to_string());
                return event_start + c.len_utf8();
            }
        }
    }
}

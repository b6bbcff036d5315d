//! Header/footer templates. `{page}` is the only placeholder.

pub const PAGE_TOKEN: &str = "{page}";

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct HeaderFooterSettings {
    pub header_left: String,
    pub header_right: String,
    pub footer_left: String,
    pub footer_right: String,
}

impl Default for HeaderFooterSettings {
    fn default() -> Self {
        Self {
            header_left: String::new(),
            header_right: String::new(),
            footer_left: String::new(),
            footer_right: format!("Page {PAGE_TOKEN}"),
        }
    }
}

impl HeaderFooterSettings {
    /// Settings with every slot blank.
    pub fn empty() -> Self {
        Self {
            footer_right: String::new(),
            ..Self::default()
        }
    }

    pub fn has_header(&self) -> bool {
        !self.header_left.is_empty() || !self.header_right.is_empty()
    }

    pub fn has_footer(&self) -> bool {
        !self.footer_left.is_empty() || !self.footer_right.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_header() && !self.has_footer()
    }
}

pub fn expand(template: &str, page_number: usize) -> String {
    template.replace(PAGE_TOKEN, &page_number.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplatePart<'a> {
    Text(&'a str),
    PageNumber,
}

/// Split a template at every `{page}` token. Empty text pieces are dropped.
pub fn split(template: &str) -> Vec<TemplatePart<'_>> {
    let mut parts = Vec::new();
    let mut pieces = template.split(PAGE_TOKEN).peekable();
    while let Some(text) = pieces.next() {
        if !text.is_empty() {
            parts.push(TemplatePart::Text(text));
        }
        if pieces.peek().is_some() {
            parts.push(TemplatePart::PageNumber);
        }
    }
    parts
}

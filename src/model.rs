/// Highlight used by `<mark>` elements that carry no colour of their own.
pub const DEFAULT_HIGHLIGHT: &str = "#fef08a";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Inline formatting active at some point of the HTML tree.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub highlight: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub highlight: Option<String>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_format(text: impl Into<String>, format: &RunFormat) -> Self {
        Self {
            text: text.into(),
            bold: format.bold,
            italic: format.italic,
            underline: format.underline,
            strike: format.strike,
            highlight: format.highlight.clone(),
        }
    }

    pub fn format(&self) -> RunFormat {
        RunFormat {
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            strike: self.strike,
            highlight: self.highlight.clone(),
        }
    }

    pub fn same_format(&self, format: &RunFormat) -> bool {
        self.bold == format.bold
            && self.italic == format.italic
            && self.underline == format.underline
            && self.strike == format.strike
            && self.highlight == format.highlight
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Ordinal(u32),
}

impl ListMarker {
    pub fn label(self) -> String {
        match self {
            ListMarker::Bullet => "\u{2022}".to_string(),
            ListMarker::Ordinal(n) => format!("{n}."),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableCell {
    pub is_header: bool,
    pub runs: Vec<Run>,
}

impl TableCell {
    pub fn text(&self) -> String {
        plain_text(&self.runs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub is_header: bool,
    pub cells: Vec<TableCell>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        runs: Vec<Run>,
    },
    Paragraph {
        runs: Vec<Run>,
        alignment: Alignment,
    },
    ListItem {
        marker: ListMarker,
        depth: u8,
        runs: Vec<Run>,
    },
    Table {
        rows: Vec<TableRow>,
    },
    Blockquote {
        runs: Vec<Run>,
    },
}

impl Block {
    /// Inline runs of every block kind except tables.
    pub fn runs(&self) -> Option<&[Run]> {
        match self {
            Block::Heading { runs, .. }
            | Block::Paragraph { runs, .. }
            | Block::ListItem { runs, .. }
            | Block::Blockquote { runs } => Some(runs),
            Block::Table { .. } => None,
        }
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, Block::ListItem { .. })
    }
}

/// Normalized editor document. Built per export and dropped afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

pub fn plain_text(runs: &[Run]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

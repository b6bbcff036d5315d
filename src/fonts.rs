use pdf_writer::{Name, Pdf, Ref};

/// The four standard Helvetica faces. Every PDF reader ships them, so
/// nothing is embedded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum StandardFont {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl StandardFont {
    pub(crate) const ALL: [StandardFont; 4] = [
        StandardFont::Regular,
        StandardFont::Bold,
        StandardFont::Italic,
        StandardFont::BoldItalic,
    ];

    pub(crate) fn select(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => StandardFont::Regular,
            (true, false) => StandardFont::Bold,
            (false, true) => StandardFont::Italic,
            (true, true) => StandardFont::BoldItalic,
        }
    }

    /// Resource name used in content streams.
    pub(crate) fn pdf_name(self) -> &'static [u8] {
        match self {
            StandardFont::Regular => b"F1",
            StandardFont::Bold => b"F2",
            StandardFont::Italic => b"F3",
            StandardFont::BoldItalic => b"F4",
        }
    }

    fn base_font(self) -> &'static [u8] {
        match self {
            StandardFont::Regular => b"Helvetica",
            StandardFont::Bold => b"Helvetica-Bold",
            StandardFont::Italic => b"Helvetica-Oblique",
            StandardFont::BoldItalic => b"Helvetica-BoldOblique",
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, StandardFont::Bold | StandardFont::BoldItalic)
    }

    /// Width of a single character in 1000-units. Oblique faces share the
    /// metrics of their upright counterparts.
    pub(crate) fn char_width_1000(self, ch: char) -> f32 {
        let table = if self.is_bold() {
            &HELVETICA_BOLD_ASCII
        } else {
            &HELVETICA_ASCII
        };
        match ch {
            ' '..='~' => table[(ch as usize) - 32] as f32,
            '\u{a0}' => 278.0,
            '\u{2022}' => 350.0,
            '\u{2013}' => 556.0,
            '\u{2014}' | '\u{2026}' | '\u{2030}' => 1000.0,
            '\u{2018}' | '\u{2019}' | '\u{201a}' => {
                if self.is_bold() {
                    278.0
                } else {
                    222.0
                }
            }
            '\u{201c}' | '\u{201d}' | '\u{201e}' => {
                if self.is_bold() {
                    500.0
                } else {
                    333.0
                }
            }
            _ if ch.is_control() => 0.0,
            // Drawn as '?'
            _ if char_to_winansi(ch) == 0 => table[('?' as usize) - 32] as f32,
            _ => 556.0,
        }
    }

    pub(crate) fn word_width(self, word: &str, font_size: f32) -> f32 {
        word.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub(crate) fn space_width(self, font_size: f32) -> f32 {
        self.char_width_1000(' ') * font_size / 1000.0
    }
}

/// Helvetica advance widths for ASCII 32..=126 (Adobe core 14 metrics).
#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Write the four Type1 font dictionaries, returning their refs in
/// `StandardFont::ALL` order.
pub(crate) fn write_standard_fonts(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
) -> Vec<(StandardFont, Ref)> {
    StandardFont::ALL
        .iter()
        .map(|&font| {
            let font_ref = alloc();
            pdf.type1_font(font_ref)
                .base_font(Name(font.base_font()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            (font, font_ref)
        })
        .collect()
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str
/// encoding. Characters outside the code page become `?`.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .filter(|c| !c.is_control())
        .map(|c| match char_to_winansi(c) {
            0 => b'?',
            b => b,
        })
        .collect()
}

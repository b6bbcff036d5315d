//! Page format catalog and unit conversion.
//!
//! Formats are stored in inches and normalised to pixels at [`DPI`] when a
//! caller asks for [`PageDimensions`]. Exporters convert further to points
//! (PDF) or twips (DOCX) through [`convert`].

use std::fmt;

/// Screen pixels per inch.
pub const DPI: f32 = 96.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PageFormatId {
    #[default]
    Letter,
    Legal,
    Tabloid,
    A3,
    A4,
    A5,
}

impl PageFormatId {
    pub fn as_str(self) -> &'static str {
        match self {
            PageFormatId::Letter => "letter",
            PageFormatId::Legal => "legal",
            PageFormatId::Tabloid => "tabloid",
            PageFormatId::A3 => "a3",
            PageFormatId::A4 => "a4",
            PageFormatId::A5 => "a5",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "letter" => Some(PageFormatId::Letter),
            "legal" => Some(PageFormatId::Legal),
            "tabloid" => Some(PageFormatId::Tabloid),
            "a3" => Some(PageFormatId::A3),
            "a4" => Some(PageFormatId::A4),
            "a5" => Some(PageFormatId::A5),
            _ => None,
        }
    }

    /// Unknown identifiers fall back to the default format.
    pub fn parse_or_default(id: &str) -> Self {
        Self::parse(id).unwrap_or_else(|| {
            log::debug!("unknown page format {id:?}, using {}", Self::default().as_str());
            Self::default()
        })
    }
}

impl fmt::Display for PageFormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical page format. All lengths are inches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageFormat {
    pub id: PageFormatId,
    pub name: &'static str,
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

const fn uniform(
    id: PageFormatId,
    name: &'static str,
    width: f32,
    height: f32,
    margin: f32,
) -> PageFormat {
    PageFormat {
        id,
        name,
        width,
        height,
        margin_top: margin,
        margin_bottom: margin,
        margin_left: margin,
        margin_right: margin,
    }
}

static PAGE_FORMATS: [PageFormat; 6] = [
    uniform(PageFormatId::Letter, "Letter", 8.5, 11.0, 1.0),
    uniform(PageFormatId::Legal, "Legal", 8.5, 14.0, 1.0),
    uniform(PageFormatId::Tabloid, "Tabloid", 11.0, 17.0, 1.0),
    uniform(PageFormatId::A3, "A3", 11.69, 16.54, 1.0),
    uniform(PageFormatId::A4, "A4", 8.27, 11.69, 1.0),
    uniform(PageFormatId::A5, "A5", 5.83, 8.27, 0.75),
];

impl PageFormat {
    /// Every catalog entry, in display order.
    pub fn all() -> &'static [PageFormat] {
        &PAGE_FORMATS
    }
}

pub fn resolve_format(id: PageFormatId) -> &'static PageFormat {
    PAGE_FORMATS
        .iter()
        .find(|f| f.id == id)
        .unwrap_or(&PAGE_FORMATS[0])
}

/// Lookup by string identifier; unknown ids resolve to the default format.
pub fn resolve_format_str(id: &str) -> &'static PageFormat {
    resolve_format(PageFormatId::parse_or_default(id))
}

/// Page geometry in pixels at [`DPI`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub content_width: f32,
    pub content_height: f32,
}

pub fn to_pixel_dimensions(format: &PageFormat) -> PageDimensions {
    let px = |inches: f32| inches * DPI;
    let (width, height) = (px(format.width), px(format.height));
    let (margin_top, margin_bottom) = (px(format.margin_top), px(format.margin_bottom));
    let (margin_left, margin_right) = (px(format.margin_left), px(format.margin_right));
    PageDimensions {
        width,
        height,
        margin_top,
        margin_bottom,
        margin_left,
        margin_right,
        content_width: width - (margin_left + margin_right),
        content_height: height - (margin_top + margin_bottom),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    Pixel,
    Inch,
    Millimeter,
    Point,
    Twip,
}

impl Unit {
    fn per_inch(self) -> f32 {
        match self {
            Unit::Pixel => DPI,
            Unit::Inch => 1.0,
            Unit::Millimeter => 25.4,
            Unit::Point => 72.0,
            Unit::Twip => 1440.0,
        }
    }
}

pub fn convert(value: f32, from: Unit, to: Unit) -> f32 {
    if from == to {
        return value;
    }
    value / from.per_inch() * to.per_inch()
}

pub fn px_to_twips(px: f32) -> f32 {
    px / DPI * 72.0 * 20.0
}

pub fn px_to_pt(px: f32) -> f32 {
    convert(px, Unit::Pixel, Unit::Point)
}

pub fn mm_to_pt(mm: f32) -> f32 {
    convert(mm, Unit::Millimeter, Unit::Point)
}

pub fn inch_to_pt(inches: f32) -> f32 {
    inches * 72.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_px_to_twips() {
        assert_eq!(px_to_twips(96.0), 1440.0);
        assert_eq!(px_to_twips(72.0), 1080.0);
    }

    #[test]
    fn same_unit_is_identity() {
        assert_eq!(convert(12.5, Unit::Twip, Unit::Twip), 12.5);
    }
}

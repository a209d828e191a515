use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Points per millimetre (72 pt per inch, 25.4 mm per inch).
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Twentieths of a point per millimetre, the DOCX page unit.
pub const TWIPS_PER_MM: f32 = 1440.0 / 25.4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownValueError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Portrait `(width, height)` in points.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
        }
    }
}

impl FromStr for PageSize {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            _ => Err(UnknownValueError { kind: "page size", value: s.trim().to_string() }),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn name(&self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

impl FromStr for Orientation {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            _ => Err(UnknownValueError { kind: "orientation", value: s.trim().to_string() }),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

string_serde!(PageSize);
string_serde!(Orientation);

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self { top: 20.0, bottom: 20.0, left: 15.0, right: 15.0 }
    }
}

impl Margins {
    pub fn all(mm: f32) -> Self {
        Self { top: mm, bottom: mm, left: mm, right: mm }
    }
}

/// Physical page parameters shared by every encoder.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageSetup {
    pub size: PageSize,
    pub orientation: Orientation,
    pub margins: Margins,
}

impl PageSetup {
    /// Oriented `(width, height)` in points.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.size.dimensions_pt();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Oriented `(width, height)` in millimetres.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_pt();
        (w / PT_PER_MM, h / PT_PER_MM)
    }

    /// Oriented `(width, height)` in twips, rounded to whole units.
    pub fn dimensions_twips(&self) -> (u32, u32) {
        let (w, h) = self.dimensions_pt();
        ((w * 20.0).round() as u32, (h * 20.0).round() as u32)
    }

    /// True when the margins leave a printable area on both axes.
    pub fn has_printable_area(&self) -> bool {
        let (w, h) = self.dimensions_mm();
        let m = &self.margins;
        m.left + m.right < w && m.top + m.bottom < h
    }
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

pub fn mm_to_twips(mm: f32) -> u32 {
    (mm * TWIPS_PER_MM).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("letter".parse::<PageSize>(), Ok(PageSize::Letter));
        assert_eq!(" LEGAL ".parse::<PageSize>(), Ok(PageSize::Legal));
        assert_eq!("Landscape".parse::<Orientation>(), Ok(Orientation::Landscape));
        let err = "B5".parse::<PageSize>().unwrap_err();
        assert_eq!(err.to_string(), "unknown page size 'B5'");
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let portrait = PageSetup { size: PageSize::Legal, ..Default::default() };
        let landscape = PageSetup { orientation: Orientation::Landscape, ..portrait };
        assert_eq!(portrait.dimensions_pt(), (612.0, 1008.0));
        assert_eq!(landscape.dimensions_pt(), (1008.0, 612.0));
    }

    #[test]
    fn twips_match_word_page_sizes() {
        let a4 = PageSetup::default();
        assert_eq!(a4.dimensions_twips(), (11906, 16838));
        let letter = PageSetup { size: PageSize::Letter, ..Default::default() };
        assert_eq!(letter.dimensions_twips(), (12240, 15840));
        assert_eq!(mm_to_twips(25.4), 1440);
    }

    #[test]
    fn oversized_margins_leave_no_printable_area() {
        let setup = PageSetup { margins: Margins::all(150.0), ..Default::default() };
        assert!(!setup.has_printable_area());
        assert!(PageSetup::default().has_printable_area());
    }

    #[test]
    fn serializes_as_names() {
        let json = serde_json::to_value(PageSetup::default()).unwrap();
        assert_eq!(json["size"], "A4");
        assert_eq!(json["orientation"], "Portrait");
    }
}

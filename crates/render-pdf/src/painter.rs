//! Converts laid-out pages into content stream operations.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, StringFormat, dictionary};
use quire_layout::metrics::text_width;
use quire_layout::{LayoutElement, Page, PaginatedDocument, PositionedElement, RectElement, TextAlign, TextElement};
use quire_render_core::utils::flip_y;
use quire_types::substitute_page_tokens;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

const WATERMARK_GRAY: f32 = 0.85;
const WATERMARK_MAX_SIZE: f32 = 72.0;

/// The two standard Type1 faces every page references.
pub fn font_dictionary() -> Dictionary {
    let face = |base: &str| {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base,
            "Encoding" => "WinAnsiEncoding",
        }
    };
    dictionary! {
        REGULAR => face("Helvetica"),
        BOLD => face("Helvetica-Bold"),
    }
}

/// Encodes text for a WinAnsi simple font. Characters outside the encoding
/// become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Paints one page: watermark first, then header band, content and footer
/// band.
pub fn paint_page(
    doc: &PaginatedDocument,
    page: &Page,
    page_number: usize,
    total_pages: usize,
    watermark: Option<&str>,
) -> Content {
    let mut painter = Painter {
        ops: Vec::new(),
        page_height: doc.page_height,
        page_number,
        total_pages,
    };
    if let Some(text) = watermark {
        painter.watermark(text, doc.page_width);
    }
    for el in doc.header.elements.iter().chain(&page.elements).chain(&doc.footer.elements) {
        painter.element(el);
    }
    Content { operations: painter.ops }
}

struct Painter {
    ops: Vec<Operation>,
    page_height: f32,
    page_number: usize,
    total_pages: usize,
}

impl Painter {
    fn element(&mut self, el: &PositionedElement) {
        match &el.element {
            LayoutElement::Text(text) => self.text(el, text),
            LayoutElement::Rectangle(rect) => self.rect(el, rect),
        }
    }

    fn text(&mut self, el: &PositionedElement, text: &TextElement) {
        let content = if text.dynamic {
            substitute_page_tokens(&text.content, self.page_number, self.total_pages)
        } else {
            text.content.clone()
        };
        if content.is_empty() {
            return;
        }
        let x = match text.align {
            TextAlign::Left => el.x,
            TextAlign::Center => el.x + (el.width - text_width(&content, text.size, text.bold)).max(0.0) / 2.0,
        };
        let baseline = el.y + (el.height - text.size) / 2.0 + text.size * 0.8;
        let font = if text.bold { BOLD } else { REGULAR };

        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new("Tf", vec![font.into(), text.size.into()]));
        self.ops.push(Operation::new("Td", vec![x.into(), flip_y(baseline, self.page_height).into()]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&content), StringFormat::Literal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn rect(&mut self, el: &PositionedElement, rect: &RectElement) {
        let bounds = vec![
            el.x.into(),
            flip_y(el.y + el.height, self.page_height).into(),
            el.width.into(),
            el.height.into(),
        ];
        self.ops.push(Operation::new("q", vec![]));
        if let Some(gray) = rect.fill {
            self.ops.push(Operation::new("g", vec![gray.into()]));
        }
        if let Some(gray) = rect.stroke {
            self.ops.push(Operation::new("G", vec![gray.into()]));
            self.ops.push(Operation::new("w", vec![0.5f32.into()]));
        }
        self.ops.push(Operation::new("re", bounds));
        let paint = match (rect.fill.is_some(), rect.stroke.is_some()) {
            (true, true) => "B",
            (true, false) => "f",
            (false, true) => "S",
            (false, false) => "n",
        };
        self.ops.push(Operation::new(paint, vec![]));
        self.ops.push(Operation::new("Q", vec![]));
    }

    /// Large light-gray text rotated 45 degrees about the page center.
    fn watermark(&mut self, text: &str, page_width: f32) {
        let diagonal = (page_width.powi(2) + self.page_height.powi(2)).sqrt();
        let unit_width = text_width(text, 1.0, true).max(0.01);
        let size = (diagonal * 0.6 / unit_width).min(WATERMARK_MAX_SIZE);
        let width = unit_width * size;

        let (sin, cos) = std::f32::consts::FRAC_PI_4.sin_cos();
        let cx = page_width / 2.0;
        let cy = self.page_height / 2.0;
        // Shift the start point back along the baseline and down by a third
        // of the size so the text is centered on the page.
        let x = cx - (width / 2.0) * cos + (size / 3.0) * sin;
        let y = cy - (width / 2.0) * sin - (size / 3.0) * cos;

        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new("g", vec![WATERMARK_GRAY.into()]));
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new("Tf", vec![BOLD.into(), size.into()]));
        self.ops.push(Operation::new(
            "Tm",
            vec![cos.into(), sin.into(), (-sin).into(), cos.into(), x.into(), y.into()],
        ));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
        self.ops.push(Operation::new("Q", vec![]));
    }
}

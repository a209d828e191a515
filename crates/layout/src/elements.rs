/// A painted item with its box in points, origin at the top-left of the page.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedElement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub element: LayoutElement,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LayoutElement {
    Text(TextElement),
    Rectangle(RectElement),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextElement {
    pub content: String,
    pub size: f32,
    pub bold: bool,
    pub align: TextAlign,
    /// Contains `{page}`/`{total}` placeholders the painter fills in per page.
    pub dynamic: bool,
}

/// Gray levels are in `0.0..=1.0`, 1.0 being white.
#[derive(Clone, Debug, PartialEq)]
pub struct RectElement {
    pub fill: Option<f32>,
    pub stroke: Option<f32>,
}

impl PositionedElement {
    pub fn text(x: f32, y: f32, width: f32, height: f32, text: TextElement) -> Self {
        Self { x, y, width, height, element: LayoutElement::Text(text) }
    }

    pub fn rect(x: f32, y: f32, width: f32, height: f32, rect: RectElement) -> Self {
        Self { x, y, width, height, element: LayoutElement::Rectangle(rect) }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match &self.element {
            LayoutElement::Text(t) => Some(t),
            LayoutElement::Rectangle(_) => None,
        }
    }
}

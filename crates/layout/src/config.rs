#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Body text size in points. Headings scale from it.
    ///
    /// Defaults to `10.0`.
    pub base_font_size: f32,

    /// Line height as a multiple of the font size.
    ///
    /// Defaults to `1.3`.
    pub line_spacing: f32,

    /// Vertical gap in points between the header band, the content area and
    /// the footer band.
    ///
    /// Defaults to `8.0`.
    pub band_gap: f32,

    /// The maximum number of pages a single document may produce before
    /// pagination is aborted.
    ///
    /// - **`None`**: no limit. A pathological template can then exhaust
    ///   memory instead of failing with a structured error.
    ///
    /// Defaults to `Some(10000)`.
    pub max_pages: Option<usize>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_font_size: 10.0,
            line_spacing: 1.3,
            band_gap: 8.0,
            max_pages: Some(10_000),
        }
    }
}

impl LayoutConfig {
    pub fn line_height(&self, size: f32) -> f32 {
        size * self.line_spacing
    }

    pub fn heading_size(&self, level: u8) -> f32 {
        let scale = match level {
            1 => 1.6,
            2 => 1.3,
            _ => 1.15,
        };
        self.base_font_size * scale
    }
}

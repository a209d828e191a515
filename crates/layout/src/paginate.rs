//! Page flow for page-oriented encoders.
//!
//! Pagination runs as a complete pass before anything is painted, so the
//! total page count is known when `{page}`/`{total}` placeholders are filled
//! in. Header and footer are laid out once as fixed bands; only the content
//! section flows across pages.

use crate::config::LayoutConfig;
use crate::elements::{PositionedElement, RectElement, TextAlign, TextElement};
use crate::flow::{FlowBlock, Table};
use crate::metrics::{BULLET, wrap_text};
use crate::model::{LayoutModel, ResolvedSection};
use log::debug;
use quire_types::{CancellationToken, has_page_tokens, mm_to_pt};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("layout cancelled")]
    Cancelled,
    #[error("document exceeds the limit of {0} pages")]
    PageLimit(usize),
    #[error("header and footer leave no room for content ({0:.2}pt available)")]
    NoPrintableArea(f32),
    #[error("element has a height of {0:.2} which exceeds the total page content height of {1:.2}")]
    ElementTooLarge(f32, f32),
}

/// A pinned region painted identically on every page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Band {
    pub height: f32,
    pub elements: Vec<PositionedElement>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<PositionedElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedDocument {
    pub page_width: f32,
    pub page_height: f32,
    pub header: Band,
    pub footer: Band,
    pub pages: Vec<Page>,
}

impl PaginatedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

const CELL_PADDING: f32 = 3.0;
const TABLE_STROKE: f32 = 0.6;
const TABLE_HEADER_FILL: f32 = 0.9;

/// Lays out the model onto pages.
///
/// `page_number_format` adds a centered line at the bottom of the footer
/// band; pass `None` when page numbers are disabled.
pub fn paginate(
    model: &LayoutModel,
    page_number_format: Option<&str>,
    config: &LayoutConfig,
    cancel: &CancellationToken,
) -> Result<PaginatedDocument, LayoutError> {
    let setup = &model.page_setup;
    let (page_width, page_height) = setup.dimensions_pt();
    let left = mm_to_pt(setup.margins.left);
    let width = page_width - left - mm_to_pt(setup.margins.right);
    let margin_top = mm_to_pt(setup.margins.top);
    let margin_bottom = page_height - mm_to_pt(setup.margins.bottom);

    let header = layout_band(model.header(), None, left, width, margin_top, config)?;

    let mut footer = layout_band(model.footer(), page_number_format, left, width, 0.0, config)?;
    let footer_top = margin_bottom - footer.height;
    for el in &mut footer.elements {
        el.y += footer_top;
    }

    let gap = |band: &Band| if band.height > 0.0 { band.height + config.band_gap } else { 0.0 };
    let top = margin_top + gap(&header);
    let bottom = margin_bottom - gap(&footer);
    if bottom - top < config.line_height(config.base_font_size) {
        return Err(LayoutError::NoPrintableArea((bottom - top).max(0.0)));
    }

    let mut flow = Flow::paged(config, left, width, top, bottom);
    for block in &model.content().blocks {
        if cancel.is_cancelled() {
            return Err(LayoutError::Cancelled);
        }
        flow.block(block)?;
    }
    let pages = flow.finish();
    debug!("Paginated content into {} pages", pages.len());

    Ok(PaginatedDocument { page_width, page_height, header, footer, pages })
}

fn layout_band(
    section: Option<&ResolvedSection>,
    page_number_format: Option<&str>,
    x: f32,
    width: f32,
    top: f32,
    config: &LayoutConfig,
) -> Result<Band, LayoutError> {
    let mut flow = Flow::band(config, x, width, top);
    if let Some(section) = section {
        for block in &section.blocks {
            flow.block(block)?;
        }
    }
    if let Some(format) = page_number_format {
        flow.page_number_line(format);
    }
    let elements = flow.current;
    let height = elements
        .iter()
        .map(PositionedElement::bottom)
        .fold(top, f32::max)
        - top;
    Ok(Band { height, elements })
}

struct Flow<'a> {
    config: &'a LayoutConfig,
    x: f32,
    width: f32,
    top: f32,
    bottom: f32,
    cursor: f32,
    /// Bands never break and may hold page placeholders.
    pinned: bool,
    current: Vec<PositionedElement>,
    pages: Vec<Page>,
}

impl<'a> Flow<'a> {
    fn paged(config: &'a LayoutConfig, x: f32, width: f32, top: f32, bottom: f32) -> Self {
        Self {
            config,
            x,
            width,
            top,
            bottom,
            cursor: top,
            pinned: false,
            current: Vec::new(),
            pages: Vec::new(),
        }
    }

    fn band(config: &'a LayoutConfig, x: f32, width: f32, top: f32) -> Self {
        Self {
            pinned: true,
            ..Self::paged(config, x, width, top, f32::INFINITY)
        }
    }

    fn at_page_top(&self) -> bool {
        self.current.is_empty()
    }

    fn area_height(&self) -> f32 {
        self.bottom - self.top
    }

    fn fits(&self, height: f32) -> bool {
        self.cursor + height <= self.bottom || self.at_page_top()
    }

    fn new_page(&mut self) -> Result<(), LayoutError> {
        let elements = std::mem::take(&mut self.current);
        self.pages.push(Page { elements });
        // The page about to be started also counts against the limit.
        if let Some(max) = self.config.max_pages {
            if self.pages.len() >= max {
                return Err(LayoutError::PageLimit(max));
            }
        }
        self.cursor = self.top;
        Ok(())
    }

    fn ensure(&mut self, height: f32) -> Result<(), LayoutError> {
        if !self.fits(height) {
            self.new_page()?;
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(Page { elements: self.current });
        }
        self.pages
    }

    fn text(&self, content: String, size: f32, bold: bool) -> TextElement {
        let dynamic = self.pinned && has_page_tokens(&content);
        TextElement { content, size, bold, align: TextAlign::Left, dynamic }
    }

    fn line(&mut self, x: f32, width: f32, content: String, size: f32, bold: bool) {
        let height = self.config.line_height(size);
        let text = self.text(content, size, bold);
        self.current.push(PositionedElement::text(x, self.cursor, width, height, text));
        self.cursor += height;
    }

    fn block(&mut self, block: &FlowBlock) -> Result<(), LayoutError> {
        match block {
            FlowBlock::Heading { level, text } => self.heading(*level, text),
            FlowBlock::Paragraph(text) => self.paragraph(text),
            FlowBlock::ListItem(text) => self.list_item(text),
            FlowBlock::Table(table) => self.table(table),
            FlowBlock::PageBreak => {
                if !self.pinned && !self.at_page_top() {
                    self.new_page()?;
                }
                Ok(())
            }
        }
    }

    fn heading(&mut self, level: u8, text: &str) -> Result<(), LayoutError> {
        let size = self.config.heading_size(level);
        let lh = self.config.line_height(size);
        let lines = wrap_text(text, self.width, size, true);
        let total = lh * lines.len() as f32;
        let space_before = if self.at_page_top() { 0.0 } else { self.config.base_font_size * 0.6 };

        if total <= self.area_height() {
            self.ensure(space_before + total)?;
        }
        if !self.at_page_top() {
            self.cursor += space_before;
        }
        for line in lines {
            self.ensure(lh)?;
            self.line(self.x, self.width, line, size, true);
        }
        self.cursor += self.config.base_font_size * 0.3;
        Ok(())
    }

    fn paragraph(&mut self, text: &str) -> Result<(), LayoutError> {
        let size = self.config.base_font_size;
        let lh = self.config.line_height(size);
        for line in wrap_text(text, self.width, size, false) {
            self.ensure(lh)?;
            self.line(self.x, self.width, line, size, false);
        }
        self.cursor += size * 0.5;
        Ok(())
    }

    fn list_item(&mut self, text: &str) -> Result<(), LayoutError> {
        let size = self.config.base_font_size;
        let lh = self.config.line_height(size);
        let indent = size * 1.4;
        let text_x = self.x + indent;
        let text_width = self.width - indent;

        for (i, line) in wrap_text(text, text_width, size, false).into_iter().enumerate() {
            self.ensure(lh)?;
            if i == 0 {
                let bullet = self.text(BULLET.to_string(), size, false);
                self.current
                    .push(PositionedElement::text(self.x + size * 0.4, self.cursor, indent, lh, bullet));
            }
            self.line(text_x, text_width, line, size, false);
        }
        self.cursor += size * 0.2;
        Ok(())
    }

    fn table(&mut self, table: &Table) -> Result<(), LayoutError> {
        let columns = table.column_count();
        if columns == 0 {
            return Ok(());
        }
        let col_width = self.width / columns as f32;
        let header = table
            .header
            .as_ref()
            .map(|cells| self.row_lines(cells, columns, col_width, true));

        let mut first = true;
        for cells in &table.rows {
            let row = self.row_lines(cells, columns, col_width, false);
            let header_height = header.as_ref().map_or(0.0, |h| h.height);

            if first {
                // Keep the header with the first body row.
                if header_height + row.height <= self.area_height() {
                    self.ensure(header_height + row.height)?;
                }
                if let Some(h) = &header {
                    self.emit_row(h, col_width)?;
                }
                first = false;
            } else if !self.fits(row.height) {
                self.new_page()?;
                if let Some(h) = &header {
                    self.emit_row(h, col_width)?;
                }
            }
            self.emit_row(&row, col_width)?;
        }
        if first {
            if let Some(h) = &header {
                self.emit_row(h, col_width)?;
            }
        }
        self.cursor += self.config.base_font_size * 0.5;
        Ok(())
    }

    fn row_lines(&self, cells: &[String], columns: usize, col_width: f32, bold: bool) -> RowLayout {
        let size = self.config.base_font_size;
        let inner = (col_width - 2.0 * CELL_PADDING).max(1.0);
        let cells: Vec<Vec<String>> = (0..columns)
            .map(|i| match cells.get(i) {
                Some(cell) if !cell.is_empty() => wrap_text(cell, inner, size, bold),
                _ => Vec::new(),
            })
            .collect();
        let max_lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let height = max_lines as f32 * self.config.line_height(size) + 2.0 * CELL_PADDING;
        RowLayout { cells, height, bold }
    }

    fn emit_row(&mut self, row: &RowLayout, col_width: f32) -> Result<(), LayoutError> {
        if !self.pinned && row.height > self.area_height() {
            return Err(LayoutError::ElementTooLarge(row.height, self.area_height()));
        }
        self.ensure(row.height)?;

        let size = self.config.base_font_size;
        let lh = self.config.line_height(size);
        let y = self.cursor;
        for (i, lines) in row.cells.iter().enumerate() {
            let x = self.x + col_width * i as f32;
            let rect = RectElement {
                fill: row.bold.then_some(TABLE_HEADER_FILL),
                stroke: Some(TABLE_STROKE),
            };
            self.current.push(PositionedElement::rect(x, y, col_width, row.height, rect));
            for (j, line) in lines.iter().enumerate() {
                let text = self.text(line.clone(), size, row.bold);
                self.current.push(PositionedElement::text(
                    x + CELL_PADDING,
                    y + CELL_PADDING + lh * j as f32,
                    col_width - 2.0 * CELL_PADDING,
                    lh,
                    text,
                ));
            }
        }
        self.cursor += row.height;
        Ok(())
    }

    fn page_number_line(&mut self, format: &str) {
        let size = self.config.base_font_size * 0.9;
        let height = self.config.line_height(size);
        let text = TextElement {
            content: format.to_string(),
            size,
            bold: false,
            align: TextAlign::Center,
            dynamic: has_page_tokens(format),
        };
        self.current
            .push(PositionedElement::text(self.x, self.cursor, self.width, height, text));
        self.cursor += height;
    }
}

struct RowLayout {
    cells: Vec<Vec<String>>,
    height: f32,
    bold: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::resolve;
    use quire_template::{BindingContext, HandlebarsAdapter, parse};

    fn model(template: &str) -> LayoutModel {
        let skeleton = parse(template).unwrap();
        resolve(&skeleton, &BindingContext::new(&[]), &HandlebarsAdapter::new()).unwrap()
    }

    fn lines(n: usize) -> String {
        (0..n).map(|i| format!("Line {}\n\n", i)).collect()
    }

    fn texts(page: &Page) -> Vec<&str> {
        page.elements
            .iter()
            .filter_map(|e| e.as_text())
            .map(|t| t.content.as_str())
            .collect()
    }

    #[test]
    fn short_content_is_one_page() {
        let doc = paginate(
            &model("{{#section \"content\"}}\nHello\n{{/section}}"),
            None,
            &LayoutConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(texts(&doc.pages[0]), vec!["Hello"]);
        assert!(doc.header.elements.is_empty());
        assert!((doc.page_width - 595.28).abs() < 0.01);
    }

    #[test]
    fn long_content_flows_across_pages_in_order() {
        let template = format!("{{{{#section \"content\"}}}}\n{}{{{{/section}}}}", lines(200));
        let doc = paginate(&model(&template), None, &LayoutConfig::default(), &CancellationToken::new()).unwrap();
        assert!(doc.page_count() > 1);

        let all: Vec<&str> = doc.pages.iter().flat_map(texts).collect();
        assert_eq!(all.len(), 200);
        assert_eq!(all[0], "Line 0");
        assert_eq!(all[199], "Line 199");
        for page in &doc.pages {
            for el in &page.elements {
                assert!(el.bottom() <= doc.page_height - mm_to_pt(20.0) + 0.01);
            }
        }
    }

    #[test]
    fn explicit_page_breaks() {
        let doc = paginate(
            &model("{{#section \"content\"}}\nOne\n[[pagebreak]]\n[[pagebreak]]\nTwo\n{{/section}}"),
            None,
            &LayoutConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(texts(&doc.pages[1]), vec!["Two"]);
    }

    #[test]
    fn footer_band_holds_page_number_line() {
        let doc = paginate(
            &model("{{#section \"content\"}}\nBody\n{{/section}}\n{{#section \"footer\"}}\nConfidential\n{{/section}}"),
            Some("Page {page} of {total}"),
            &LayoutConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();
        let footer: Vec<_> = doc.footer.elements.iter().filter_map(|e| e.as_text()).collect();
        assert_eq!(footer.len(), 2);
        assert_eq!(footer[0].content, "Confidential");
        assert!(!footer[0].dynamic);
        assert!(footer[1].dynamic);
        assert_eq!(footer[1].align, TextAlign::Center);

        let bottom = doc.footer.elements.iter().map(PositionedElement::bottom).fold(0.0, f32::max);
        assert!((bottom - (doc.page_height - mm_to_pt(20.0))).abs() < 0.01);
    }

    #[test]
    fn table_header_repeats_after_a_break() {
        let mut body = String::from("| Name | Total |\n|---|---|\n");
        for i in 0..120 {
            body.push_str(&format!("| row{} | {} |\n", i, i));
        }
        let template = format!("{{{{#section \"content\"}}}}\n{}{{{{/section}}}}", body);
        let doc = paginate(&model(&template), None, &LayoutConfig::default(), &CancellationToken::new()).unwrap();
        assert!(doc.page_count() > 1);
        for page in &doc.pages {
            let t = texts(page);
            assert_eq!(&t[..2], &["Name", "Total"]);
        }
    }

    #[test]
    fn page_limit_is_enforced() {
        let template = format!("{{{{#section \"content\"}}}}\n{}{{{{/section}}}}", lines(400));
        let config = LayoutConfig { max_pages: Some(2), ..LayoutConfig::default() };
        let err = paginate(&model(&template), None, &config, &CancellationToken::new()).unwrap_err();
        assert_eq!(err, LayoutError::PageLimit(2));
    }

    #[test]
    fn cancellation_stops_layout() {
        let token = CancellationToken::new();
        token.cancel();
        let err = paginate(
            &model("{{#section \"content\"}}\nBody\n{{/section}}"),
            None,
            &LayoutConfig::default(),
            &token,
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::Cancelled);
    }

    #[test]
    fn oversized_bands_leave_no_room() {
        let template = format!(
            "{{{{#section \"header\"}}}}\n{}{{{{/section}}}}\n{{{{#section \"content\"}}}}\nx\n{{{{/section}}}}",
            lines(80)
        );
        let err = paginate(&model(&template), None, &LayoutConfig::default(), &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, LayoutError::NoPrintableArea(_)));
    }
}

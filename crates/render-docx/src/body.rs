//! Flow blocks to WordprocessingML body markup.

use quick_xml::escape::escape;
use quire_layout::{FlowBlock, Table};
use quire_types::{PageNumberToken, tokenize_page_format};
use std::fmt::Write;

/// Width available to tables, in twips.
#[derive(Debug, Clone, Copy)]
pub struct BodyWidth(pub u32);

/// Where a block list is placed. Page placeholders become fields only in
/// header and footer parts; explicit page breaks only apply to the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Body,
    Header,
    Footer,
}

impl Placement {
    pub fn is_pinned(self) -> bool {
        self != Placement::Body
    }

    /// Paragraph style for plain text in this placement.
    fn text_style(self) -> Option<&'static str> {
        match self {
            Placement::Body => None,
            Placement::Header => Some("Header"),
            Placement::Footer => Some("Footer"),
        }
    }
}

pub fn write_blocks(out: &mut String, blocks: &[FlowBlock], width: BodyWidth, placement: Placement) {
    for block in blocks {
        match block {
            FlowBlock::Heading { level, text } => {
                paragraph(out, Some(&format!("Heading{}", level)), None, text, placement)
            }
            FlowBlock::Paragraph(text) => paragraph(out, placement.text_style(), None, text, placement),
            FlowBlock::ListItem(text) => {
                paragraph(out, Some("ListBullet"), None, &format!("\u{2022}\t{}", text), placement)
            }
            FlowBlock::Table(table) => write_table(out, table, width, placement),
            FlowBlock::PageBreak => {
                if placement == Placement::Body {
                    out.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
                }
            }
        }
    }
}

/// A centered paragraph holding the page-number format as fields.
pub fn page_number_paragraph(out: &mut String, format: &str) {
    paragraph(out, Some("Footer"), Some("center"), format, Placement::Footer);
}

fn paragraph(out: &mut String, style: Option<&str>, justify: Option<&str>, text: &str, placement: Placement) {
    out.push_str("<w:p>");
    if style.is_some() || justify.is_some() {
        out.push_str("<w:pPr>");
        if let Some(style) = style {
            let _ = write!(out, r#"<w:pStyle w:val="{}"/>"#, style);
        }
        if let Some(jc) = justify {
            let _ = write!(out, r#"<w:jc w:val="{}"/>"#, jc);
        }
        out.push_str("</w:pPr>");
    }
    runs(out, text, false, placement);
    out.push_str("</w:p>");
}

fn runs(out: &mut String, text: &str, bold: bool, placement: Placement) {
    if !placement.is_pinned() {
        run(out, text, bold);
        return;
    }
    for token in tokenize_page_format(text) {
        match token {
            PageNumberToken::Text(t) => run(out, t, bold),
            PageNumberToken::Page => field(out, "PAGE", bold),
            PageNumberToken::Total => field(out, "NUMPAGES", bold),
        }
    }
}

fn run_properties(out: &mut String, bold: bool) {
    if bold {
        out.push_str("<w:rPr><w:b/></w:rPr>");
    }
}

fn run(out: &mut String, text: &str, bold: bool) {
    if text.is_empty() {
        return;
    }
    out.push_str("<w:r>");
    run_properties(out, bold);
    for (i, segment) in text.split('\t').enumerate() {
        if i > 0 {
            out.push_str("<w:tab/>");
        }
        if !segment.is_empty() {
            let _ = write!(out, r#"<w:t xml:space="preserve">{}</w:t>"#, escape(segment));
        }
    }
    out.push_str("</w:r>");
}

/// A field the word processor evaluates when it lays out pages. The cached
/// result is a placeholder until then.
fn field(out: &mut String, instruction: &str, bold: bool) {
    let _ = write!(out, r#"<w:fldSimple w:instr=" {} \* MERGEFORMAT ">"#, instruction);
    out.push_str("<w:r>");
    run_properties(out, bold);
    out.push_str("<w:t>1</w:t></w:r></w:fldSimple>");
}

fn write_table(out: &mut String, table: &Table, width: BodyWidth, placement: Placement) {
    let columns = table.column_count();
    if columns == 0 {
        return;
    }
    let col_width = width.0 / columns as u32;

    out.push_str("<w:tbl><w:tblPr><w:tblStyle w:val=\"TableGrid\"/>");
    let _ = write!(out, r#"<w:tblW w:w="{}" w:type="dxa"/>"#, col_width * columns as u32);
    out.push_str("<w:tblBorders>");
    for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        let _ = write!(out, r#"<w:{} w:val="single" w:sz="4" w:space="0" w:color="999999"/>"#, side);
    }
    out.push_str("</w:tblBorders></w:tblPr><w:tblGrid>");
    for _ in 0..columns {
        let _ = write!(out, r#"<w:gridCol w:w="{}"/>"#, col_width);
    }
    out.push_str("</w:tblGrid>");

    if let Some(header) = &table.header {
        table_row(out, header, columns, col_width, true, placement);
    }
    for row in &table.rows {
        table_row(out, row, columns, col_width, false, placement);
    }
    out.push_str("</w:tbl>");
    // Word requires a paragraph between a table and the end of a cell or
    // part, and it keeps adjacent tables apart.
    out.push_str("<w:p/>");
}

fn table_row(out: &mut String, cells: &[String], columns: usize, col_width: u32, header: bool, placement: Placement) {
    out.push_str("<w:tr>");
    if header {
        // Repeated at the top of each page the table spans.
        out.push_str("<w:trPr><w:tblHeader/></w:trPr>");
    }
    for i in 0..columns {
        let _ = write!(out, r#"<w:tc><w:tcPr><w:tcW w:w="{}" w:type="dxa"/>"#, col_width);
        if header {
            out.push_str(r#"<w:shd w:val="clear" w:color="auto" w:fill="E6E6E6"/>"#);
        }
        out.push_str("</w:tcPr><w:p>");
        if let Some(text) = cells.get(i) {
            runs(out, text, header, placement);
        }
        out.push_str("</w:p></w:tc>");
    }
    out.push_str("</w:tr>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_layout::flow::parse_blocks;

    fn render(text: &str, placement: Placement) -> String {
        let mut out = String::new();
        write_blocks(&mut out, &parse_blocks(text), BodyWidth(9000), placement);
        out
    }

    #[test]
    fn escapes_text() {
        let xml = render("Fish & <chips>", Placement::Body);
        assert!(xml.contains("Fish &amp; &lt;chips&gt;"), "{}", xml);
    }

    #[test]
    fn headings_and_lists_use_styles() {
        let xml = render("## Totals\n- first", Placement::Body);
        assert!(xml.contains(r#"<w:pStyle w:val="Heading2"/>"#));
        assert!(xml.contains(r#"<w:pStyle w:val="ListBullet"/>"#));
        assert!(xml.contains("<w:tab/>"));
    }

    #[test]
    fn page_tokens_become_fields_only_when_pinned() {
        let pinned = render("Page {page} of {total}", Placement::Footer);
        assert!(pinned.contains(r#"w:instr=" PAGE \* MERGEFORMAT ""#));
        assert!(pinned.contains(r#"w:instr=" NUMPAGES \* MERGEFORMAT ""#));
        assert!(!pinned.contains("{page}"));

        let body = render("Page {page}", Placement::Body);
        assert!(body.contains("{page}"));
        assert!(!body.contains("fldSimple"));
    }

    #[test]
    fn pinned_text_uses_part_styles() {
        let header = render("Quarterly Sales", Placement::Header);
        assert!(header.contains(r#"<w:pStyle w:val="Header"/>"#), "{}", header);
        let footer = render("Confidential", Placement::Footer);
        assert!(footer.contains(r#"<w:pStyle w:val="Footer"/>"#), "{}", footer);
        assert!(!render("Body text", Placement::Body).contains("w:pStyle"));
        assert!(render("# Title", Placement::Header).contains(r#"<w:pStyle w:val="Heading1"/>"#));
    }

    #[test]
    fn tables_mark_header_rows() {
        let xml = render("| A | B |\n|---|---|\n| 1 | 2 |", Placement::Body);
        assert_eq!(xml.matches("<w:tr>").count(), 2);
        assert_eq!(xml.matches("<w:tblHeader/>").count(), 1);
        assert_eq!(xml.matches(r#"<w:gridCol w:w="4500"/>"#).count(), 2);
    }

    #[test]
    fn page_breaks_are_body_only() {
        assert!(render("a\n[[pagebreak]]\nb", Placement::Body).contains(r#"<w:br w:type="page"/>"#));
        assert!(!render("a\n[[pagebreak]]\nb", Placement::Header).contains("w:br"));
    }
}

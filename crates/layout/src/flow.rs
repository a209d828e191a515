//! Line-oriented markup of rendered section text.
//!
//! Both encoders consume the same block list: the PDF encoder paginates it,
//! the DOCX encoder maps it onto paragraphs and tables.

const PAGE_BREAK: &str = "[[pagebreak]]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowBlock {
    Heading { level: u8, text: String },
    Paragraph(String),
    ListItem(String),
    Table(Table),
    PageBreak,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.header
            .iter()
            .chain(self.rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.rows.is_empty()
    }
}

/// Splits rendered text into flow blocks.
pub fn parse_blocks(text: &str) -> Vec<FlowBlock> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut table: Option<Table> = None;

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with('|') {
            flush_paragraph(&mut paragraph, &mut blocks);
            let current = table.get_or_insert_with(Table::default);
            if is_separator_row(trimmed) {
                if current.header.is_none() && current.rows.len() == 1 {
                    current.header = current.rows.pop();
                }
            } else {
                current.rows.push(split_cells(trimmed));
            }
            continue;
        }
        if let Some(done) = table.take() {
            if !done.is_empty() {
                blocks.push(FlowBlock::Table(done));
            }
        }

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
        } else if trimmed.eq_ignore_ascii_case(PAGE_BREAK) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(FlowBlock::PageBreak);
        } else if let Some((level, text)) = heading(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(FlowBlock::Heading { level, text: text.to_string() });
        } else if let Some(item) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(FlowBlock::ListItem(item.trim().to_string()));
        } else {
            paragraph.push(trimmed);
        }
    }

    flush_paragraph(&mut paragraph, &mut blocks);
    if let Some(done) = table {
        if !done.is_empty() {
            blocks.push(FlowBlock::Table(done));
        }
    }
    blocks
}

fn flush_paragraph(lines: &mut Vec<&str>, blocks: &mut Vec<FlowBlock>) {
    if !lines.is_empty() {
        blocks.push(FlowBlock::Paragraph(lines.join(" ")));
        lines.clear();
    }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if !(1..=3).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(' ') {
        return None;
    }
    let text = rest.trim();
    if text.is_empty() { None } else { Some((hashes as u8, text)) }
}

fn is_separator_row(line: &str) -> bool {
    line.contains('-') && line.chars().all(|c| matches!(c, '-' | ':' | '|' | ' '))
}

fn split_cells(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

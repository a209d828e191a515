//! Turns hybrid template text into a [`LayoutSkeleton`].
//!
//! A template is made of directive comments and section blocks:
//!
//! ```text
//! {{!--
//! format: pdf
//! pageSize: Letter
//! orientation: Landscape
//! --}}
//! {{#section "header"}}
//! Sales by region
//! {{/section}}
//! {{#section "content"}}
//! {{#each rows}}
//! | {{region}} | {{total}} |
//! {{/each}}
//! {{/section}}
//! ```
//!
//! Directive comments are only read outside sections; comments inside a
//! section body belong to the binding engine.

use crate::error::TemplateError;
use crate::skeleton::{Directive, DocumentSettings, LayoutSkeleton, RawSection, SectionKind};
use log::{debug, warn};
use quire_types::{Margins, Orientation, OutputFormat, PageSetup, PageSize};

const COMMENT_OPEN: &str = "{{!--";
const COMMENT_CLOSE: &str = "--}}";
const SECTION_OPEN: &str = "{{#section";
const SECTION_CLOSE: &str = "{{/section";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Log and ignore directive values that fail validation instead of
    /// failing the parse. Page setup then falls back to `A4`/`Portrait`.
    pub lenient_directives: bool,
}

/// Parses template text with strict directive validation.
pub fn parse(text: &str) -> Result<LayoutSkeleton, TemplateError> {
    parse_with(text, ParseOptions::default())
}

pub fn parse_with(text: &str, options: ParseOptions) -> Result<LayoutSkeleton, TemplateError> {
    let mut parser = Parser::new(options);
    for (idx, line) in text.lines().enumerate() {
        parser.feed(idx + 1, line)?;
    }
    parser.finish()
}

struct OpenSection {
    kind: SectionKind,
    line: usize,
    body: Vec<String>,
}

struct OpenComment {
    line: usize,
    lines: Vec<(usize, String)>,
}

enum Marker<'a> {
    Start(&'a str),
    End(Option<&'a str>),
}

struct Parser {
    options: ParseOptions,
    directives: Vec<Directive>,
    sections: Vec<RawSection>,
    section: Option<OpenSection>,
    comment: Option<OpenComment>,
}

impl Parser {
    fn new(options: ParseOptions) -> Self {
        Self {
            options,
            directives: Vec::new(),
            sections: Vec::new(),
            section: None,
            comment: None,
        }
    }

    fn feed(&mut self, line_no: usize, line: &str) -> Result<(), TemplateError> {
        if let Some(comment) = self.comment.as_mut() {
            match line.find(COMMENT_CLOSE) {
                Some(end) => {
                    comment.lines.push((line_no, line[..end].to_string()));
                    if let Some(done) = self.comment.take() {
                        self.collect_directives(done.lines);
                    }
                }
                None => comment.lines.push((line_no, line.to_string())),
            }
            return Ok(());
        }

        let trimmed = line.trim();
        let marker = parse_marker(trimmed);

        if let Some(open) = self.section.as_mut() {
            match marker {
                Some(Marker::Start(name)) => {
                    let message = if name == open.kind.name() {
                        format!("nested '{}' section (opened on line {})", name, open.line)
                    } else {
                        format!("cannot start inside section '{}' (opened on line {})", open.kind, open.line)
                    };
                    return Err(TemplateError::section_at(name, line_no, message));
                }
                Some(Marker::End(name)) => {
                    if let Some(name) = name {
                        if name != open.kind.name() {
                            return Err(TemplateError::section_at(
                                open.kind.name(),
                                line_no,
                                format!("end marker names '{}'", name),
                            ));
                        }
                    }
                    if let Some(done) = self.section.take() {
                        debug!("Parsed section '{}' ({} lines)", done.kind, done.body.len());
                        self.sections.push(RawSection {
                            kind: done.kind,
                            body: done.body.join("\n"),
                            line: done.line,
                        });
                    }
                }
                None => open.body.push(line.to_string()),
            }
            return Ok(());
        }

        match marker {
            Some(Marker::Start(name)) => {
                let kind: SectionKind = name.parse().map_err(|_| {
                    TemplateError::section_at(name, line_no, "unknown section name")
                })?;
                if let Some(existing) = self.sections.iter().find(|s| s.kind == kind) {
                    return Err(TemplateError::section_at(
                        name,
                        line_no,
                        format!("duplicate section (first declared on line {})", existing.line),
                    ));
                }
                self.section = Some(OpenSection {
                    kind,
                    line: line_no,
                    body: Vec::new(),
                });
            }
            Some(Marker::End(_)) => {
                return Err(TemplateError::Syntax {
                    line: line_no,
                    message: "section end marker without an open section".to_string(),
                });
            }
            None => {
                if let Some(rest) = trimmed.strip_prefix(COMMENT_OPEN) {
                    match rest.find(COMMENT_CLOSE) {
                        Some(end) => self.collect_directives(vec![(line_no, rest[..end].to_string())]),
                        None => {
                            self.comment = Some(OpenComment {
                                line: line_no,
                                lines: vec![(line_no, rest.to_string())],
                            })
                        }
                    }
                } else if !trimmed.is_empty() {
                    warn!("Ignoring text outside of any section on line {}", line_no);
                }
            }
        }
        Ok(())
    }

    fn collect_directives(&mut self, lines: Vec<(usize, String)>) {
        for (line, text) in lines {
            let Some((key, value)) = text.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                continue;
            }
            self.directives.push(Directive {
                name: key.to_string(),
                value: value.trim().to_string(),
                line,
            });
        }
    }

    fn finish(self) -> Result<LayoutSkeleton, TemplateError> {
        if let Some(open) = self.section {
            return Err(TemplateError::section_at(
                open.kind.name(),
                open.line,
                "unterminated section",
            ));
        }
        if let Some(comment) = self.comment {
            return Err(TemplateError::Syntax {
                line: comment.line,
                message: "unterminated directive comment".to_string(),
            });
        }

        let (page_setup, settings) = apply_directives(&self.directives, self.options)?;
        Ok(LayoutSkeleton {
            page_setup,
            settings,
            directives: self.directives,
            sections: self.sections,
        })
    }
}

/// Recognizes `{{#section "name"}}` and `{{/section}}` on a trimmed line.
fn parse_marker(trimmed: &str) -> Option<Marker<'_>> {
    if let Some(rest) = trimmed.strip_prefix(SECTION_OPEN) {
        let inner = marker_argument(rest)?;
        return Some(Marker::Start(inner.unwrap_or("")));
    }
    if let Some(rest) = trimmed.strip_prefix(SECTION_CLOSE) {
        let inner = marker_argument(rest)?;
        return Some(Marker::End(inner));
    }
    None
}

/// Returns `None` if `rest` is not the tail of a marker (e.g. `{{#sections}}`),
/// otherwise the optional, unquoted argument.
fn marker_argument(rest: &str) -> Option<Option<&str>> {
    let rest = rest.strip_suffix("}}")?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let arg = rest.trim().trim_matches(|c| c == '"' || c == '\'');
    Some(if arg.is_empty() { None } else { Some(arg) })
}

fn apply_directives(
    directives: &[Directive],
    options: ParseOptions,
) -> Result<(PageSetup, DocumentSettings), TemplateError> {
    let mut setup = PageSetup::default();
    let mut settings = DocumentSettings::default();

    for d in directives {
        let name = d.name.as_str();
        let value = d.value.as_str();
        let outcome = match name.to_lowercase().as_str() {
            "format" => value
                .parse::<OutputFormat>()
                .map(|f| settings.format = Some(f))
                .map_err(|_| TemplateError::UnsupportedFormat(value.to_string())),
            "pagesize" => value
                .parse::<PageSize>()
                .map(|s| setup.size = s)
                .map_err(|e| TemplateError::directive(name, e.to_string())),
            "orientation" => value
                .parse::<Orientation>()
                .map(|o| setup.orientation = o)
                .map_err(|e| TemplateError::directive(name, e.to_string())),
            "includepagenumbers" => parse_bool(value)
                .map(|b| settings.include_page_numbers = Some(b))
                .ok_or_else(|| TemplateError::directive(name, format!("expected true or false, got '{}'", value))),
            "pagenumberformat" => {
                settings.page_number_format = non_empty(value);
                Ok(())
            }
            "watermark" => {
                settings.watermark = non_empty(value);
                Ok(())
            }
            "title" => {
                settings.title = non_empty(value);
                Ok(())
            }
            "margin" => parse_mm(name, value).map(|mm| setup.margins = Margins::all(mm)),
            "margintop" => parse_mm(name, value).map(|mm| setup.margins.top = mm),
            "marginbottom" => parse_mm(name, value).map(|mm| setup.margins.bottom = mm),
            "marginleft" => parse_mm(name, value).map(|mm| setup.margins.left = mm),
            "marginright" => parse_mm(name, value).map(|mm| setup.margins.right = mm),
            _ => {
                debug!("Ignoring unrecognized directive '{}' on line {}", name, d.line);
                Ok(())
            }
        };

        if let Err(err) = outcome {
            if options.lenient_directives {
                warn!("Ignoring invalid directive on line {}: {}", d.line, err);
            } else {
                return Err(err);
            }
        }
    }
    Ok((setup, settings))
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

pub(crate) fn parse_mm(name: &str, value: &str) -> Result<f32, TemplateError> {
    let number = value.trim().trim_end_matches("mm").trim();
    match number.parse::<f32>() {
        Ok(mm) if mm.is_finite() && mm >= 0.0 => Ok(mm),
        _ => Err(TemplateError::directive(
            name,
            format!("expected a non-negative length in mm, got '{}'", value),
        )),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() { None } else { Some(value.to_string()) }
}

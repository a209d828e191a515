use crate::error::TemplateError;
use quire_types::{OutputFormat, PageSetup};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The named regions a template may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Pinned band repeated at the top of every page.
    Header,
    /// The only section that flows and paginates.
    Content,
    /// Pinned band repeated at the bottom of every page.
    Footer,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [SectionKind::Header, SectionKind::Content, SectionKind::Footer];

    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Content => "content",
            SectionKind::Footer => "footer",
        }
    }

    /// Header and footer repeat on every page; content does not.
    pub fn is_pinned(&self) -> bool {
        !matches!(self, SectionKind::Content)
    }
}

impl FromStr for SectionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header" => Ok(SectionKind::Header),
            "content" => Ok(SectionKind::Content),
            "footer" => Ok(SectionKind::Footer),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A `key: value` line found in a directive comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub name: String,
    pub value: String,
    pub line: usize,
}

/// A section as written in the template, before binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawSection {
    pub kind: SectionKind,
    pub body: String,
    /// Line of the start marker (1-based).
    pub line: usize,
}

/// Document-level settings taken from directives. `None` means the directive
/// was absent and the caller's options or the defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSettings {
    pub format: Option<OutputFormat>,
    pub include_page_numbers: Option<bool>,
    pub page_number_format: Option<String>,
    pub watermark: Option<String>,
    pub title: Option<String>,
}

/// Raw template text plus the output format the host declared for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSource {
    pub text: String,
    pub declared_format: Option<OutputFormat>,
}

impl TemplateSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            declared_format: None,
        }
    }

    pub fn with_declared_format(mut self, format: OutputFormat) -> Self {
        self.declared_format = Some(format);
        self
    }
}

/// The parsed, unbound structure of a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSkeleton {
    pub page_setup: PageSetup,
    pub settings: DocumentSettings,
    /// Every directive line in source order, recognized or not.
    pub directives: Vec<Directive>,
    /// Sections in template order.
    pub sections: Vec<RawSection>,
}

impl LayoutSkeleton {
    pub fn section(&self, kind: SectionKind) -> Option<&RawSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn has_content(&self) -> bool {
        self.section(SectionKind::Content).is_some()
    }

    /// The last value written for a directive key, matched case-insensitively.
    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.directives
            .iter()
            .rev()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Every occurrence of a directive, in template order.
    pub fn directives_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Directive> + 'a {
        self.directives.iter().filter(move |d| d.name.eq_ignore_ascii_case(name))
    }

    /// The output format from the `format` directive, else the declared one.
    pub fn resolve_format(&self, declared: Option<OutputFormat>) -> Result<OutputFormat, TemplateError> {
        self.settings
            .format
            .or(declared)
            .ok_or(TemplateError::MissingFormat)
    }
}

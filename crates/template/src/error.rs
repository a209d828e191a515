use crate::skeleton::SectionKind;
use quire_types::ErrorKind;
use thiserror::Error;

/// Errors raised while parsing, binding or validating a template.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("section '{section}' (line {line}): {message}")]
    Section {
        section: String,
        line: usize,
        message: String,
    },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("directive '{name}': {message}")]
    Directive { name: String, message: String },

    #[error("missing required section 'content'")]
    MissingContent,

    #[error("section 'content' rendered no text")]
    EmptyContent,

    #[error("section '{section}': binding failed: {message}")]
    Binding { section: SectionKind, message: String },

    #[error("missing 'format' directive")]
    MissingFormat,

    #[error("unsupported format '{0}'")]
    UnsupportedFormat(String),
}

impl TemplateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TemplateError::MissingFormat | TemplateError::UnsupportedFormat(_) => {
                ErrorKind::UnsupportedFormat
            }
            _ => ErrorKind::TemplateSyntax,
        }
    }

    /// The section the error is attributed to, when there is one.
    pub fn section(&self) -> Option<&str> {
        match self {
            TemplateError::Section { section, .. } => Some(section),
            TemplateError::MissingContent | TemplateError::EmptyContent => Some("content"),
            TemplateError::Binding { section, .. } => Some(section.name()),
            _ => None,
        }
    }

    pub(crate) fn section_at(section: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        TemplateError::Section {
            section: section.into(),
            line,
            message: message.into(),
        }
    }

    pub(crate) fn directive(name: &str, message: impl Into<String>) -> Self {
        TemplateError::Directive {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

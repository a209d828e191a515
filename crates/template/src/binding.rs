//! The seam between the document core and the expression engine.
//!
//! The core never interprets binding syntax. It hands each section body and
//! the full row set to a [`BindingAdapter`] exactly once per document, and the
//! body's own looping constructs decide how rows are repeated.

use crate::skeleton::SectionKind;
use handlebars::Handlebars;
use quire_types::Row;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BindingError {
    pub message: String,
}

impl BindingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Everything a section body may bind against.
#[derive(Debug, Clone, Copy)]
pub struct BindingContext<'a> {
    pub rows: &'a [Row],
    /// The partition key when generating in split mode.
    pub split_key: Option<&'a Value>,
}

impl<'a> BindingContext<'a> {
    pub fn new(rows: &'a [Row]) -> Self {
        Self { rows, split_key: None }
    }

    pub fn with_split_key(mut self, key: &'a Value) -> Self {
        self.split_key = Some(key);
        self
    }
}

/// An external templating engine.
pub trait BindingAdapter: Send + Sync {
    /// Renders a section body against the row set.
    fn render(&self, section: SectionKind, body: &str, ctx: &BindingContext<'_>) -> Result<String, BindingError>;

    /// Checks a section body for syntax errors without evaluating it.
    fn check_syntax(&self, section: SectionKind, body: &str) -> Result<(), BindingError>;

    fn name(&self) -> &'static str;
}

/// A [`BindingAdapter`] backed by `handlebars`.
///
/// The render context exposes `rows`, `row_count`, `first` (the first row or
/// null) and `split_key`. Output is not HTML-escaped.
pub struct HandlebarsAdapter {
    registry: Handlebars<'static>,
}

impl HandlebarsAdapter {
    /// Creates an adapter in strict mode: referencing a missing field fails.
    pub fn new() -> Self {
        Self::with_strict_mode(true)
    }

    pub fn with_strict_mode(strict: bool) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(strict);
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    pub fn is_strict(&self) -> bool {
        self.registry.strict_mode()
    }
}

impl Default for HandlebarsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingAdapter for HandlebarsAdapter {
    fn render(&self, section: SectionKind, body: &str, ctx: &BindingContext<'_>) -> Result<String, BindingError> {
        if !body.contains("{{") {
            return Ok(body.to_string());
        }
        let data = json!({
            "rows": ctx.rows,
            "row_count": ctx.rows.len(),
            "first": ctx.rows.first(),
            "split_key": ctx.split_key,
        });
        log::debug!("Rendering section '{}' against {} rows", section, ctx.rows.len());
        self.registry
            .render_template(body, &data)
            .map_err(|e| BindingError::new(e.to_string()))
    }

    fn check_syntax(&self, _section: SectionKind, body: &str) -> Result<(), BindingError> {
        handlebars::Template::compile(body)
            .map(|_| ())
            .map_err(|e| BindingError::new(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "handlebars"
    }
}

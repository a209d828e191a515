use crate::binding::BindingAdapter;
use crate::error::TemplateError;
use crate::parser::{ParseOptions, parse_bool, parse_mm, parse_with};
use crate::skeleton::{LayoutSkeleton, SectionKind};
use quire_types::{Orientation, OutputFormat, PageSize};
use serde::Serialize;

/// Outcome of a static template check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_valid: bool,
    pub error_message: Option<String>,
}

impl Validation {
    pub fn valid() -> Self {
        Self { is_valid: true, error_message: None }
    }

    pub fn invalid(err: &TemplateError) -> Self {
        Self {
            is_valid: false,
            error_message: Some(err.to_string()),
        }
    }
}

/// Statically checks a template without data and without touching the
/// filesystem. The first failure wins.
pub fn validate(text: &str, adapter: &dyn BindingAdapter) -> Validation {
    match check(text, adapter) {
        Ok(()) => Validation::valid(),
        Err(err) => Validation::invalid(&err),
    }
}

/// Same checks as [`validate`], returning the structured error.
pub fn check(text: &str, adapter: &dyn BindingAdapter) -> Result<(), TemplateError> {
    // Directive values are re-checked below in a fixed order, so the parse
    // itself only has to catch structural problems.
    let skeleton = parse_with(text, ParseOptions { lenient_directives: true })?;

    check_format(&skeleton)?;
    check_page_setup(&skeleton)?;
    check_other_directives(&skeleton)?;

    if !skeleton.has_content() {
        return Err(TemplateError::MissingContent);
    }

    for section in &skeleton.sections {
        adapter
            .check_syntax(section.kind, &section.body)
            .map_err(|e| TemplateError::Binding {
                section: section.kind,
                message: e.message,
            })?;
    }
    Ok(())
}

// Strict parsing rejects any invalid occurrence of a directive, so every
// occurrence is checked here, not just the effective one.
fn check_format(skeleton: &LayoutSkeleton) -> Result<(), TemplateError> {
    if skeleton.directive("format").is_none() {
        return Err(TemplateError::MissingFormat);
    }
    for directive in skeleton.directives_named("format") {
        let format: OutputFormat = directive
            .value
            .parse()
            .map_err(|_| TemplateError::UnsupportedFormat(directive.value.clone()))?;
        if !format.is_implemented() {
            return Err(TemplateError::UnsupportedFormat(format.to_string()));
        }
    }
    Ok(())
}

fn check_page_setup(skeleton: &LayoutSkeleton) -> Result<(), TemplateError> {
    for d in skeleton.directives_named("pageSize") {
        d.value
            .parse::<PageSize>()
            .map_err(|e| TemplateError::directive(&d.name, e.to_string()))?;
    }
    for d in skeleton.directives_named("orientation") {
        d.value
            .parse::<Orientation>()
            .map_err(|e| TemplateError::directive(&d.name, e.to_string()))?;
    }
    Ok(())
}

fn check_other_directives(skeleton: &LayoutSkeleton) -> Result<(), TemplateError> {
    for d in skeleton.directives_named("includePageNumbers") {
        if parse_bool(&d.value).is_none() {
            return Err(TemplateError::directive(
                &d.name,
                format!("expected true or false, got '{}'", d.value),
            ));
        }
    }
    for key in ["margin", "marginTop", "marginBottom", "marginLeft", "marginRight"] {
        for d in skeleton.directives_named(key) {
            parse_mm(&d.name, &d.value)?;
        }
    }
    if !skeleton.page_setup.has_printable_area() {
        return Err(TemplateError::directive("margin", "margins leave no printable area"));
    }
    Ok(())
}

/// Sections the template is missing, for callers building richer reports.
pub fn missing_sections(skeleton: &LayoutSkeleton) -> Vec<SectionKind> {
    SectionKind::ALL
        .into_iter()
        .filter(|kind| skeleton.section(*kind).is_none())
        .collect()
}

mod common;

use common::fixtures::*;
use common::{TestResult, init_logging};
use quire::{GenerationOptions, TemplateSource};

#[test]
fn test_content_section_is_required() {
    init_logging();
    let template = "{{!-- format: pdf --}}\n\
                    {{#section \"header\"}}\nTitle\n{{/section}}\n\
                    {{#section \"footer\"}}\nFooter\n{{/section}}";
    let validation = pipeline().validate(template);
    assert!(!validation.is_valid);
    assert!(validation.error_message.unwrap_or_default().contains("content"));
}

#[test]
fn test_complete_template_is_valid() {
    init_logging();
    let validation = pipeline().validate(&report_template("format: docx\npageSize: Legal\norientation: Landscape"));
    assert!(validation.is_valid, "{:?}", validation.error_message);
    assert_eq!(validation.error_message, None);
}

#[test]
fn test_odt_is_reported_as_unsupported() {
    init_logging();
    let validation = pipeline().validate(&static_template("format: odt"));
    assert!(!validation.is_valid);
    assert!(validation.error_message.unwrap_or_default().contains("odt"));
}

#[test]
fn test_unknown_page_size_is_rejected() {
    init_logging();
    let validation = pipeline().validate(&static_template("format: pdf\npageSize: Tabloid"));
    assert!(!validation.is_valid);
    assert!(validation.error_message.unwrap_or_default().contains("Tabloid"));
}

#[test]
fn test_binding_syntax_errors_name_the_section() {
    init_logging();
    let template = "{{!-- format: pdf --}}\n{{#section \"content\"}}\n{{#each rows}}{{name}}\n{{/section}}";
    let validation = pipeline().validate(template);
    assert!(!validation.is_valid);
    assert!(validation.error_message.unwrap_or_default().contains("content"));
}

#[test]
fn test_nested_sections_are_syntax_errors() {
    init_logging();
    let template = "{{!-- format: pdf --}}\n\
                    {{#section \"content\"}}\n{{#section \"header\"}}\nx\n{{/section}}\n{{/section}}";
    let validation = pipeline().validate(template);
    assert!(!validation.is_valid);
    assert!(validation.error_message.unwrap_or_default().contains("header"));
}

#[test]
fn test_validation_agrees_with_generation_on_repeated_directives() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    for directives in ["format: pdf\npageSize: B5\npageSize: A4", "format: html\nformat: pdf"] {
        let template = static_template(directives);
        let validation = pipeline().validate(&template);
        assert!(!validation.is_valid, "{}", directives);

        let path = dir.path().join("out.pdf");
        let result = pipeline().generate(&TemplateSource::new(template), &[], &path, &GenerationOptions::default());
        assert!(!result.is_success());
        assert_eq!(validation.error_message, result.error_message());
        assert!(!path.exists());
    }
    Ok(())
}

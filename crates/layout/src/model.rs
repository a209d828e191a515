//! The resolved, renderer-neutral document.
//!
//! [`resolve`] binds every raw section of a skeleton exactly once against the
//! full row set and checks the invariants both encoders rely on: one
//! non-empty `content` section, at most one header and footer, and page
//! margins that leave room to print.

use crate::flow::{FlowBlock, parse_blocks};
use log::debug;
use quire_template::{
    BindingAdapter, BindingContext, DocumentSettings, LayoutSkeleton, SectionKind, TemplateError,
};
use quire_types::PageSetup;

/// A section after binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSection {
    pub kind: SectionKind,
    /// The text produced by the binding adapter.
    pub text: String,
    pub blocks: Vec<FlowBlock>,
}

impl ResolvedSection {
    fn new(kind: SectionKind, text: String) -> Self {
        let blocks = parse_blocks(&text);
        Self { kind, text, blocks }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutModel {
    pub page_setup: PageSetup,
    pub settings: DocumentSettings,
    header: Option<ResolvedSection>,
    content: ResolvedSection,
    footer: Option<ResolvedSection>,
    order: Vec<SectionKind>,
}

impl LayoutModel {
    pub fn header(&self) -> Option<&ResolvedSection> {
        self.header.as_ref()
    }

    pub fn content(&self) -> &ResolvedSection {
        &self.content
    }

    pub fn footer(&self) -> Option<&ResolvedSection> {
        self.footer.as_ref()
    }

    pub fn section(&self, kind: SectionKind) -> Option<&ResolvedSection> {
        match kind {
            SectionKind::Header => self.header(),
            SectionKind::Content => Some(self.content()),
            SectionKind::Footer => self.footer(),
        }
    }

    /// Sections in template order.
    pub fn sections(&self) -> impl Iterator<Item = &ResolvedSection> {
        self.order.iter().filter_map(|kind| self.section(*kind))
    }

    pub fn title(&self) -> Option<&str> {
        self.settings.title.as_deref()
    }
}

/// Binds a parsed template into a [`LayoutModel`].
pub fn resolve(
    skeleton: &LayoutSkeleton,
    ctx: &BindingContext<'_>,
    adapter: &dyn BindingAdapter,
) -> Result<LayoutModel, TemplateError> {
    if !skeleton.has_content() {
        return Err(TemplateError::MissingContent);
    }
    if !skeleton.page_setup.has_printable_area() {
        return Err(TemplateError::Directive {
            name: "margin".to_string(),
            message: "margins leave no printable area".to_string(),
        });
    }

    let mut header = None;
    let mut content = None;
    let mut footer = None;
    let mut order = Vec::with_capacity(skeleton.sections.len());

    for raw in &skeleton.sections {
        let slot = match raw.kind {
            SectionKind::Header => &mut header,
            SectionKind::Content => &mut content,
            SectionKind::Footer => &mut footer,
        };
        if slot.is_some() {
            return Err(TemplateError::Section {
                section: raw.kind.name().to_string(),
                line: raw.line,
                message: format!("duplicate '{}' section", raw.kind),
            });
        }

        let text = adapter
            .render(raw.kind, &raw.body, ctx)
            .map_err(|e| TemplateError::Binding { section: raw.kind, message: e.message })?;
        let section = ResolvedSection::new(raw.kind, text);
        debug!(
            "Resolved section '{}' into {} blocks ({} bytes)",
            section.kind,
            section.blocks.len(),
            section.text.len()
        );
        *slot = Some(section);
        order.push(raw.kind);
    }

    let content = content.ok_or(TemplateError::MissingContent)?;
    if content.text.trim().is_empty() {
        return Err(TemplateError::EmptyContent);
    }

    Ok(LayoutModel {
        page_setup: skeleton.page_setup,
        settings: skeleton.settings.clone(),
        header,
        content,
        footer,
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_template::{BindingError, HandlebarsAdapter, parse};
    use quire_types::{PageSize, Row};
    use serde_json::json;

    fn rows() -> Vec<Row> {
        vec![
            json!({"name": "Ann", "total": 3}).as_object().unwrap().clone(),
            json!({"name": "Bo", "total": 5}).as_object().unwrap().clone(),
        ]
    }

    const TEMPLATE: &str = "{{!--\nformat: pdf\npageSize: Letter\n--}}\n\
        {{#section \"footer\"}}\nFooter\n{{/section}}\n\
        {{#section \"content\"}}\n# Report\n{{#each rows}}\n- {{name}}: {{total}}\n{{/each}}\n{{/section}}\n\
        {{#section \"header\"}}\n{{row_count}} rows\n{{/section}}";

    #[test]
    fn binds_each_section_once_in_order() {
        let skeleton = parse(TEMPLATE).unwrap();
        let data = rows();
        let model = resolve(&skeleton, &BindingContext::new(&data), &HandlebarsAdapter::new()).unwrap();

        let order: Vec<_> = model.sections().map(|s| s.kind).collect();
        assert_eq!(order, vec![SectionKind::Footer, SectionKind::Content, SectionKind::Header]);
        assert_eq!(model.page_setup.size, PageSize::Letter);
        assert_eq!(model.header().unwrap().text.trim(), "2 rows");
        assert_eq!(
            model.content().blocks,
            vec![
                FlowBlock::Heading { level: 1, text: "Report".into() },
                FlowBlock::ListItem("Ann: 3".into()),
                FlowBlock::ListItem("Bo: 5".into()),
            ]
        );
    }

    #[test]
    fn empty_rows_with_static_content() {
        let skeleton = parse("{{#section \"content\"}}\nNo data today.\n{{/section}}").unwrap();
        let model = resolve(&skeleton, &BindingContext::new(&[]), &HandlebarsAdapter::new()).unwrap();
        assert_eq!(model.content().blocks, vec![FlowBlock::Paragraph("No data today.".into())]);
        assert!(model.header().is_none());
    }

    #[test]
    fn content_that_renders_blank_is_rejected() {
        let skeleton = parse("{{#section \"content\"}}\n{{#each rows}}{{name}}{{/each}}\n{{/section}}").unwrap();
        let err = resolve(&skeleton, &BindingContext::new(&[]), &HandlebarsAdapter::new()).unwrap_err();
        assert_eq!(err, TemplateError::EmptyContent);
        assert_eq!(err.section(), Some("content"));
    }

    #[test]
    fn missing_content_is_rejected() {
        let skeleton = parse("{{#section \"header\"}}\nH\n{{/section}}").unwrap();
        let err = resolve(&skeleton, &BindingContext::new(&[]), &HandlebarsAdapter::new()).unwrap_err();
        assert_eq!(err, TemplateError::MissingContent);
    }

    struct FailingAdapter;

    impl BindingAdapter for FailingAdapter {
        fn render(&self, section: SectionKind, body: &str, _: &BindingContext<'_>) -> Result<String, BindingError> {
            if section == SectionKind::Footer {
                Err(BindingError::new("boom"))
            } else {
                Ok(body.to_string())
            }
        }

        fn check_syntax(&self, _: SectionKind, _: &str) -> Result<(), BindingError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn binding_errors_name_the_section() {
        let skeleton = parse("{{#section \"content\"}}\nx\n{{/section}}\n{{#section \"footer\"}}\nf\n{{/section}}").unwrap();
        let err = resolve(&skeleton, &BindingContext::new(&[]), &FailingAdapter).unwrap_err();
        assert_eq!(err.to_string(), "section 'footer': binding failed: boom");
    }

    #[test]
    fn margins_must_leave_printable_area() {
        let mut skeleton = parse("{{#section \"content\"}}\nx\n{{/section}}").unwrap();
        skeleton.page_setup.margins.left = 400.0;
        let err = resolve(&skeleton, &BindingContext::new(&[]), &HandlebarsAdapter::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Directive { .. }));
    }
}

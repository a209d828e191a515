// src/pipeline/builder.rs
use super::config::{ExecutorKind, PipelineConfig};
use super::orchestrator::DocumentPipeline;
use crate::error::PipelineError;
use quire_executor::{Executor, ExecutorImpl};
use quire_render_core::GeneratorConfig;
use quire_template::{BindingAdapter, HandlebarsAdapter};
use quire_types::GenerationOptions;
use std::path::Path;
use std::sync::Arc;

/// A builder for creating a `DocumentPipeline`.
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    adapter: Option<Arc<dyn BindingAdapter>>,
}

impl PipelineBuilder {
    /// Creates a new `PipelineBuilder` with default settings.
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces every setting with `config`.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads settings from a JSON file. See [`PipelineConfig`] for the format.
    pub fn with_config_file<P: AsRef<Path>>(self, path: P) -> Result<Self, PipelineError> {
        Ok(self.with_config(PipelineConfig::from_file(path)?))
    }

    pub fn with_profile_name(mut self, name: impl Into<String>) -> Self {
        self.config.profile_name = name.into();
        self
    }

    /// Upper bound on documents generated at the same time in split batches.
    pub fn with_max_concurrent_documents(mut self, max: usize) -> Self {
        self.config.max_concurrent_documents = max;
        self
    }

    pub fn with_executor(mut self, kind: ExecutorKind) -> Self {
        self.config.executor = kind;
        self
    }

    /// Only affects the built-in `handlebars` adapter.
    pub fn with_strict_binding(mut self, strict: bool) -> Self {
        self.config.strict_binding = strict;
        self
    }

    pub fn with_lenient_directives(mut self, lenient: bool) -> Self {
        self.config.lenient_directives = lenient;
        self
    }

    pub fn with_generator_config(mut self, config: GeneratorConfig) -> Self {
        self.config.generator = config;
        self
    }

    pub fn with_default_options(mut self, options: GenerationOptions) -> Self {
        self.config.default_options = options;
        self
    }

    /// Plugs in a binding engine other than `handlebars`.
    pub fn with_binding_adapter<A: BindingAdapter + 'static>(self, adapter: A) -> Self {
        self.with_shared_binding_adapter(Arc::new(adapter))
    }

    pub fn with_shared_binding_adapter(mut self, adapter: Arc<dyn BindingAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Consumes the builder and creates the `DocumentPipeline`.
    pub fn build(self) -> Result<DocumentPipeline, PipelineError> {
        self.config.validate()?;

        let executor = match self.config.executor {
            ExecutorKind::Sync => ExecutorImpl::default(),
            ExecutorKind::Parallel => ExecutorImpl::bounded(self.config.max_concurrent_documents)?,
        };
        let adapter = match self.adapter {
            Some(adapter) => adapter,
            None => Arc::new(HandlebarsAdapter::with_strict_mode(self.config.strict_binding)),
        };
        log::info!(
            "Building pipeline '{}' with {} binding and {} ({} workers)",
            self.config.profile_name,
            adapter.name(),
            executor.name(),
            executor.parallelism()
        );
        Ok(DocumentPipeline::new(self.config, adapter, executor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_template::{BindingContext, BindingError, SectionKind};

    struct Upper;

    impl BindingAdapter for Upper {
        fn render(&self, _section: SectionKind, body: &str, _ctx: &BindingContext<'_>) -> Result<String, BindingError> {
            Ok(body.to_uppercase())
        }

        fn check_syntax(&self, _section: SectionKind, _body: &str) -> Result<(), BindingError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "upper"
        }
    }

    #[test]
    fn rejects_zero_workers() {
        let err = PipelineBuilder::new().with_max_concurrent_documents(0).build().unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn sync_executor_on_request() {
        let pipeline = PipelineBuilder::new()
            .with_executor(ExecutorKind::Sync)
            .with_max_concurrent_documents(8)
            .build()
            .unwrap();
        assert_eq!(pipeline.executor().parallelism(), 1);
    }

    #[test]
    fn custom_adapter_is_used_for_validation() {
        let pipeline = PipelineBuilder::new().with_binding_adapter(Upper).build().unwrap();
        let validation = pipeline.validate("{{!-- format: pdf --}}\n{{#section \"content\"}}\n{{#if}}\n{{/section}}");
        assert!(validation.is_valid, "{:?}", validation.error_message);
    }
}

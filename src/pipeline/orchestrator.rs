use super::config::PipelineConfig;
use super::factory::{Generator, GeneratorFactory};
use super::split::{
    FilenameTemplate, NameAllocator, Partition, PartitionResult, SplitRequest, SplitResult,
    TIMESTAMP_FORMAT, key_label, partition_rows,
};
use crate::error::PipelineError;
use chrono::Local;
use log::{debug, info, warn};
use quire_executor::{Executor, ExecutorImpl};
use quire_layout::resolve;
use quire_render_core::{CancellationToken, DocumentGenerator, GenerationError, GenerationResult};
use quire_template::{
    BindingAdapter, BindingContext, LayoutSkeleton, ParseOptions, TemplateError, TemplateSource,
    Validation, parse_with, validate,
};
use quire_types::{GenerationOptions, Row};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// The main document generation pipeline.
///
/// Cloning is cheap: the binding adapter and the worker pool are shared.
#[derive(Clone)]
pub struct DocumentPipeline {
    config: PipelineConfig,
    adapter: Arc<dyn BindingAdapter>,
    factory: GeneratorFactory,
    executor: ExecutorImpl,
}

impl fmt::Debug for DocumentPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentPipeline")
            .field("config", &self.config)
            .field("adapter", &self.adapter.name())
            .field("executor", &self.executor)
            .finish()
    }
}

impl DocumentPipeline {
    pub(crate) fn new(config: PipelineConfig, adapter: Arc<dyn BindingAdapter>, executor: ExecutorImpl) -> Self {
        let factory = GeneratorFactory::new(config.generator.clone());
        Self {
            config,
            adapter,
            factory,
            executor,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn executor(&self) -> &ExecutorImpl {
        &self.executor
    }

    pub fn factory(&self) -> &GeneratorFactory {
        &self.factory
    }

    /// Parses template text with the configured directive leniency.
    pub fn parse(&self, text: &str) -> Result<LayoutSkeleton, TemplateError> {
        parse_with(
            text,
            ParseOptions {
                lenient_directives: self.config.lenient_directives,
            },
        )
    }

    /// Static checks only: no rows are bound and nothing is written.
    pub fn validate(&self, text: &str) -> Validation {
        validate(text, self.adapter.as_ref())
    }

    /// A split request carrying this pipeline's profile name and default
    /// options.
    pub fn split_request(
        &self,
        source: TemplateSource,
        rows: Vec<Row>,
        split_key_column: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> SplitRequest {
        SplitRequest::new(source, rows, split_key_column, output_dir)
            .with_profile_name(self.config.profile_name.clone())
            .with_options(self.config.default_options.clone())
    }

    /// Generates one document from all `rows`.
    ///
    /// Every failure, including template errors, is reported in the returned
    /// [`GenerationResult`].
    pub fn generate<P: AsRef<Path>>(
        &self,
        source: &TemplateSource,
        rows: &[Row],
        output_path: P,
        options: &GenerationOptions,
    ) -> GenerationResult {
        self.generate_with_cancel(source, rows, output_path, options, &CancellationToken::new())
    }

    pub fn generate_with_cancel<P: AsRef<Path>>(
        &self,
        source: &TemplateSource,
        rows: &[Row],
        output_path: P,
        options: &GenerationOptions,
        cancel: &CancellationToken,
    ) -> GenerationResult {
        let output_path = output_path.as_ref();
        let started = Instant::now();
        info!("Generating {} from {} rows", output_path.display(), rows.len());

        let options = options.with_fallback(&self.config.default_options);
        let prepared = self
            .parse(&source.text)
            .map_err(GenerationError::from)
            .and_then(|skeleton| {
                let format = skeleton.resolve_format(source.declared_format)?;
                Ok((skeleton, self.factory.create(format)?))
            });

        let result = match prepared {
            Ok((skeleton, generator)) => render_document(
                &skeleton,
                self.adapter.as_ref(),
                &generator,
                &BindingContext::new(rows),
                output_path,
                &options,
                cancel,
            ),
            Err(err) => GenerationResult::failure(output_path, err),
        };

        match result.error_message() {
            None => info!(
                "Generated {} ({} bytes) in {:.2?}",
                output_path.display(),
                result.file_size_bytes(),
                started.elapsed()
            ),
            Some(message) => warn!("Generation of {} failed: {}", output_path.display(), message),
        }
        result
    }

    /// Generates one document per distinct value of the request's split
    /// column on this pipeline's executor.
    ///
    /// The request's profile name and options fall back to the pipeline
    /// configuration, however the request was built.
    pub fn generate_split(&self, request: &SplitRequest, cancel: &CancellationToken) -> Result<SplitResult, PipelineError> {
        let skeleton = self.parse(&request.source.text)?;
        let profile_name = request.profile_name.as_deref().unwrap_or(&self.config.profile_name);
        let options = request.options.with_fallback(&self.config.default_options);
        run_split(
            request,
            profile_name,
            options,
            &skeleton,
            Arc::clone(&self.adapter),
            &self.factory,
            &self.executor,
            cancel,
        )
    }

    /// [`DocumentPipeline::generate_split`] on the blocking thread pool of
    /// the current tokio runtime.
    pub async fn generate_split_async(
        &self,
        request: SplitRequest,
        cancel: CancellationToken,
    ) -> Result<SplitResult, PipelineError> {
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || pipeline.generate_split(&request, &cancel))
            .await
            .map_err(|e| {
                PipelineError::Generation(GenerationError::Internal(format!("split batch task failed: {}", e)))
            })?
    }
}

/// Runs a split batch.
///
/// Batch-invalidating problems (an unusable filename template, a missing or
/// unsupported format, a split column no row has, an output directory that
/// cannot be created) are returned as `Err` before anything is generated.
/// Everything that goes wrong inside a partition is reported in its
/// [`PartitionResult`].
pub fn generate_split<E: Executor>(
    request: &SplitRequest,
    skeleton: &LayoutSkeleton,
    adapter: Arc<dyn BindingAdapter>,
    factory: &GeneratorFactory,
    executor: &E,
    cancel: &CancellationToken,
) -> Result<SplitResult, PipelineError> {
    run_split(
        request,
        request.profile_name(),
        request.options.clone(),
        skeleton,
        adapter,
        factory,
        executor,
        cancel,
    )
}

#[allow(clippy::too_many_arguments)]
fn run_split<E: Executor>(
    request: &SplitRequest,
    profile_name: &str,
    options: GenerationOptions,
    skeleton: &LayoutSkeleton,
    adapter: Arc<dyn BindingAdapter>,
    factory: &GeneratorFactory,
    executor: &E,
    cancel: &CancellationToken,
) -> Result<SplitResult, PipelineError> {
    if request.rows.is_empty() {
        info!("Split batch has no rows, nothing to generate");
        return Ok(SplitResult::default());
    }

    let started = Instant::now();
    let filenames = FilenameTemplate::new(request.filename_template.as_str())?;
    let format = skeleton.resolve_format(request.source.declared_format)?;
    let generator = Arc::new(factory.create(format)?);
    let partitions = partition_rows(&request.rows, &request.split_key_column)?;
    fs::create_dir_all(&request.output_dir).map_err(|e| {
        PipelineError::Io(io::Error::new(
            e.kind(),
            format!("Failed to create output directory '{}': {}", request.output_dir.display(), e),
        ))
    })?;

    // One timestamp for the whole batch.
    let timestamp = request
        .batch_time
        .unwrap_or_else(|| Local::now().naive_local())
        .format(TIMESTAMP_FORMAT)
        .to_string();
    // Names are assigned in discovery order so collisions resolve the same
    // way whatever order partitions finish in.
    let mut names = NameAllocator::default();
    let jobs: Vec<(Partition, PathBuf)> = partitions
        .into_iter()
        .map(|partition| {
            let name = names.allocate(filenames.render(profile_name, &partition.key, &timestamp, format));
            let path = request.output_dir.join(name);
            (partition, path)
        })
        .collect();

    info!(
        "Starting split batch: {} rows on '{}' into {} {} documents using {} ({} workers)",
        request.rows.len(),
        request.split_key_column,
        jobs.len(),
        format,
        executor.name(),
        executor.parallelism()
    );

    let skeleton = Arc::new(skeleton.clone());
    let options = Arc::new(options);
    let cancel = cancel.clone();
    let results = executor.execute_all(jobs, move |(partition, path)| {
        if cancel.is_cancelled() {
            debug!("Skipping partition {} ('{}'): batch cancelled", partition.index, key_label(&partition.key));
            return PartitionResult::new(&partition, GenerationResult::failure(path, GenerationError::Cancelled));
        }
        let ctx = BindingContext::new(&partition.rows).with_split_key(&partition.key);
        let result = render_document(&skeleton, adapter.as_ref(), &generator, &ctx, &path, &options, &cancel);
        match result.error_message() {
            None => debug!("Partition {} ('{}') written to {}", partition.index, key_label(&partition.key), path.display()),
            Some(message) => warn!("Partition {} ('{}') failed: {}", partition.index, key_label(&partition.key), message),
        }
        PartitionResult::new(&partition, result)
    });

    let result = SplitResult::new(results);
    info!(
        "Split batch finished in {:.2?}: {} succeeded, {} failed",
        started.elapsed(),
        result.success_count(),
        result.failure_count()
    );
    Ok(result)
}

/// Binds one data context and hands the resolved model to the generator.
fn render_document(
    skeleton: &LayoutSkeleton,
    adapter: &dyn BindingAdapter,
    generator: &Generator,
    ctx: &BindingContext<'_>,
    output_path: &Path,
    options: &GenerationOptions,
    cancel: &CancellationToken,
) -> GenerationResult {
    if cancel.is_cancelled() {
        return GenerationResult::failure(output_path, GenerationError::Cancelled);
    }
    match resolve(skeleton, ctx, adapter) {
        Ok(model) => generator.generate(ctx.rows, &model, output_path, options, cancel),
        Err(err) => GenerationResult::failure(output_path, err.into()),
    }
}

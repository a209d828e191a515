//! Paginated PDF and DOCX reports from materialized query rows.
//!
//! A template mixes layout directives, `header`/`content`/`footer` sections
//! and binding expressions. The pipeline parses it, binds the rows once per
//! document, and hands the resolved layout to the encoder for the template's
//! format. Split batches write one document per distinct value of a column.

pub mod error;
pub mod pipeline;
pub mod rows;

pub use error::PipelineError;
pub use pipeline::{
    DocumentPipeline, ExecutorKind, FilenameTemplate, Generator, GeneratorFactory, Partition,
    PartitionResult, PipelineBuilder, PipelineConfig, SplitRequest, SplitResult,
};
pub use rows::{read_rows, rows_from_json};

pub use quire_render_core::{
    CancellationToken, DocumentGenerator, GenerationError, GenerationResult, GeneratorConfig,
    PageNumberStrategy,
};
pub use quire_template::{
    BindingAdapter, BindingContext, BindingError, HandlebarsAdapter, LayoutSkeleton, SectionKind,
    TemplateError, TemplateSource, Validation,
};
pub use quire_types::{
    ErrorKind, GenerationOptions, Margins, Orientation, OutputFormat, PageSetup, PageSize, Row,
};

//! Document generation pipeline orchestration.
//!
//! - [`PipelineBuilder`]: Fluent builder for constructing document pipelines
//! - [`DocumentPipeline`]: Single-document and split generation
//! - [`GeneratorFactory`]: Selects the encoder for an output format
//! - [`SplitRequest`] / [`SplitResult`]: One document per split-column value
//!
//! # Example
//!
//! ```ignore
//! use quire::{CancellationToken, GenerationOptions, PipelineBuilder, TemplateSource};
//!
//! let pipeline = PipelineBuilder::new()
//!     .with_max_concurrent_documents(4)
//!     .build()?;
//!
//! let source = TemplateSource::new(std::fs::read_to_string("sales.hbs")?);
//! let result = pipeline.generate(&source, &rows, "sales.pdf", &GenerationOptions::default());
//!
//! let request = pipeline.split_request(source, rows, "region", "out/");
//! let batch = pipeline.generate_split(&request, &CancellationToken::new())?;
//! println!("{} of {} documents written", batch.success_count(), batch.len());
//! ```

mod builder;
pub mod config;
pub mod factory;
mod orchestrator;
pub mod split;

pub use builder::PipelineBuilder;
pub use config::{ExecutorKind, PipelineConfig};
pub use factory::{Generator, GeneratorFactory};
pub use orchestrator::{DocumentPipeline, generate_split};
pub use split::{FilenameTemplate, Partition, PartitionResult, SplitRequest, SplitResult, partition_rows};

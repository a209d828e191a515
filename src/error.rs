// src/error.rs
use quire_executor::ExecutorError;
use quire_render_core::GenerationError;
use quire_template::TemplateError;
use quire_types::ErrorKind;
use thiserror::Error;

/// Errors that invalidate a whole pipeline call.
///
/// Failures of a single document are reported inside its
/// `GenerationResult` instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Config(_) | PipelineError::Json(_) => ErrorKind::Config,
            PipelineError::Template(e) => e.kind(),
            PipelineError::Generation(e) => e.kind(),
            PipelineError::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<ExecutorError> for PipelineError {
    fn from(e: ExecutorError) -> Self {
        PipelineError::Config(e.message)
    }
}

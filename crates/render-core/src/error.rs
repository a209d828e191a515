use quire_layout::LayoutError;
use quire_template::TemplateError;
use quire_types::{ErrorKind, OutputFormat};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("unsupported format '{0}'")]
    UnsupportedFormat(OutputFormat),
    #[error("encoding error: {0}")]
    Encode(String),
    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),
    #[error("internal generator error: {0}")]
    Internal(String),
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Template(e) => e.kind(),
            GenerationError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            GenerationError::Encode(_)
            | GenerationError::ResourceLimit(_)
            | GenerationError::Internal(_) => ErrorKind::Generation,
            GenerationError::Io { .. } => ErrorKind::Io,
            GenerationError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerationError::Io { path: path.into(), source }
    }
}

impl From<LayoutError> for GenerationError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::Cancelled => GenerationError::Cancelled,
            LayoutError::PageLimit(_) => GenerationError::ResourceLimit(err.to_string()),
            LayoutError::NoPrintableArea(_) | LayoutError::ElementTooLarge(..) => {
                GenerationError::Encode(err.to_string())
            }
        }
    }
}

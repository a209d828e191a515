use crate::error::GenerationError;
use quire_types::ErrorKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Construction settings shared by every encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Written to the PDF `Producer` entry and the DOCX application property.
    pub producer: String,
    /// Upper bound on pages per document for page-computing encoders.
    pub max_pages: Option<usize>,
    /// Body text size in points.
    pub base_font_size: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            producer: "quire".to_string(),
            max_pages: Some(10_000),
            base_font_size: 10.0,
        }
    }
}

/// What an encoder reports after writing a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: u64,
    pub pages: Option<usize>,
}

/// Outcome of generating one document.
///
/// Only [`GenerationResult::success`] and [`GenerationResult::failure`]
/// construct it, so a failure always has a message and a size of zero.
#[derive(Debug)]
pub struct GenerationResult {
    output_path: PathBuf,
    file_size_bytes: u64,
    page_count: Option<usize>,
    error: Option<GenerationError>,
}

impl GenerationResult {
    pub fn success(output_path: impl Into<PathBuf>, encoded: Encoded) -> Self {
        Self {
            output_path: output_path.into(),
            file_size_bytes: encoded.bytes,
            page_count: encoded.pages,
            error: None,
        }
    }

    pub fn failure(output_path: impl Into<PathBuf>, error: GenerationError) -> Self {
        Self {
            output_path: output_path.into(),
            file_size_bytes: 0,
            page_count: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn file_size_bytes(&self) -> u64 {
        self.file_size_bytes
    }

    /// Pages written, for encoders that compute pagination.
    pub fn page_count(&self) -> Option<usize> {
        self.page_count
    }

    pub fn error(&self) -> Option<&GenerationError> {
        self.error.as_ref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(GenerationError::kind)
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| {
            let message = e.to_string();
            if message.trim().is_empty() {
                format!("{} during generation", e.kind())
            } else {
                message
            }
        })
    }

    pub fn into_error(self) -> Option<GenerationError> {
        self.error
    }
}

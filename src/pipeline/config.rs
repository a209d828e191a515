use crate::error::PipelineError;
use quire_render_core::GeneratorConfig;
use quire_types::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_PROFILE_NAME: &str = "report";

/// Selects how split partitions are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// One partition after another on the calling thread.
    Sync,
    /// A dedicated pool of `max_concurrent_documents` threads. Falls back to
    /// sequential scheduling when built without the `rayon-executor` feature.
    #[default]
    Parallel,
}

/// Pipeline construction settings, loadable from a JSON file:
///
/// ```json
/// {
///   "profileName": "monthly-sales",
///   "maxConcurrentDocuments": 4,
///   "executor": "parallel",
///   "strictBinding": true,
///   "generator": { "producer": "quire", "maxPages": 5000 },
///   "defaultOptions": { "watermark": "DRAFT" }
/// }
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Fills the `{name}` filename token of split batches.
    pub profile_name: String,
    pub max_concurrent_documents: usize,
    pub executor: ExecutorKind,
    /// Referencing a missing field in a binding expression is an error.
    pub strict_binding: bool,
    /// Unknown directive values log a warning instead of failing the parse.
    pub lenient_directives: bool,
    pub generator: GeneratorConfig,
    /// Options applied when the caller gives none of its own.
    pub default_options: GenerationOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            profile_name: DEFAULT_PROFILE_NAME.to_string(),
            max_concurrent_documents: num_cpus::get(),
            executor: ExecutorKind::default(),
            strict_binding: true,
            lenient_directives: false,
            generator: GeneratorConfig::default(),
            default_options: GenerationOptions::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PipelineError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config from '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_concurrent_documents == 0 {
            return Err(PipelineError::Config(
                "maxConcurrentDocuments must be at least 1".to_string(),
            ));
        }
        if self.profile_name.trim().is_empty() {
            return Err(PipelineError::Config("profileName must not be empty".to_string()));
        }
        if !(self.generator.base_font_size > 0.0) {
            return Err(PipelineError::Config(format!(
                "generator.baseFontSize must be positive, got {}",
                self.generator.base_font_size
            )));
        }
        if self.generator.max_pages == Some(0) {
            return Err(PipelineError::Config("generator.maxPages must be at least 1".to_string()));
        }
        Ok(())
    }
}

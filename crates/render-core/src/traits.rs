use crate::types::GenerationResult;
use quire_layout::LayoutModel;
use quire_types::{CancellationToken, GenerationOptions, OutputFormat, Row};
use std::path::Path;

/// How an encoder realizes `{page}`/`{total}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNumberStrategy {
    /// The encoder paginates itself and writes the numbers as literal text.
    ComputedText,
    /// The encoder emits fields that the viewing application evaluates.
    DynamicField,
}

/// A trait for document encoders, one implementation per output format.
///
/// `generate` never returns `Err`: every failure is captured in the
/// [`GenerationResult`] so a batch can continue with the next document.
pub trait DocumentGenerator: Send + Sync {
    fn format(&self) -> OutputFormat;

    fn page_number_strategy(&self) -> PageNumberStrategy;

    fn generate(
        &self,
        rows: &[Row],
        model: &LayoutModel,
        output_path: &Path,
        options: &GenerationOptions,
        cancel: &CancellationToken,
    ) -> GenerationResult;
}

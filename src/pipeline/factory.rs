use log::debug;
use quire_layout::LayoutModel;
use quire_render_core::{
    CancellationToken, DocumentGenerator, GenerationError, GenerationResult, GeneratorConfig,
    PageNumberStrategy,
};
use quire_render_docx::DocxGenerator;
use quire_render_pdf::PdfGenerator;
use quire_types::{GenerationOptions, OutputFormat, Row};
use std::path::Path;

/// One variant per implemented output format.
#[derive(Debug, Clone)]
pub enum Generator {
    Pdf(PdfGenerator),
    Docx(DocxGenerator),
}

impl DocumentGenerator for Generator {
    fn format(&self) -> OutputFormat {
        match self {
            Generator::Pdf(g) => g.format(),
            Generator::Docx(g) => g.format(),
        }
    }

    fn page_number_strategy(&self) -> PageNumberStrategy {
        match self {
            Generator::Pdf(g) => g.page_number_strategy(),
            Generator::Docx(g) => g.page_number_strategy(),
        }
    }

    fn generate(
        &self,
        rows: &[Row],
        model: &LayoutModel,
        output_path: &Path,
        options: &GenerationOptions,
        cancel: &CancellationToken,
    ) -> GenerationResult {
        match self {
            Generator::Pdf(g) => g.generate(rows, model, output_path, options, cancel),
            Generator::Docx(g) => g.generate(rows, model, output_path, options, cancel),
        }
    }
}

/// Builds generators that share one [`GeneratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct GeneratorFactory {
    config: GeneratorConfig,
}

impl GeneratorFactory {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Fails with [`GenerationError::UnsupportedFormat`] for formats without
    /// an encoder, before anything is rendered.
    pub fn create(&self, format: OutputFormat) -> Result<Generator, GenerationError> {
        debug!("Creating generator for format '{}'", format);
        match format {
            OutputFormat::Pdf => Ok(Generator::Pdf(PdfGenerator::new(self.config.clone()))),
            OutputFormat::Docx => Ok(Generator::Docx(DocxGenerator::new(self.config.clone()))),
            OutputFormat::Odt => Err(GenerationError::UnsupportedFormat(format)),
        }
    }
}

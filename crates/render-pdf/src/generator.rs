use crate::painter::{encode_win_ansi, font_dictionary, paint_page};
use crate::writer::StreamingPdfWriter;
use log::{debug, info};
use lopdf::{Dictionary, Object, StringFormat};
use quire_layout::{LayoutConfig, LayoutModel, paginate};
use quire_render_core::utils::run_encoder;
use quire_render_core::{
    CancellationToken, DocumentGenerator, Encoded, GenerationError, GenerationResult, GeneratorConfig,
    PageNumberStrategy,
};
use quire_types::{GenerationOptions, OutputFormat, Row};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PDF_VERSION: &str = "1.7";

/// Page-painting encoder. Paginates the model itself, so page numbers are
/// written as literal text.
#[derive(Debug, Clone, Default)]
pub struct PdfGenerator {
    config: GeneratorConfig,
}

impl PdfGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            base_font_size: self.config.base_font_size,
            max_pages: self.config.max_pages,
            ..LayoutConfig::default()
        }
    }

    fn encode(
        &self,
        model: &LayoutModel,
        output_path: &Path,
        options: &GenerationOptions,
        cancel: &CancellationToken,
    ) -> Result<Encoded, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }
        if !model.page_setup.has_printable_area() {
            return Err(GenerationError::Internal(format!(
                "page setup {:?} has no printable area",
                model.page_setup
            )));
        }

        let settings = &model.settings;
        let page_number_format = options
            .effective_include_page_numbers(settings.include_page_numbers)
            .then(|| options.effective_page_number_format(settings.page_number_format.as_deref()));
        let watermark = options.effective_watermark(settings.watermark.as_deref());

        let doc = paginate(model, page_number_format, &self.layout_config(), cancel)?;
        let total = doc.page_count();

        let io_err = |e| GenerationError::io(output_path, e);
        let file = File::create(output_path).map_err(io_err)?;
        let mut writer =
            StreamingPdfWriter::new(BufWriter::new(file), PDF_VERSION, font_dictionary()).map_err(io_err)?;

        let compress = options.effective_compress();
        for (index, page) in doc.pages.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(GenerationError::Cancelled);
            }
            let content = paint_page(&doc, page, index + 1, total, watermark);
            let content_id = writer.write_content_stream(&content, compress).map_err(io_err)?;
            writer.add_page(content_id, doc.page_width, doc.page_height);
            debug!("Wrote page {}/{}", index + 1, total);
        }

        writer.set_info(self.info_dictionary(model.title()));
        let bytes = writer.finish().map_err(io_err)?;
        Ok(Encoded { bytes, pages: Some(total) })
    }

    fn info_dictionary(&self, title: Option<&str>) -> Dictionary {
        let literal = |s: &str| Object::String(encode_win_ansi(s), StringFormat::Literal);
        let mut info = Dictionary::new();
        info.set("Producer", literal(&self.config.producer));
        if let Some(title) = title {
            info.set("Title", literal(title));
        }
        info
    }
}

impl DocumentGenerator for PdfGenerator {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn page_number_strategy(&self) -> PageNumberStrategy {
        PageNumberStrategy::ComputedText
    }

    fn generate(
        &self,
        rows: &[Row],
        model: &LayoutModel,
        output_path: &Path,
        options: &GenerationOptions,
        cancel: &CancellationToken,
    ) -> GenerationResult {
        info!("Generating PDF {} from {} rows", output_path.display(), rows.len());
        run_encoder(output_path, || self.encode(model, output_path, options, cancel))
    }
}

use crate::parts::{self, FOOTER_PART, HEADER_PART, PackageLayout};
use log::{debug, info};
use quire_layout::LayoutModel;
use quire_render_core::utils::run_encoder;
use quire_render_core::{
    CancellationToken, DocumentGenerator, Encoded, GenerationError, GenerationResult, GeneratorConfig,
    PageNumberStrategy,
};
use quire_types::{GenerationOptions, OutputFormat, Row};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Word-processor encoder. Pagination is left to the application opening
/// the file, so page numbers are written as `PAGE`/`NUMPAGES` fields.
#[derive(Debug, Clone, Default)]
pub struct DocxGenerator {
    config: GeneratorConfig,
}

impl DocxGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
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
        let (width, height) = model.page_setup.dimensions_twips();
        if width == 0 || height == 0 || !model.page_setup.has_printable_area() {
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
        let layout = PackageLayout {
            header: model.header().is_some() || watermark.is_some(),
            footer: model.footer().is_some() || page_number_format.is_some(),
        };

        let mut entries = vec![
            ("[Content_Types].xml", parts::content_types(layout)),
            ("_rels/.rels", parts::package_rels()),
            ("word/_rels/document.xml.rels", parts::document_rels(layout)),
            ("word/document.xml", parts::document(model, layout)),
            ("word/styles.xml", parts::styles(self.config.base_font_size)),
        ];
        if layout.header {
            entries.push((HEADER_PART, parts::header(model, watermark)));
        }
        if layout.footer {
            entries.push((FOOTER_PART, parts::footer(model, page_number_format)));
        }
        entries.push(("docProps/core.xml", parts::core_properties(model.title(), &self.config.producer)));
        entries.push(("docProps/app.xml", parts::app_properties(&self.config.producer)));

        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let zip_err = |e| zip_error(output_path, e);
        let file = File::create(output_path).map_err(|e| GenerationError::io(output_path, e))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let method = if options.effective_compress() {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };
        // A fixed timestamp keeps the archive deterministic.
        let file_options = SimpleFileOptions::default()
            .compression_method(method)
            .last_modified_time(DateTime::default());

        for (name, xml) in &entries {
            zip.start_file(*name, file_options).map_err(zip_err)?;
            zip.write_all(xml.as_bytes())
                .map_err(|e| GenerationError::io(output_path, e))?;
            debug!("Wrote part {} ({} bytes)", name, xml.len());
        }

        let mut writer = zip.finish().map_err(zip_err)?;
        writer.flush().map_err(|e| GenerationError::io(output_path, e))?;
        let bytes = writer
            .stream_position()
            .map_err(|e| GenerationError::io(output_path, e))?;
        Ok(Encoded { bytes, pages: None })
    }
}

fn zip_error(path: &Path, err: ZipError) -> GenerationError {
    match err {
        ZipError::Io(e) => GenerationError::io(path, e),
        other => GenerationError::Encode(other.to_string()),
    }
}

impl DocumentGenerator for DocxGenerator {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn page_number_strategy(&self) -> PageNumberStrategy {
        PageNumberStrategy::DynamicField
    }

    fn generate(
        &self,
        rows: &[Row],
        model: &LayoutModel,
        output_path: &Path,
        options: &GenerationOptions,
        cancel: &CancellationToken,
    ) -> GenerationResult {
        info!("Generating DOCX {} from {} rows", output_path.display(), rows.len());
        run_encoder(output_path, || self.encode(model, output_path, options, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_layout::resolve;
    use quire_template::{BindingContext, HandlebarsAdapter, parse};
    use quire_types::ErrorKind;
    use std::io::Read;

    fn model(template: &str) -> LayoutModel {
        let skeleton = parse(template).unwrap();
        resolve(&skeleton, &BindingContext::new(&[]), &HandlebarsAdapter::new()).unwrap()
    }

    fn read_part(path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    fn generate(template: &str, options: &GenerationOptions) -> (tempfile::TempDir, std::path::PathBuf, GenerationResult) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        let result = DocxGenerator::default().generate(&[], &model(template), &path, options, &CancellationToken::new());
        (dir, path, result)
    }

    #[test]
    fn page_numbers_are_fields() {
        let (_dir, path, result) = generate(
            "{{#section \"content\"}}\nBody\n{{/section}}\n{{#section \"footer\"}}\nConfidential\n{{/section}}",
            &GenerationOptions::default(),
        );
        assert!(result.is_success(), "{:?}", result.error_message());
        assert_eq!(result.page_count(), None);

        let footer = read_part(&path, FOOTER_PART);
        assert!(footer.contains("Confidential"));
        assert!(footer.contains(r#"w:instr=" PAGE \* MERGEFORMAT ""#));
        assert!(footer.contains(r#"w:instr=" NUMPAGES \* MERGEFORMAT ""#));
        assert!(!footer.contains("{page}"));

        let document = read_part(&path, "word/document.xml");
        assert!(document.contains(r#"r:id="rIdFooter1""#));
        assert!(!document.contains("rIdHeader1"));
    }

    #[test]
    fn legal_landscape_swaps_page_size() {
        let (_dir, path, result) = generate(
            "{{!--\npageSize: Legal\norientation: Landscape\n--}}\n{{#section \"content\"}}\nBody\n{{/section}}",
            &GenerationOptions::default(),
        );
        assert!(result.is_success());
        let document = read_part(&path, "word/document.xml");
        assert!(document.contains(r#"<w:pgSz w:w="20160" w:h="12240" w:orient="landscape"/>"#), "{}", document);
        assert!(document.contains(r#"w:top="1134""#));
        assert!(document.contains(r#"w:left="850""#));
    }

    #[test]
    fn watermark_lives_in_the_header() {
        let options = GenerationOptions {
            watermark: Some("DRAFT <internal>".into()),
            include_page_numbers: Some(false),
            ..GenerationOptions::default()
        };
        let (_dir, path, result) = generate("{{#section \"content\"}}\nBody\n{{/section}}", &options);
        assert!(result.is_success());
        let header = read_part(&path, HEADER_PART);
        assert!(header.contains(r#"string="DRAFT &lt;internal&gt;""#));

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert!(archive.by_name(FOOTER_PART).is_err());
    }

    #[test]
    fn stored_entries_when_uncompressed() {
        let options = GenerationOptions { compress: Some(false), ..GenerationOptions::default() };
        let (_dir, path, result) = generate("{{#section \"content\"}}\nBody\n{{/section}}", &options);
        assert!(result.is_success());
        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let part = archive.by_name("word/document.xml").unwrap();
        assert_eq!(part.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn output_is_deterministic() {
        let template = "{{!-- title: Weekly --}}\n{{#section \"content\"}}\n| a | b |\n|---|---|\n| 1 | 2 |\n{{/section}}";
        let (_d1, p1, r1) = generate(template, &GenerationOptions::default());
        let (_d2, p2, r2) = generate(template, &GenerationOptions::default());
        assert_eq!(r1.file_size_bytes(), r2.file_size_bytes());
        assert_eq!(std::fs::read(p1).unwrap(), std::fs::read(p2).unwrap());
    }

    #[test]
    fn write_failures_are_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.docx");
        let result = DocxGenerator::default().generate(
            &[],
            &model("{{#section \"content\"}}\nBody\n{{/section}}"),
            &path,
            &GenerationOptions::default(),
            &CancellationToken::new(),
        );
        assert_eq!(result.error_kind(), Some(ErrorKind::Io));
        assert_eq!(result.file_size_bytes(), 0);
    }
}

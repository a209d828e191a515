use lopdf::Document as LopdfDocument;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Width and height from the page's MediaBox.
    pub fn page_size(&self, page: u32) -> (f32, f32) {
        let id = self.doc.get_pages()[&page];
        let dict = self.doc.get_object(id).unwrap().as_dict().unwrap();
        let media: Vec<f32> = dict
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect();
        (media[2] - media[0], media[3] - media[1])
    }

    /// Whether the page's content stream contains `(text)`. Only meaningful
    /// for uncompressed output.
    pub fn page_shows(&self, page: u32, text: &str) -> bool {
        let id = self.doc.get_pages()[&page];
        let content = self.doc.get_page_content(id).unwrap();
        let needle = format!("({})", text);
        content.windows(needle.len()).any(|w| w == needle.as_bytes())
    }

    pub fn info_string(&self, key: &str) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
        let dict = self.doc.get_object(info).ok()?.as_dict().ok()?;
        let bytes = dict.get(key.as_bytes()).ok()?.as_str().ok()?;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// The text parts of a generated DOCX package
pub struct GeneratedDocx {
    pub parts: BTreeMap<String, String>,
}

impl GeneratedDocx {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut archive = zip::ZipArchive::new(File::open(path)?)?;
        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let mut xml = String::new();
            entry.read_to_string(&mut xml)?;
            parts.insert(entry.name().to_string(), xml);
        }
        Ok(Self { parts })
    }

    pub fn part(&self, name: &str) -> Option<&str> {
        self.parts.get(name).map(String::as_str)
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }
}

#![allow(dead_code)]

pub mod artifacts;
pub mod fixtures;

pub use artifacts::{GeneratedDocx, GeneratedPdf};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}

/// Assert the MediaBox width and height of a page
#[macro_export]
macro_rules! assert_pdf_page_size {
    ($pdf:expr, $page:expr, $width:expr, $height:expr) => {
        let (w, h) = $pdf.page_size($page);
        assert!(
            (w - $width).abs() < 0.01 && (h - $height).abs() < 0.01,
            "Expected page {} to be {}x{}, got {}x{}",
            $page,
            $width,
            $height,
            w,
            h
        );
    };
}

/// Assert that a page's content stream shows a literal string
#[macro_export]
macro_rules! assert_pdf_page_shows {
    ($pdf:expr, $page:expr, $text:expr) => {
        assert!(
            $pdf.page_shows($page, $text),
            "Page {} should show '{}'",
            $page,
            $text
        );
    };
}

/// Assert that a package part contains a fragment
#[macro_export]
macro_rules! assert_docx_part_contains {
    ($docx:expr, $part:expr, $fragment:expr) => {
        let xml = $docx.part($part).unwrap_or_else(|| panic!("part '{}' is missing", $part));
        assert!(
            xml.contains($fragment),
            "Part '{}' should contain '{}', but was:\n{}",
            $part,
            $fragment,
            xml
        );
    };
}

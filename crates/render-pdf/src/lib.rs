//! Page-painting encoder.
//!
//! The document is paginated in full before painting starts; each page's
//! content stream is then written straight to the output file through
//! [`StreamingPdfWriter`], so memory stays bounded by one page plus the
//! layout.

mod generator;
mod painter;
mod writer;

pub use generator::PdfGenerator;
pub use painter::encode_win_ansi;
pub use writer::StreamingPdfWriter;

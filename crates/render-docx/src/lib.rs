//! Word-processor encoder.
//!
//! Writes a minimal WordprocessingML package. Header and footer sections map
//! to native header/footer parts; the word processor paginates the body and
//! evaluates the page-number fields.

mod body;
mod generator;
mod parts;

pub use generator::DocxGenerator;
pub use parts::{FOOTER_PART, HEADER_PART};

//! Core generator abstractions.
//!
//! This crate provides the fundamental traits and types shared by the encoders:
//! - `DocumentGenerator` trait implemented once per output format
//! - `GenerationResult`, the data-only outcome of one document
//! - Error types and the guarded runner every encoder writes through

mod error;
mod traits;
mod types;
pub mod utils;

pub use error::GenerationError;
pub use quire_types::CancellationToken;
pub use traits::{DocumentGenerator, PageNumberStrategy};
pub use types::{Encoded, GenerationResult, GeneratorConfig};

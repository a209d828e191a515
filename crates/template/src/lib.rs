//! Template handling for quire.
//!
//! - **parser**: hybrid template text into a [`LayoutSkeleton`]
//! - **binding**: the [`BindingAdapter`] seam and its `handlebars` implementation
//! - **validate**: static checks backing a "validate before save" action

pub mod binding;
mod error;
pub mod parser;
mod skeleton;
pub mod validate;

pub use binding::{BindingAdapter, BindingContext, BindingError, HandlebarsAdapter};
pub use error::TemplateError;
pub use parser::{ParseOptions, parse, parse_with};
pub use skeleton::{
    Directive, DocumentSettings, LayoutSkeleton, RawSection, SectionKind, TemplateSource,
};
pub use validate::{Validation, validate};

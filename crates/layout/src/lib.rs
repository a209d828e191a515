//! Renderer-neutral layout for quire.
//!
//! [`resolve`] turns a parsed skeleton plus rows into a [`LayoutModel`].
//! Encoders that compute their own pages (PDF) then run [`paginate`]; encoders
//! whose target application paginates (DOCX) consume the model's flow blocks
//! directly.

pub mod config;
mod elements;
pub mod flow;
pub mod metrics;
mod model;
pub mod paginate;

pub use self::config::LayoutConfig;
pub use self::elements::{LayoutElement, PositionedElement, RectElement, TextAlign, TextElement};
pub use self::flow::{FlowBlock, Table};
pub use self::model::{LayoutModel, ResolvedSection, resolve};
pub use self::paginate::{Band, LayoutError, Page, PaginatedDocument, paginate};

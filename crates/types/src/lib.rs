pub mod cancel;
pub mod error;
pub mod format;
pub mod options;
pub mod page;

use serde_json::{Map, Value};

pub use cancel::CancellationToken;
pub use error::ErrorKind;
pub use format::OutputFormat;
pub use options::{
    DEFAULT_PAGE_NUMBER_FORMAT, GenerationOptions, PageNumberToken, has_page_tokens,
    substitute_page_tokens, tokenize_page_format,
};
pub use page::{
    Margins, Orientation, PT_PER_MM, PageSetup, PageSize, TWIPS_PER_MM, UnknownValueError,
    mm_to_pt, mm_to_twips,
};

/// A single materialized query row: column name to scalar or nested value.
pub type Row = Map<String, Value>;

use serde::Serialize;
use std::fmt;

/// Coarse classification shared by every error type in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Malformed directives or sections, or a binding-engine failure.
    TemplateSyntax,
    /// Unknown or unimplemented output format.
    UnsupportedFormat,
    /// Encoder failure while laying out or encoding.
    Generation,
    /// The document was valid but could not be persisted.
    Io,
    /// Generation was cancelled before it finished.
    Cancelled,
    /// Batch-level configuration problem.
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::TemplateSyntax => "TemplateSyntaxError",
            ErrorKind::UnsupportedFormat => "UnsupportedFormatError",
            ErrorKind::Generation => "GenerationError",
            ErrorKind::Io => "IOError",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Config => "ConfigError",
        };
        f.write_str(name)
    }
}

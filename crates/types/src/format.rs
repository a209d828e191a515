use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::page::UnknownValueError;

/// Output formats a template may declare.
///
/// `Odt` is recognized so that templates carrying it parse, but no encoder
/// exists for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdf,
    Docx,
    Odt,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
            OutputFormat::Odt => "odt",
        }
    }

    pub fn is_implemented(&self) -> bool {
        !matches!(self, OutputFormat::Odt)
    }
}

impl FromStr for OutputFormat {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "docx" => Ok(OutputFormat::Docx),
            "odt" => Ok(OutputFormat::Odt),
            _ => Err(UnknownValueError { kind: "format", value: s.trim().to_string() }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

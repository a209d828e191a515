//! Reading row sets from JSON.

use crate::error::PipelineError;
use quire_types::Row;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

/// Parses a JSON array of objects. Any other shape is a configuration error.
pub fn rows_from_json(text: &str) -> Result<Vec<Row>, PipelineError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(PipelineError::Config("row data must be a JSON array of objects".to_string()));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(row) => Ok(row),
            other => Err(PipelineError::Config(format!(
                "row {} is not a JSON object: {}",
                i, other
            ))),
        })
        .collect()
}

pub fn read_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Row>, PipelineError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        PipelineError::Io(io::Error::new(
            e.kind(),
            format!("Failed to read rows from '{}': {}", path.display(), e),
        ))
    })?;
    let rows = rows_from_json(&text)?;
    log::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

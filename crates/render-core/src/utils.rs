use crate::error::GenerationError;
use crate::types::{Encoded, GenerationResult};
use log::{debug, warn};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

/// Convert layout Y coordinate to PDF Y coordinate (flip origin)
pub fn flip_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}

/// Runs an encoder body and folds every outcome into a [`GenerationResult`].
///
/// A panic inside `encode` becomes [`GenerationError::Internal`]. On any
/// failure a partially written file at `output_path` is removed.
pub fn run_encoder<F>(output_path: &Path, encode: F) -> GenerationResult
where
    F: FnOnce() -> Result<Encoded, GenerationError>,
{
    let outcome = match catch_unwind(AssertUnwindSafe(encode)) {
        Ok(result) => result,
        Err(payload) => Err(GenerationError::Internal(panic_message(payload.as_ref()))),
    };

    match outcome {
        Ok(encoded) => {
            debug!("Wrote {} bytes to {}", encoded.bytes, output_path.display());
            GenerationResult::success(output_path, encoded)
        }
        Err(err) => {
            remove_partial(output_path);
            GenerationResult::failure(output_path, err)
        }
    }
}

fn remove_partial(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove partial output {}: {}", path.display(), e);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("encoder panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("encoder panicked: {}", s)
    } else {
        "encoder panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_types::ErrorKind;

    #[test]
    fn failures_remove_the_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.pdf");
        let result = run_encoder(&path, || {
            std::fs::write(&path, b"%PDF-1.7 trunc").map_err(|e| GenerationError::io(&path, e))?;
            Err(GenerationError::Encode("bad".into()))
        });
        assert!(!result.is_success());
        assert!(!path.exists());
    }

    #[test]
    fn panics_become_internal_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boom.pdf");
        let result = run_encoder(&path, || panic!("pathological"));
        assert_eq!(result.error_kind(), Some(ErrorKind::Generation));
        assert!(result.error_message().unwrap().contains("pathological"));
    }

    #[test]
    fn flip_y_mirrors_origin() {
        assert_eq!(flip_y(0.0, 792.0), 792.0);
        assert_eq!(flip_y(792.0, 792.0), 0.0);
    }
}

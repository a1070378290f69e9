//! Output directory layout.
//!
//! ```text
//! <output_dir>/
//!     metadata.json
//!     lines.png          (optional)
//!     lines.svg          (optional)
//!     pieces/
//!         piece_<id>.png
//! ```
//!
//! The directory is replaced wholesale on every run.

use std::fs;
use std::path::{Path, PathBuf};

use jigcut_pipeline::PuzzleMetadata;

use crate::error::RunError;

/// Name of the metadata document inside the output directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Name of the piece image directory inside the output directory.
pub const PIECES_DIR: &str = "pieces";

/// Cutter overlay files and the names they are copied to.
pub const OVERLAYS: [(&str, &str); 2] = [
    ("lines-resized.png", "lines.png"),
    ("lines-resized.svg", "lines.svg"),
];

/// Delete `output_dir` if it exists and recreate it with an empty
/// `pieces/` directory, returning the latter.
///
/// # Errors
///
/// Returns [`RunError::Unexpected`] if the directory cannot be removed
/// or created.
pub fn reset_output_dir(output_dir: &Path) -> Result<PathBuf, RunError> {
    if output_dir.exists() {
        fs::remove_dir_all(output_dir).map_err(|e| RunError::io("remove", output_dir, &e))?;
    }
    let pieces_dir = output_dir.join(PIECES_DIR);
    fs::create_dir_all(&pieces_dir).map_err(|e| RunError::io("create", &pieces_dir, &e))?;
    Ok(pieces_dir)
}

/// Copy whichever overlay files the cutter produced into `output_dir`.
///
/// Returns how many were copied. Absent overlays are not an error.
///
/// # Errors
///
/// Returns [`RunError::Unexpected`] if a present overlay cannot be
/// copied.
pub fn copy_overlays(work_dir: &Path, output_dir: &Path) -> Result<usize, RunError> {
    let mut copied = 0;
    for (source_name, target_name) in OVERLAYS {
        let source = work_dir.join(source_name);
        if !source.is_file() {
            log::debug!("no overlay {}", source.display());
            continue;
        }
        fs::copy(&source, output_dir.join(target_name))
            .map_err(|e| RunError::io("copy", &source, &e))?;
        copied += 1;
    }
    Ok(copied)
}

/// Write `metadata` as pretty-printed JSON to `<output_dir>/metadata.json`.
///
/// # Errors
///
/// Returns [`RunError::Unexpected`] if serialization or the write fails.
pub fn write_metadata(output_dir: &Path, metadata: &PuzzleMetadata) -> Result<PathBuf, RunError> {
    let path = output_dir.join(METADATA_FILE);
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| RunError::Unexpected(format!("failed to serialize metadata: {e}")))?;
    fs::write(&path, json).map_err(|e| RunError::io("write", &path, &e))?;
    Ok(path)
}

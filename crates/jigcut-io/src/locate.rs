//! Finding the highest-fidelity size tier in the cutter's output.

use std::fs;
use std::path::{Path, PathBuf};

use jigcut_pipeline::select_tier;

use crate::error::RunError;

/// Return the path of the highest-ranked `size-<N>` subdirectory of
/// `work_dir`.
///
/// Only immediate subdirectories are considered; files with tier-like
/// names are ignored.
///
/// # Errors
///
/// Returns [`RunError::NoOutput`] if there is no tier directory and
/// [`RunError::Unexpected`] if `work_dir` cannot be listed.
pub fn locate_tier(work_dir: &Path) -> Result<PathBuf, RunError> {
    let entries = fs::read_dir(work_dir).map_err(|e| RunError::io("list", work_dir, &e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RunError::io("list", work_dir, &e))?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }

    let tier = select_tier(names.iter().map(String::as_str)).ok_or(RunError::NoOutput)?;
    log::info!("using size tier {tier}");
    Ok(work_dir.join(tier))
}

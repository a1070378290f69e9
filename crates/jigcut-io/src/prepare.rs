//! Source image pre-processing.
//!
//! Reads the source image and, when it is smaller than the configured
//! minimum long side, writes an upscaled PNG copy to the system temp
//! directory for the cutter to work from.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use jigcut_pipeline::{decode_image, encode_png, upscale};

use crate::cleanup::TempArtifact;
use crate::error::RunError;

/// The image the cutter should consume.
///
/// Holds the upscaled temporary copy, if one was made, and deletes it
/// when dropped.
#[derive(Debug)]
pub struct PreparedImage {
    path: PathBuf,
    upscaled: Option<TempArtifact>,
}

impl PreparedImage {
    /// Path of the image to hand to the cutter.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.upscaled
            .as_ref()
            .map_or(self.path.as_path(), TempArtifact::path)
    }

    /// Whether [`path`](Self::path) is a temporary upscaled copy.
    #[must_use]
    pub const fn is_upscaled(&self) -> bool {
        self.upscaled.is_some()
    }
}

/// Check the source image and upscale it if needed.
///
/// # Errors
///
/// Returns [`RunError::Input`] if `source` does not exist.
/// Returns [`RunError::Image`] if it cannot be read or decoded.
/// Returns [`RunError::Unexpected`] if the temporary copy cannot be
/// written.
pub fn prepare_image(source: &Path, min_long_side: u32) -> Result<PreparedImage, RunError> {
    if !source.exists() {
        return Err(RunError::Input(source.to_path_buf()));
    }

    let bytes = fs::read(source).map_err(|e| RunError::Image(e.to_string()))?;
    let image = decode_image(&bytes)?;

    let Some(upscaled) = upscale(&image, min_long_side) else {
        log::info!(
            "source image {}x{} needs no upscaling",
            image.width(),
            image.height()
        );
        return Ok(PreparedImage {
            path: source.to_path_buf(),
            upscaled: None,
        });
    };

    log::info!(
        "upscaled source image {}x{} -> {}x{}",
        image.width(),
        image.height(),
        upscaled.width(),
        upscaled.height()
    );
    let png = encode_png(&upscaled)?;
    let temp = write_temp_png(&png)?;

    Ok(PreparedImage {
        path: source.to_path_buf(),
        upscaled: Some(temp),
    })
}

/// Write `png` to a freshly created, uniquely named file in the system
/// temp directory.
fn write_temp_png(png: &[u8]) -> Result<TempArtifact, RunError> {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "jigcut-upscaled-{}-{nanos}-{seq}.png",
        std::process::id()
    ));

    let mut file = File::options()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| RunError::io("create", &path, &e))?;
    let guard = TempArtifact::file(path);
    file.write_all(png)
        .map_err(|e| RunError::io("write", guard.path(), &e))?;
    Ok(guard)
}

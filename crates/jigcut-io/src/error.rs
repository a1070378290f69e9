//! Error taxonomy for a cutting run.
//!
//! Every variant's `Display` text is the message reported to the client
//! application in the `{"error": ...}` object.

use std::io;
use std::path::{Path, PathBuf};

use jigcut_pipeline::PipelineError;

/// Command-line usage shown in arity errors.
pub const USAGE: &str = "Usage: jigcut <image_path> <output_dir> <num_pieces>";

/// Any failure that aborts a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Bad argument count or type.
    #[error("{0}")]
    Usage(String),

    /// The source image does not exist.
    #[error("Image not found: {}", .0.display())]
    Input(PathBuf),

    /// The source image could not be read, decoded, or resampled.
    #[error("Could not open image: {0}")]
    Image(String),

    /// The cutter executable could not be found.
    #[error("piecemaker not found ({program}). Install with: pip3 install piecemaker")]
    ToolNotFound {
        /// The program name or path that was tried.
        program: String,
    },

    /// The cutter exited unsuccessfully. The status is kept for logging;
    /// the message carries only the cutter's own diagnostics.
    #[error("piecemaker failed: {stderr}")]
    ToolExecution {
        /// Human-readable exit status.
        status: String,
        /// The cutter's diagnostic output.
        stderr: String,
    },

    /// The cutter exceeded its wall-clock limit and was killed.
    #[error("piecemaker timed out (>{secs} seconds)")]
    Timeout {
        /// The limit that was exceeded.
        secs: u64,
    },

    /// The cutter produced no `size-<N>` directory.
    #[error("No output directory found from piecemaker")]
    NoOutput,

    /// A cutter metadata file is absent.
    #[error("piecemaker did not produce expected metadata file: {}", .0.display())]
    MissingMetadata(PathBuf),

    /// A cutter metadata file could not be parsed or has the wrong shape.
    #[error("Corrupt piecemaker metadata ({file}): {reason}")]
    CorruptMetadata {
        /// File name of the offending document.
        file: String,
        /// The parse or validation failure.
        reason: String,
    },

    /// No piece image survived.
    #[error("No piece image files were found in the piecemaker output.")]
    EmptyResult,

    /// Anything else, with enough context for a postmortem.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl RunError {
    /// Wrap an unanticipated filesystem failure on `path`.
    #[must_use]
    pub fn io(action: &str, path: &Path, err: &io::Error) -> Self {
        Self::Unexpected(format!("failed to {action} {}: {err}", path.display()))
    }
}

impl From<PipelineError> for RunError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::PieceCountNotInteger(arg) => {
                Self::Usage(format!("Invalid piece count: '{arg}' is not an integer."))
            }
            PipelineError::TooFewPieces(n) => {
                Self::Usage(format!("Need at least 2 pieces, got {n}."))
            }
            PipelineError::TooManyPieces(n) => {
                Self::Usage(format!("Too many pieces requested: {n}."))
            }
            PipelineError::InvalidConfig(reason) => Self::Usage(format!("Invalid config: {reason}")),
            PipelineError::EmptyInput => Self::Image("image file is empty".to_owned()),
            PipelineError::ImageDecode(e) => Self::Image(e.to_string()),
            PipelineError::ImageEncode(e) => {
                Self::Image(format!("failed to encode upscaled image: {e}"))
            }
            PipelineError::CorruptMetadata { file, reason } => {
                Self::CorruptMetadata { file, reason }
            }
            PipelineError::EmptyResult => Self::EmptyResult,
        }
    }
}

//! Shared types for the jigcut pipeline.

use serde::{Deserialize, Serialize};

/// Identifier the cutter assigns to a piece.
///
/// Unique within one cutter run but not necessarily contiguous.
pub type PieceId = u32;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The longer of the two axes.
    #[must_use]
    pub const fn long_side(self) -> u32 {
        if self.width >= self.height {
            self.width
        } else {
            self.height
        }
    }
}

/// Axis-aligned bounding box of a piece in source-image coordinates.
///
/// Coordinates are signed: the cutter may place a piece's tabs slightly
/// outside the image frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// Position class of a piece within the puzzle frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    /// Touches two or more sides of the frame.
    Corner,
    /// Touches exactly one side of the frame.
    Edge,
    /// Touches no side of the frame.
    Interior,
}

/// One entry of the `pieces` array in the final metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRecord {
    pub id: PieceId,
    /// File name of the copied piece image inside the `pieces/` directory.
    pub filename: String,
    #[serde(flatten)]
    pub bounds: BoundingBox,
    /// Rendered width of the piece image.
    pub width: u32,
    /// Rendered height of the piece image.
    pub height: u32,
    #[serde(rename = "type")]
    pub kind: PieceKind,
    /// Ids of pieces sharing a cut edge with this one, in cutter order.
    pub neighbours: Vec<PieceId>,
}

/// The consolidated metadata document written to `metadata.json` and
/// echoed on stdout.
///
/// Built through [`crate::assemble::assemble_metadata`], which keeps
/// `piece_count == pieces.len()` and guarantees at least one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleMetadata {
    pub piece_count: usize,
    pub image_width: u32,
    pub image_height: u32,
    pub requested_pieces: u32,
    /// Pieces in ascending id order.
    pub pieces: Vec<PieceRecord>,
    /// Present only when some piece images were missing from the cutter
    /// output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Configuration for a cutting job.
///
/// Every field has a default matching the behaviour the client
/// application expects; partial JSON (e.g. from `--config-json`) fills
/// the remaining fields from [`CutConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutConfig {
    /// Images whose longer side is below this many pixels are upscaled
    /// so that the cutter's curved edges rasterise smoothly.
    pub min_long_side: u32,

    /// A piece side within this many pixels of the image frame counts as
    /// touching the border.
    pub border_tolerance: u32,

    /// Name or path of the piecemaker executable.
    pub cutter_program: String,

    /// Hard wall-clock limit for the cutter subprocess, in seconds.
    pub cutter_timeout_secs: u64,

    /// The single size tier (percent of full size) requested from the
    /// cutter.
    pub scaled_size: u32,
}

impl CutConfig {
    /// Default upscale threshold in pixels.
    pub const DEFAULT_MIN_LONG_SIDE: u32 = 2000;

    /// Default border proximity tolerance in pixels.
    pub const DEFAULT_BORDER_TOLERANCE: u32 = 2;

    /// Default cutter executable.
    pub const DEFAULT_CUTTER_PROGRAM: &'static str = "piecemaker";

    /// Default cutter timeout: five minutes.
    pub const DEFAULT_CUTTER_TIMEOUT_SECS: u64 = 300;

    /// Default size tier: full size.
    pub const DEFAULT_SCALED_SIZE: u32 = 100;

    /// Check that the configuration can drive a run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the cutter timeout or
    /// the size tier is zero, or if the cutter program is empty.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.cutter_timeout_secs == 0 {
            return Err(PipelineError::InvalidConfig(
                "cutter_timeout_secs must be at least 1".to_owned(),
            ));
        }
        if self.scaled_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "scaled_size must be at least 1".to_owned(),
            ));
        }
        if self.cutter_program.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "cutter_program must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            min_long_side: Self::DEFAULT_MIN_LONG_SIDE,
            border_tolerance: Self::DEFAULT_BORDER_TOLERANCE,
            cutter_program: Self::DEFAULT_CUTTER_PROGRAM.to_owned(),
            cutter_timeout_secs: Self::DEFAULT_CUTTER_TIMEOUT_SECS,
            scaled_size: Self::DEFAULT_SCALED_SIZE,
        }
    }
}

/// Errors from the pure pipeline stages.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The requested piece count is not an integer.
    #[error("invalid piece count: '{0}' is not an integer")]
    PieceCountNotInteger(String),

    /// Fewer than [`crate::pieces::MIN_PIECES`] pieces were requested.
    #[error("need at least 2 pieces, got {0}")]
    TooFewPieces(i64),

    /// The requested piece count does not fit the supported range.
    #[error("too many pieces requested: {0}")]
    TooManyPieces(i64),

    /// A [`CutConfig`] field is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Failed to encode the upscaled image.
    #[error("failed to encode image: {0}")]
    ImageEncode(#[source] image::ImageError),

    /// A cutter metadata document did not have the expected shape.
    #[error("corrupt metadata ({file}): {reason}")]
    CorruptMetadata {
        /// File name of the offending document.
        file: String,
        /// What was wrong with it.
        reason: String,
    },

    /// No piece survived assembly.
    #[error("no piece images were found in the cutter output")]
    EmptyResult,
}

//! jigcut-pipeline: Pure jigsaw cutting pipeline (sans-IO).
//!
//! Everything between "the cutter ran" and "the metadata document is
//! ready" that does not touch the filesystem lives here:
//! piece-count validation -> upscale decision -> size-tier selection ->
//! metadata parsing -> border classification -> document assembly.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! images and JSON strings and returns structured data. Subprocess and
//! filesystem interaction lives in `jigcut-io`.

pub mod assemble;
pub mod classify;
pub mod metadata;
pub mod pieces;
pub mod tier;
pub mod types;
pub mod upscale;

pub use assemble::{assemble_metadata, describe_piece, missing_warning, piece_filename};
pub use classify::{BorderContact, classify};
pub use metadata::{Adjacency, CutterMetadata, GeometryMap, PieceGeometry};
pub use pieces::{MIN_PIECES, parse_piece_count};
pub use tier::{select_tier, tier_rank};
pub use types::{
    BoundingBox, CutConfig, Dimensions, PieceId, PieceKind, PieceRecord, PipelineError,
    PuzzleMetadata,
};
pub use upscale::{decode_image, encode_png, upscale, upscaled_dimensions};

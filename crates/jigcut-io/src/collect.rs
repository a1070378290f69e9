//! Copying piece rasters into the output directory.

use std::fs;
use std::path::Path;

use jigcut_pipeline::{CutterMetadata, PieceId, PieceRecord, describe_piece, piece_filename};

use crate::error::RunError;

/// Raster folder inside a size tier, relative to the tier directory.
pub const RASTER_SUBDIR: &str = "raster/image-0";

/// Pieces copied from the cutter output, and those that were absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedPieces {
    /// Records of the copied pieces, in ascending id order.
    pub pieces: Vec<PieceRecord>,
    /// Ids listed in the geometry whose raster was missing.
    pub missing: Vec<PieceId>,
}

/// Copy every piece raster listed in `metadata` from `tier_dir` into
/// `pieces_dir` as `piece_<id>.png`, describing each copied piece.
///
/// A missing raster is recorded and skipped rather than aborting.
///
/// # Errors
///
/// Returns [`RunError::Unexpected`] if a present raster cannot be
/// copied.
pub fn collect_pieces(
    metadata: &CutterMetadata,
    tier_dir: &Path,
    pieces_dir: &Path,
    border_tolerance: u32,
) -> Result<CollectedPieces, RunError> {
    let raster_dir = tier_dir.join(RASTER_SUBDIR);
    let mut collected = CollectedPieces::default();

    for (id, geometry) in metadata.geometry.iter() {
        let source = raster_dir.join(format!("{id}.png"));
        if !source.is_file() {
            log::warn!("piece {id} has no raster at {}", source.display());
            collected.missing.push(id);
            continue;
        }

        let target = pieces_dir.join(piece_filename(id));
        fs::copy(&source, &target).map_err(|e| RunError::io("copy", &source, &e))?;

        collected.pieces.push(describe_piece(
            id,
            geometry,
            &metadata.adjacency,
            metadata.image,
            border_tolerance,
        ));
    }

    log::info!(
        "collected {} pieces, {} missing",
        collected.pieces.len(),
        collected.missing.len()
    );
    Ok(collected)
}

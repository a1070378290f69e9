//! Assembly of the final puzzle metadata document.

use crate::classify::classify;
use crate::metadata::{Adjacency, PieceGeometry};
use crate::types::{Dimensions, PieceId, PieceRecord, PipelineError, PuzzleMetadata};

/// Output file name for a piece image.
#[must_use]
pub fn piece_filename(id: PieceId) -> String {
    format!("piece_{id}.png")
}

/// Build the metadata record for one piece.
#[must_use]
pub fn describe_piece(
    id: PieceId,
    geometry: &PieceGeometry,
    adjacency: &Adjacency,
    image: Dimensions,
    border_tolerance: u32,
) -> PieceRecord {
    PieceRecord {
        id,
        filename: piece_filename(id),
        bounds: geometry.bounds,
        width: geometry.width,
        height: geometry.height,
        kind: classify(&geometry.bounds, image, border_tolerance),
        neighbours: adjacency.neighbours(id).to_vec(),
    }
}

/// Warning text listing piece ids whose images were missing.
///
/// `None` when nothing is missing.
#[must_use]
pub fn missing_warning(missing: &[PieceId]) -> Option<String> {
    if missing.is_empty() {
        return None;
    }
    let ids = missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "{} piece image(s) were missing: {ids}",
        missing.len()
    ))
}

/// Assemble the final document from the pieces that were produced.
///
/// `pieces` is sorted by id; `missing` lists the ids whose images the
/// cutter failed to produce.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyResult`] if `pieces` is empty. A cutter
/// run with no usable piece is a failure, not a degenerate success.
pub fn assemble_metadata(
    image: Dimensions,
    requested_pieces: u32,
    mut pieces: Vec<PieceRecord>,
    missing: &[PieceId],
) -> Result<PuzzleMetadata, PipelineError> {
    if pieces.is_empty() {
        return Err(PipelineError::EmptyResult);
    }
    pieces.sort_by_key(|piece| piece.id);

    let mut missing = missing.to_vec();
    missing.sort_unstable();

    Ok(PuzzleMetadata {
        piece_count: pieces.len(),
        image_width: image.width,
        image_height: image.height,
        requested_pieces,
        pieces,
        warning: missing_warning(&missing),
    })
}

//! Validation of the requested piece count.

use crate::types::PipelineError;

/// Smallest piece count the cutter can honour.
pub const MIN_PIECES: u32 = 2;

/// Parse the piece-count argument.
///
/// Surrounding whitespace and a leading `+` are accepted.
///
/// # Errors
///
/// Returns [`PipelineError::PieceCountNotInteger`] if `arg` is not an
/// integer, [`PipelineError::TooFewPieces`] if it is below
/// [`MIN_PIECES`], and [`PipelineError::TooManyPieces`] if it does not
/// fit in a `u32`.
pub fn parse_piece_count(arg: &str) -> Result<u32, PipelineError> {
    let value: i64 = arg
        .trim()
        .parse()
        .map_err(|_| PipelineError::PieceCountNotInteger(arg.to_owned()))?;

    if value < i64::from(MIN_PIECES) {
        return Err(PipelineError::TooFewPieces(value));
    }

    u32::try_from(value).map_err(|_| PipelineError::TooManyPieces(value))
}

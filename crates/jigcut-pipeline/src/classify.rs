//! Border classification of pieces.
//!
//! A piece is classified purely from its bounding box: each of its four
//! sides either lies within a small tolerance of the matching image
//! frame edge or it does not. Two or more touching sides make a corner,
//! one makes an edge piece, none an interior piece.
//!
//! This does not trace the actual cut curve, so a piece whose tab pokes
//! to within the tolerance of the frame is counted as touching it.

use crate::types::{BoundingBox, Dimensions, PieceKind};

/// Which sides of a piece touch the image frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderContact {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl BorderContact {
    /// Determine the frame contact of `bounds` inside an image of the
    /// given dimensions.
    #[must_use]
    pub fn of(bounds: &BoundingBox, image: Dimensions, tolerance: u32) -> Self {
        let tolerance = i64::from(tolerance);
        let width = i64::from(image.width);
        let height = i64::from(image.height);

        Self {
            left: bounds.x1 <= tolerance,
            right: bounds.x2 >= width - tolerance,
            top: bounds.y1 <= tolerance,
            bottom: bounds.y2 >= height - tolerance,
        }
    }

    /// Number of touching sides (0 to 4).
    #[must_use]
    pub fn count(self) -> usize {
        [self.left, self.right, self.top, self.bottom]
            .into_iter()
            .filter(|&side| side)
            .count()
    }

    #[must_use]
    pub fn kind(self) -> PieceKind {
        match self.count() {
            0 => PieceKind::Interior,
            1 => PieceKind::Edge,
            _ => PieceKind::Corner,
        }
    }
}

/// Classify a piece as corner, edge, or interior.
#[must_use]
pub fn classify(bounds: &BoundingBox, image: Dimensions, tolerance: u32) -> PieceKind {
    BorderContact::of(bounds, image, tolerance).kind()
}

//! Typed parsing of the cutter's JSON metadata.
//!
//! piecemaker writes three documents:
//!
//! - `index.json` at the root of its working directory, carrying the
//!   source image dimensions among other summary fields;
//! - `adjacent.json` next to it, mapping each piece id to the ids of its
//!   neighbours;
//! - `pieces.json` inside each size tier, mapping each piece id to
//!   `[x1, y1, x2, y2, ..., width, height]`.
//!
//! Each document is validated into an explicit record here, so the rest
//! of the pipeline never sees loosely-typed JSON. Any unexpected shape is
//! reported as [`PipelineError::CorruptMetadata`] naming the file.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::types::{BoundingBox, Dimensions, PieceId, PipelineError};

/// File name of the global index document.
pub const INDEX_FILE: &str = "index.json";

/// File name of the adjacency document.
pub const ADJACENCY_FILE: &str = "adjacent.json";

/// File name of the per-tier geometry document.
pub const PIECES_FILE: &str = "pieces.json";

/// Minimum geometry entry length: four bounding-box values plus the
/// rendered width and height.
const MIN_GEOMETRY_LEN: usize = 6;

fn corrupt(file: &str, reason: impl Into<String>) -> PipelineError {
    PipelineError::CorruptMetadata {
        file: file.to_owned(),
        reason: reason.into(),
    }
}

/// Piece ids must be written canonically: the cutter names raster files
/// after the id text, so `"01"` and `"1"` would name different files.
fn parse_piece_id(file: &str, key: &str) -> Result<PieceId, PipelineError> {
    let id: PieceId = key
        .parse()
        .map_err(|_| corrupt(file, format!("piece id '{key}' is not a non-negative integer")))?;
    if id.to_string() != key {
        return Err(corrupt(file, format!("piece id '{key}' is not in canonical form")));
    }
    Ok(id)
}

#[derive(Deserialize)]
struct IndexDocument {
    image_width: u32,
    image_height: u32,
}

/// Parse `index.json` and return the source image dimensions.
///
/// # Errors
///
/// Returns [`PipelineError::CorruptMetadata`] if the document is not
/// valid JSON or lacks non-negative integer `image_width` and
/// `image_height` fields.
pub fn parse_index(json: &str) -> Result<Dimensions, PipelineError> {
    let doc: IndexDocument =
        serde_json::from_str(json).map_err(|e| corrupt(INDEX_FILE, e.to_string()))?;
    Ok(Dimensions::new(doc.image_width, doc.image_height))
}

/// Neighbour ids appear both as JSON numbers and as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(PieceId),
    Text(String),
}

/// Piece adjacency: piece id to the ids of pieces sharing a cut edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency(BTreeMap<PieceId, Vec<PieceId>>);

impl Adjacency {
    /// Neighbours of `id`, in cutter order. Empty when `id` is unknown.
    #[must_use]
    pub fn neighbours(&self, id: PieceId) -> &[PieceId] {
        self.0.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse `adjacent.json`.
///
/// # Errors
///
/// Returns [`PipelineError::CorruptMetadata`] if the document is not a
/// JSON object of id arrays, or if any id is not a non-negative integer.
pub fn parse_adjacency(json: &str) -> Result<Adjacency, PipelineError> {
    let raw: BTreeMap<String, Vec<IdRepr>> =
        serde_json::from_str(json).map_err(|e| corrupt(ADJACENCY_FILE, e.to_string()))?;

    let mut map = BTreeMap::new();
    for (key, neighbours) in raw {
        let id = parse_piece_id(ADJACENCY_FILE, &key)?;
        let neighbours = neighbours
            .into_iter()
            .map(|n| match n {
                IdRepr::Number(value) => Ok(value),
                IdRepr::Text(text) => parse_piece_id(ADJACENCY_FILE, &text),
            })
            .collect::<Result<Vec<_>, _>>()?;
        map.insert(id, neighbours);
    }
    Ok(Adjacency(map))
}

/// Geometry of one piece in the selected size tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceGeometry {
    pub bounds: BoundingBox,
    /// Rendered width of the piece raster.
    pub width: u32,
    /// Rendered height of the piece raster.
    pub height: u32,
}

/// Per-tier piece geometry, keyed and iterated by ascending piece id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryMap(BTreeMap<PieceId, PieceGeometry>);

impl GeometryMap {
    /// Pieces in ascending numeric id order.
    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &PieceGeometry)> {
        self.0.iter().map(|(&id, geometry)| (id, geometry))
    }

    #[must_use]
    pub fn get(&self, id: PieceId) -> Option<&PieceGeometry> {
        self.0.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse a tier's `pieces.json`.
///
/// Only the first four elements (bounding box) and the last two
/// (rendered size) of each entry are used; anything in between is the
/// cutter's cut-path encoding and is skipped.
///
/// # Errors
///
/// Returns [`PipelineError::CorruptMetadata`] if the document is not a
/// JSON object of arrays, if an entry is shorter than six elements, if a
/// bounding-box or size slot is not an integer, if a rendered size is
/// negative, or if a key is not a piece id.
pub fn parse_geometry(json: &str) -> Result<GeometryMap, PipelineError> {
    let raw: BTreeMap<String, Vec<Value>> =
        serde_json::from_str(json).map_err(|e| corrupt(PIECES_FILE, e.to_string()))?;

    let mut map = BTreeMap::new();
    for (key, values) in raw {
        let id = parse_piece_id(PIECES_FILE, &key)?;
        let geometry = geometry_from_values(id, &values)?;
        map.insert(id, geometry);
    }
    Ok(GeometryMap(map))
}

fn geometry_from_values(id: PieceId, values: &[Value]) -> Result<PieceGeometry, PipelineError> {
    let [x1, y1, x2, y2, .., width, height] = values else {
        return Err(short_entry(id, values.len()));
    };

    let integer = |value: &Value, slot: &str| {
        value.as_i64().ok_or_else(|| {
            corrupt(
                PIECES_FILE,
                format!("piece {id} has non-integer {slot} {value}"),
            )
        })
    };
    let size = |value: &Value, axis: &str| {
        let raw = integer(value, axis)?;
        u32::try_from(raw)
            .map_err(|_| corrupt(PIECES_FILE, format!("piece {id} has invalid {axis} {raw}")))
    };

    Ok(PieceGeometry {
        bounds: BoundingBox::new(
            integer(x1, "x1")?,
            integer(y1, "y1")?,
            integer(x2, "x2")?,
            integer(y2, "y2")?,
        ),
        width: size(width, "width")?,
        height: size(height, "height")?,
    })
}

fn short_entry(id: PieceId, len: usize) -> PipelineError {
    corrupt(
        PIECES_FILE,
        format!("piece {id} has {len} values, expected at least {MIN_GEOMETRY_LEN}"),
    )
}

/// The three cutter documents, validated together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutterMetadata {
    /// Source image dimensions from `index.json`.
    pub image: Dimensions,
    pub adjacency: Adjacency,
    pub geometry: GeometryMap,
}

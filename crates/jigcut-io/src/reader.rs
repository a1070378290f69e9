//! Loading the cutter's metadata documents from disk.

use std::fs;
use std::io;
use std::path::Path;

use jigcut_pipeline::metadata::{
    ADJACENCY_FILE, INDEX_FILE, PIECES_FILE, parse_adjacency, parse_geometry, parse_index,
};
use jigcut_pipeline::{CutterMetadata, PipelineError};

use crate::error::RunError;

fn read_document(path: &Path, file: &str) -> Result<String, RunError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RunError::MissingMetadata(path.to_path_buf()),
        io::ErrorKind::InvalidData => RunError::from(PipelineError::CorruptMetadata {
            file: file.to_owned(),
            reason: e.to_string(),
        }),
        _ => RunError::io("read", path, &e),
    })
}

/// Load and validate `index.json` and `adjacent.json` from `work_dir`
/// and `pieces.json` from `tier_dir`.
///
/// All three must load before anything downstream runs.
///
/// # Errors
///
/// Returns [`RunError::MissingMetadata`] naming the first absent file
/// and [`RunError::CorruptMetadata`] naming the first file that fails to
/// parse or validate.
pub fn read_metadata(work_dir: &Path, tier_dir: &Path) -> Result<CutterMetadata, RunError> {
    let image = parse_index(&read_document(&work_dir.join(INDEX_FILE), INDEX_FILE)?)?;
    let adjacency = parse_adjacency(&read_document(
        &work_dir.join(ADJACENCY_FILE),
        ADJACENCY_FILE,
    )?)?;
    let geometry = parse_geometry(&read_document(&tier_dir.join(PIECES_FILE), PIECES_FILE)?)?;

    log::debug!(
        "cutter metadata: {}x{} image, {} pieces, {} adjacency entries",
        image.width,
        image.height,
        geometry.len(),
        adjacency.len()
    );

    Ok(CutterMetadata {
        image,
        adjacency,
        geometry,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use jigcut_pipeline::Dimensions;

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "jigcut-reader-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("size-100")).unwrap();
        fs::write(
            dir.join(INDEX_FILE),
            r#"{"image_width": 400, "image_height": 300}"#,
        )
        .unwrap();
        fs::write(dir.join(ADJACENCY_FILE), r#"{"0": ["1"], "1": ["0"]}"#).unwrap();
        fs::write(
            dir.join("size-100").join(PIECES_FILE),
            r#"{"0": [0, 0, 210, 300, 211, 301], "1": [190, 0, 400, 300, 211, 301]}"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn reads_all_three_documents() {
        let dir = scratch("ok");
        let metadata = read_metadata(&dir, &dir.join("size-100")).unwrap();
        assert_eq!(metadata.image, Dimensions::new(400, 300));
        assert_eq!(metadata.adjacency.neighbours(0), &[1]);
        assert_eq!(metadata.geometry.len(), 2);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_adjacency_is_missing_metadata() {
        let dir = scratch("missing-adjacency");
        fs::remove_file(dir.join(ADJACENCY_FILE)).unwrap();
        let err = read_metadata(&dir, &dir.join("size-100")).unwrap_err();
        let RunError::MissingMetadata(path) = &err else {
            unreachable!("expected MissingMetadata, got {err:?}");
        };
        assert_eq!(path, &dir.join(ADJACENCY_FILE));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_pieces_is_missing_metadata() {
        let dir = scratch("missing-pieces");
        fs::remove_file(dir.join("size-100").join(PIECES_FILE)).unwrap();
        let err = read_metadata(&dir, &dir.join("size-100")).unwrap_err();
        assert!(
            matches!(err, RunError::MissingMetadata(ref path) if *path == dir.join("size-100").join(PIECES_FILE)),
            "{err:?}"
        );
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn malformed_adjacency_is_corrupt_metadata() {
        let dir = scratch("corrupt-adjacency");
        fs::write(dir.join(ADJACENCY_FILE), r#"{"0": ["1""#).unwrap();
        let err = read_metadata(&dir, &dir.join("size-100")).unwrap_err();
        assert!(
            matches!(err, RunError::CorruptMetadata { ref file, .. } if file == ADJACENCY_FILE),
            "{err:?}"
        );
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn non_utf8_index_is_corrupt_metadata() {
        let dir = scratch("binary-index");
        fs::write(dir.join(INDEX_FILE), [0xFF, 0xFE, 0x00]).unwrap();
        let err = read_metadata(&dir, &dir.join("size-100")).unwrap_err();
        assert!(
            matches!(err, RunError::CorruptMetadata { ref file, .. } if file == INDEX_FILE),
            "{err:?}"
        );
        fs::remove_dir_all(dir).unwrap();
    }
}

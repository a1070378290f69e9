//! Best-effort removal of temporary artifacts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactKind {
    File,
    Dir,
}

/// A temporary file or directory removed when the guard is dropped.
///
/// Removal failures are logged and swallowed so that teardown never
/// masks the outcome of the run itself.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    kind: ArtifactKind,
}

impl TempArtifact {
    /// Guard a temporary file.
    #[must_use]
    pub const fn file(path: PathBuf) -> Self {
        Self {
            path,
            kind: ArtifactKind::File,
        }
    }

    /// Guard a temporary directory and everything under it.
    #[must_use]
    pub const fn dir(path: PathBuf) -> Self {
        Self {
            path,
            kind: ArtifactKind::Dir,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        let result = match self.kind {
            ArtifactKind::File => fs::remove_file(&self.path),
            ArtifactKind::Dir => fs::remove_dir_all(&self.path),
        };
        match result {
            Ok(()) => log::debug!("removed temporary {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("could not remove temporary {}: {e}", self.path.display()),
        }
    }
}

//! jigcut-io: Filesystem and subprocess layer.
//!
//! Runs the external piecemaker cutter, finds and reads its output,
//! copies piece rasters into the output layout, and writes the
//! consolidated `metadata.json`. All pure logic (classification,
//! parsing, assembly) is delegated to `jigcut-pipeline`.

pub mod cleanup;
pub mod collect;
pub mod cutter;
pub mod error;
pub mod locate;
pub mod prepare;
pub mod reader;
pub mod run;
pub mod writer;

pub use cleanup::TempArtifact;
pub use cutter::{CutRequest, Cutter, CutterOutcome, Piecemaker};
pub use error::{RunError, USAGE};
pub use run::{Job, run, work_dir_for};

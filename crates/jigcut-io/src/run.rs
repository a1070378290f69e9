//! One complete cutting run.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use jigcut_pipeline::{CutConfig, MIN_PIECES, PipelineError, PuzzleMetadata, assemble_metadata};

use crate::cleanup::TempArtifact;
use crate::collect::collect_pieces;
use crate::cutter::{CutRequest, Cutter};
use crate::error::RunError;
use crate::locate::locate_tier;
use crate::prepare::prepare_image;
use crate::reader::read_metadata;
use crate::writer::{copy_overlays, reset_output_dir, write_metadata};

/// Everything needed to cut one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Source image path.
    pub image: PathBuf,
    /// Output directory; replaced by the run.
    pub output_dir: PathBuf,
    /// Number of pieces requested from the cutter.
    pub requested_pieces: u32,
    pub config: CutConfig,
}

/// The cutter's working directory for `output_dir`: a sibling named
/// `<output_dir>_temp`.
#[must_use]
pub fn work_dir_for(output_dir: &Path) -> PathBuf {
    // Rebuilding from components drops any trailing separator, which
    // would otherwise put the work dir inside the output dir.
    let normalized: PathBuf = output_dir.components().collect();
    let mut name = OsString::from(normalized.as_os_str());
    name.push("_temp");
    PathBuf::from(name)
}

/// Create an empty cutter working directory, clearing any leftover from
/// an earlier run.
fn fresh_work_dir(path: PathBuf) -> Result<TempArtifact, RunError> {
    if path.exists() {
        fs::remove_dir_all(&path).map_err(|e| RunError::io("remove", &path, &e))?;
    }
    fs::create_dir_all(&path).map_err(|e| RunError::io("create", &path, &e))?;
    Ok(TempArtifact::dir(path))
}

/// Run a cutting job end to end.
///
/// pre-process -> invoke cutter -> locate tier -> read metadata ->
/// replace output dir -> copy pieces -> copy overlays -> write
/// `metadata.json`.
///
/// The output directory is only touched once the cutter output has been
/// located and its metadata validated, so an early failure leaves the
/// previous output in place. The upscaled image and the cutter's
/// working directory are removed on every exit path.
///
/// # Errors
///
/// Any [`RunError`] raised by a stage aborts the run. Missing piece
/// rasters do not; they are reported in the document's `warning`.
pub fn run(job: &Job, cutter: &impl Cutter) -> Result<PuzzleMetadata, RunError> {
    if job.requested_pieces < MIN_PIECES {
        return Err(PipelineError::TooFewPieces(i64::from(job.requested_pieces)).into());
    }
    job.config.validate()?;

    let image = prepare_image(&job.image, job.config.min_long_side)?;
    let work = fresh_work_dir(work_dir_for(&job.output_dir))?;

    let request = CutRequest {
        image: image.path(),
        work_dir: work.path(),
        pieces: job.requested_pieces,
        scaled_size: job.config.scaled_size,
    };
    let started = Instant::now();
    let stdout = cutter.cut(&request)?.into_result()?;
    log::info!("cutter finished in {:.1}s", started.elapsed().as_secs_f64());
    if !stdout.trim().is_empty() {
        log::debug!("cutter stdout: {}", stdout.trim_end());
    }

    let tier_dir = locate_tier(work.path())?;
    let metadata = read_metadata(work.path(), &tier_dir)?;

    let pieces_dir = reset_output_dir(&job.output_dir)?;
    let collected = collect_pieces(
        &metadata,
        &tier_dir,
        &pieces_dir,
        job.config.border_tolerance,
    )?;
    let document = assemble_metadata(
        metadata.image,
        job.requested_pieces,
        collected.pieces,
        &collected.missing,
    )?;

    copy_overlays(work.path(), &job.output_dir)?;
    let metadata_path = write_metadata(&job.output_dir, &document)?;
    log::info!(
        "wrote {} pieces and {}",
        document.piece_count,
        metadata_path.display()
    );

    Ok(document)
}

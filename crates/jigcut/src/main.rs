//! jigcut: cut an image into jigsaw pieces for a client application.
//!
//! Runs piecemaker on the source image, then lays out the pieces and a
//! consolidated `metadata.json` in the output directory. The same
//! metadata is printed to stdout as a single compact JSON line; on
//! failure, stdout carries `{"error": "<message>"}` instead and the
//! exit status is non-zero. Diagnostics go to stderr.
//!
//! # Usage
//!
//! ```text
//! jigcut [OPTIONS] <IMAGE_PATH> <OUTPUT_DIR> <NUM_PIECES>
//! ```

#![allow(clippy::print_stdout)]

use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use env_logger::{Builder, Env};
use jigcut_io::{Job, Piecemaker, RunError, USAGE};
use jigcut_pipeline::{CutConfig, PuzzleMetadata, parse_piece_count};

/// Cut an image into jigsaw pieces with piecemaker and print placement
/// metadata as JSON.
#[derive(Parser)]
#[command(name = "jigcut", version)]
struct Cli {
    /// Source image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Output directory. Replaced on every run.
    output_dir: PathBuf,

    /// Number of pieces to request (at least 2).
    #[arg(allow_hyphen_values = true)]
    num_pieces: String,

    /// piecemaker executable name or path.
    #[arg(long, value_name = "PROGRAM", default_value = CutConfig::DEFAULT_CUTTER_PROGRAM)]
    cutter: String,

    /// Kill piecemaker after this many seconds.
    #[arg(long, value_name = "SECS", default_value_t = CutConfig::DEFAULT_CUTTER_TIMEOUT_SECS, value_parser = clap::builder::RangedU64ValueParser::<u64>::new().range(1..))]
    timeout_secs: u64,

    /// Upscale images whose longer side is below this many pixels.
    #[arg(long, value_name = "PX", default_value_t = CutConfig::DEFAULT_MIN_LONG_SIDE)]
    min_long_side: u32,

    /// Pixel tolerance for a piece side to count as touching the border.
    #[arg(long, value_name = "PX", default_value_t = CutConfig::DEFAULT_BORDER_TOLERANCE)]
    border_tolerance: u32,

    /// Full cut config as a JSON string.
    ///
    /// When provided, the individual config flags are ignored. Missing
    /// fields take their defaults.
    #[arg(long, value_name = "JSON")]
    config_json: Option<String>,

    /// Log more to stderr (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Build a [`CutConfig`] from CLI arguments.
///
/// If `--config-json` is provided it is parsed directly and the
/// individual flags are ignored. Either way the result is validated.
fn config_from_cli(cli: &Cli) -> Result<CutConfig, RunError> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json)
            .map_err(|e| RunError::Usage(format!("Error parsing --config-json: {e}")))?
    } else {
        CutConfig {
            min_long_side: cli.min_long_side,
            border_tolerance: cli.border_tolerance,
            cutter_program: cli.cutter.clone(),
            cutter_timeout_secs: cli.timeout_secs,
            ..CutConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}

fn execute(cli: &Cli) -> Result<PuzzleMetadata, RunError> {
    let requested_pieces = parse_piece_count(&cli.num_pieces)?;
    let config = config_from_cli(cli)?;
    log::debug!("config: {config:?}");

    let cutter = Piecemaker::from_config(&config);
    let job = Job {
        image: cli.image_path.clone(),
        output_dir: cli.output_dir.clone(),
        requested_pieces,
        config,
    };
    jigcut_io::run(&job, &cutter)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

/// Panic report captured by the panic hook for the catch-all error.
static PANIC_REPORT: Mutex<Option<String>> = Mutex::new(None);

fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let report = format!("{info}\n{}", Backtrace::force_capture());
        log::error!("{report}");
        if let Ok(mut slot) = PANIC_REPORT.lock() {
            *slot = Some(report);
        }
    }));
}

fn take_panic_report() -> String {
    PANIC_REPORT
        .lock()
        .ok()
        .and_then(|mut slot| slot.take())
        .unwrap_or_else(|| "panic without report".to_owned())
}

/// Print the failure object and return a failing exit code.
fn report(err: &RunError) -> ExitCode {
    log::error!("{err}");
    println!("{}", serde_json::json!({ "error": err.to_string() }));
    ExitCode::FAILURE
}

/// Render a clap parse failure as a usage error.
fn usage_error(err: &clap::Error) -> RunError {
    let rendered = err.to_string();
    let detail = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ");
    RunError::Usage(format!("{USAGE} ({detail})"))
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => return report(&usage_error(&e)),
    };

    init_logging(cli.verbose);
    install_panic_hook();

    match panic::catch_unwind(AssertUnwindSafe(|| execute(&cli))) {
        Ok(Ok(metadata)) => match serde_json::to_string(&metadata) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => report(&RunError::Unexpected(format!(
                "failed to serialize metadata: {e}"
            ))),
        },
        Ok(Err(e)) => report(&e),
        Err(_) => report(&RunError::Unexpected(take_panic_report())),
    }
}

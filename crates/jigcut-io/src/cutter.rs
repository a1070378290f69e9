//! External cutter invocation.
//!
//! The geometric work is delegated to piecemaker, run as a subprocess
//! with a hard wall-clock timeout. The [`Cutter`] trait is the seam
//! between the run orchestration and the subprocess, so that
//! orchestration can be driven by any implementation that produces a
//! piecemaker-shaped output tree.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use jigcut_pipeline::CutConfig;

use crate::error::RunError;

/// How often a running cutter is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One cutter invocation.
#[derive(Debug, Clone, Copy)]
pub struct CutRequest<'a> {
    /// Image to cut.
    pub image: &'a Path,
    /// Empty directory the cutter writes its output tree into.
    pub work_dir: &'a Path,
    /// Target number of pieces.
    pub pieces: u32,
    /// The single size tier to render, in percent.
    pub scaled_size: u32,
}

/// What happened to a cutter subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CutterOutcome {
    /// Exited with status zero.
    Success {
        stdout: String,
    },
    /// Exited unsuccessfully.
    Failure {
        /// Exit code, or `None` if killed by a signal.
        code: Option<i32>,
        stderr: String,
    },
    /// Killed after exceeding the timeout.
    TimedOut {
        after: Duration,
    },
}

impl CutterOutcome {
    /// Turn a non-success outcome into the matching [`RunError`].
    ///
    /// # Errors
    ///
    /// Returns [`RunError::ToolExecution`] for [`Failure`](Self::Failure)
    /// and [`RunError::Timeout`] for [`TimedOut`](Self::TimedOut).
    pub fn into_result(self) -> Result<String, RunError> {
        match self {
            Self::Success { stdout } => Ok(stdout),
            Self::Failure { code, stderr } => {
                let status = code.map_or_else(
                    || "terminated by signal".to_owned(),
                    |c| format!("exit code {c}"),
                );
                log::warn!("piecemaker exited unsuccessfully ({status})");
                Err(RunError::ToolExecution {
                    status,
                    stderr: stderr.trim().to_owned(),
                })
            }
            Self::TimedOut { after } => Err(RunError::Timeout {
                secs: after.as_secs(),
            }),
        }
    }
}

/// Something that cuts an image into a piecemaker-shaped output tree.
pub trait Cutter {
    /// Run the cutter to completion, failure, or timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::ToolNotFound`] if the cutter cannot be found
    /// and [`RunError::Unexpected`] if it cannot be started or awaited.
    /// Unsuccessful runs are reported through [`CutterOutcome`], not as
    /// errors.
    fn cut(&self, request: &CutRequest<'_>) -> Result<CutterOutcome, RunError>;
}

/// The piecemaker command-line tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piecemaker {
    program: String,
    timeout: Duration,
}

impl Piecemaker {
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &CutConfig) -> Self {
        Self::new(
            config.cutter_program.clone(),
            Duration::from_secs(config.cutter_timeout_secs),
        )
    }

    /// Argument vector for one invocation: full-resolution rendering of a
    /// single size tier.
    #[must_use]
    pub fn args(request: &CutRequest<'_>) -> Vec<OsString> {
        vec![
            "--dir".into(),
            request.work_dir.into(),
            "--number-of-pieces".into(),
            request.pieces.to_string().into(),
            "--scaled-sizes".into(),
            request.scaled_size.to_string().into(),
            "--use-max-size".into(),
            "--trust-image-file".into(),
            request.image.into(),
        ]
    }
}

impl Cutter for Piecemaker {
    fn cut(&self, request: &CutRequest<'_>) -> Result<CutterOutcome, RunError> {
        let args = Self::args(request);
        log::info!("running {} {args:?}", self.program);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => RunError::ToolNotFound {
                    program: self.program.clone(),
                },
                _ => RunError::Unexpected(format!("failed to start {}: {e}", self.program)),
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let started = Instant::now();
        let Some(status) = wait_with_deadline(&mut child, self.timeout)
            .map_err(|e| RunError::Unexpected(format!("failed to wait for {}: {e}", self.program)))?
        else {
            if let Err(e) = child.kill() {
                log::warn!("could not kill timed-out {}: {e}", self.program);
            }
            let _ = child.wait();
            // The pipes may be held open by grandchildren, so the drain
            // threads are left to finish on their own.
            return Ok(CutterOutcome::TimedOut {
                after: self.timeout,
            });
        };
        log::info!(
            "{} exited with {status} after {:.1}s",
            self.program,
            started.elapsed().as_secs_f64()
        );

        let stdout = collect(stdout);
        let stderr = collect(stderr);
        if !stderr.is_empty() {
            log::debug!("{} stderr: {}", self.program, stderr.trim_end());
        }

        if status.success() {
            Ok(CutterOutcome::Success { stdout })
        } else {
            Ok(CutterOutcome::Failure {
                code: status.code(),
                stderr,
            })
        }
    }
}

/// Wait for `child` to exit, giving up after `timeout`.
///
/// Returns `Ok(None)` if the deadline passed first.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// Read a child pipe to the end on a helper thread, so a chatty child
/// cannot block on a full pipe while we poll it.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

//! Conversion entry points: run `pdftotext` and classify how it exited.
//!
//! ## Lifecycle of one call
//!
//! ```text
//! ConversionOptions ─┐
//!                    ├─ 1. compile   args::compile_args (pure)
//! input / output ────┘
//!                      2. check     already cancelled? → Cancelled, no spawn
//!                      3. spawn     tokio::process, stdout piped or null,
//!                                   stderr always piped, kill_on_drop
//!                      4. race      wait + drain pipes  vs  Cancellation
//!                      5. classify  exit 0 → Ok, 1/2/3/other → typed error
//! ```
//!
//! A [`Converter`] holds nothing but the resolved binary path, so one value
//! can serve any number of concurrent calls. Each call owns its own child
//! process and pipe buffers.

use crate::args::{self, STDOUT_SENTINEL};
use crate::cancel::Cancellation;
use crate::config::ConversionOptions;
use crate::error::PdfToTextError;
use pdftotext_locate::{check_explicit, find_executable, PDFTOTEXT};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Exit statuses documented by `pdftotext`.
pub mod exit_code {
    /// Error opening the PDF file.
    pub const PDF_OPEN: i32 = 1;
    /// Error opening the output file.
    pub const OUTPUT_FILE: i32 = 2;
    /// Error related to PDF permissions.
    pub const PERMISSIONS: i32 = 3;
}

/// Handle to a resolved `pdftotext` executable.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdftotext::{Cancellation, ConversionOptions, Converter};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let converter = Converter::new()?;
/// let opts = ConversionOptions::builder().layout(true).encoding("UTF-8").build();
/// let text = converter.convert(&Cancellation::none(), "paper.pdf", &opts).await?;
/// println!("{text}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    binary: PathBuf,
}

impl Converter {
    /// Locate `pdftotext` on `PATH`.
    ///
    /// This is the only lookup: later calls reuse the resolved path, and a
    /// binary removed afterwards surfaces as [`PdfToTextError::Launch`].
    pub fn new() -> Result<Self, PdfToTextError> {
        let binary = find_executable(PDFTOTEXT).map_err(|source| {
            PdfToTextError::BinaryNotFound {
                binary: PDFTOTEXT.to_string(),
                source,
            }
        })?;
        debug!("Resolved pdftotext at {}", binary.display());
        Ok(Self { binary })
    }

    /// Use an explicit executable instead of searching `PATH`.
    pub fn with_binary(path: impl AsRef<Path>) -> Result<Self, PdfToTextError> {
        let path = path.as_ref();
        let binary = check_explicit(path).map_err(|source| PdfToTextError::BinaryNotFound {
            binary: path.display().to_string(),
            source,
        })?;
        Ok(Self { binary })
    }

    /// Absolute path of the executable this converter runs.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// The argument vector a call with these inputs would run.
    ///
    /// `output = None` gives the in-memory form (text on stdout).
    pub fn compile_args(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        options: &ConversionOptions,
    ) -> Vec<OsString> {
        let output = output.unwrap_or(Path::new(STDOUT_SENTINEL));
        args::compile_args(options, input.as_ref(), Some(output))
    }

    /// Convert a PDF and return its text, trimmed of surrounding whitespace.
    ///
    /// Output bytes that are not valid UTF-8 (for a non-UTF-8 `encoding`) are
    /// replaced with U+FFFD; use [`Converter::convert_bytes`] to get them raw.
    pub async fn convert(
        &self,
        cancel: &Cancellation,
        input: impl AsRef<Path>,
        options: &ConversionOptions,
    ) -> Result<String, PdfToTextError> {
        let raw = self.run_to_stdout(cancel, input.as_ref(), options).await?;
        Ok(String::from_utf8_lossy(&raw).trim().to_string())
    }

    /// Convert a PDF and return the raw output bytes, trimmed of ASCII whitespace.
    pub async fn convert_bytes(
        &self,
        cancel: &Cancellation,
        input: impl AsRef<Path>,
        options: &ConversionOptions,
    ) -> Result<Vec<u8>, PdfToTextError> {
        let raw = self.run_to_stdout(cancel, input.as_ref(), options).await?;
        Ok(raw.trim_ascii().to_vec())
    }

    /// Convert a PDF, letting `pdftotext` write the text to `output` itself.
    ///
    /// No atomic rename is attempted: if the call fails or is cancelled, the
    /// output file is left in whatever state the tool left it.
    pub async fn convert_to_file(
        &self,
        cancel: &Cancellation,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        options: &ConversionOptions,
    ) -> Result<(), PdfToTextError> {
        let input = input.as_ref();
        let output = output.as_ref();
        info!("Converting {} → {}", input.display(), output.display());
        let argv = args::compile_args(options, input, Some(output));
        self.run(cancel, argv, false).await?;
        Ok(())
    }

    /// Convert PDF bytes held in memory.
    ///
    /// The bytes are staged in a managed [`tempfile`] that is removed when
    /// the call returns, whatever the outcome.
    pub async fn convert_from_bytes(
        &self,
        cancel: &Cancellation,
        pdf: &[u8],
        options: &ConversionOptions,
    ) -> Result<String, PdfToTextError> {
        let mut tmp = tempfile::Builder::new()
            .prefix("pdftotext-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|source| PdfToTextError::TempFile { source })?;
        tmp.write_all(pdf)
            .and_then(|_| tmp.flush())
            .map_err(|source| PdfToTextError::TempFile { source })?;
        // Close our handle; the path is deleted when `path` drops.
        let path = tmp.into_temp_path();
        self.convert(cancel, &path, options).await
    }

    /// Synchronous wrapper around [`Converter::convert`].
    ///
    /// Creates a private current-thread tokio runtime. Must not be called
    /// from inside an async context.
    pub fn convert_blocking(
        &self,
        input: impl AsRef<Path>,
        options: &ConversionOptions,
    ) -> Result<String, PdfToTextError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PdfToTextError::Internal(format!("Failed to create tokio runtime: {e}")))?
            .block_on(self.convert(&Cancellation::none(), input, options))
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    async fn run_to_stdout(
        &self,
        cancel: &Cancellation,
        input: &Path,
        options: &ConversionOptions,
    ) -> Result<Vec<u8>, PdfToTextError> {
        info!("Converting {}", input.display());
        let argv = args::compile_args(options, input, Some(Path::new(STDOUT_SENTINEL)));
        self.run(cancel, argv, true).await
    }

    /// Spawn the tool, race it against `cancel`, and classify the exit.
    ///
    /// Returns captured stdout (empty when `capture_stdout` is false).
    async fn run(
        &self,
        cancel: &Cancellation,
        argv: Vec<OsString>,
        capture_stdout: bool,
    ) -> Result<Vec<u8>, PdfToTextError> {
        if let Some(reason) = cancel.reason() {
            info!("Conversion {reason} before pdftotext was started");
            return Err(PdfToTextError::Cancelled {
                reason,
                stderr: String::new(),
            });
        }

        debug!(
            binary = %self.binary.display(),
            args = ?args::redact_args(&argv),
            "Spawning pdftotext"
        );
        let start = Instant::now();

        let mut child = Command::new(&self.binary)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(if capture_stdout {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| self.launch_error(source))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let mut out = Vec::new();
        let mut err = Vec::new();

        let outcome = tokio::select! {
            biased;
            reason = cancel.cancelled() => Err(reason),
            res = async {
                tokio::try_join!(child.wait(), drain(stdout, &mut out), drain(stderr, &mut err))
            } => Ok(res),
        };

        let status = match outcome {
            Ok(res) => res.map_err(|source| self.launch_error(source))?.0,
            Err(reason) => {
                // Pipes were dropped with the losing branch; reap the child.
                if let Err(e) = child.kill().await {
                    debug!("kill after cancellation: {e}");
                }
                info!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "pdftotext {reason}, process terminated"
                );
                return Err(PdfToTextError::Cancelled {
                    reason,
                    stderr: String::from_utf8_lossy(&err).into_owned(),
                });
            }
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        if status.success() {
            debug!(elapsed_ms, bytes = out.len(), "pdftotext finished");
            return Ok(out);
        }

        let stderr = String::from_utf8_lossy(&err).into_owned();
        let error = classify_exit(status.code(), stderr);
        warn!(
            code = ?status.code(),
            kind = %error.kind(),
            elapsed_ms,
            "pdftotext failed: {error}"
        );
        Err(error)
    }

    fn launch_error(&self, source: std::io::Error) -> PdfToTextError {
        PdfToTextError::Launch {
            binary: self.binary.clone(),
            source,
        }
    }
}

/// Map a non-zero `pdftotext` exit to its error variant.
///
/// `code` is `None` when the process was killed by a signal. A `Some(0)` is
/// not expected here and is reported as [`PdfToTextError::CommandFailed`].
pub fn classify_exit(code: Option<i32>, stderr: String) -> PdfToTextError {
    match code {
        Some(exit_code::PDF_OPEN) => PdfToTextError::PdfOpen { stderr },
        Some(exit_code::OUTPUT_FILE) => PdfToTextError::OutputFile { stderr },
        Some(exit_code::PERMISSIONS) => PdfToTextError::Permissions { stderr },
        code => PdfToTextError::CommandFailed { code, stderr },
    }
}

/// Read a pipe to EOF into `buf`. A missing pipe leaves `buf` untouched.
///
/// Bytes land in `buf` chunk by chunk, so whatever was read survives if the
/// future is dropped part way.
async fn drain<R>(pipe: Option<R>, buf: &mut Vec<u8>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return Ok(());
    };
    let mut chunk = [0u8; 8192];
    loop {
        let n = pipe.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

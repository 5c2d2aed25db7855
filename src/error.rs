//! Error types for the edgequake-pdftotext library.
//!
//! Failures fall into three groups:
//!
//! * **Environment**: [`PdfToTextError::BinaryNotFound`] is raised once, when
//!   a [`crate::Converter`] is built. No conversion can proceed without it.
//!
//! * **Per-call, exit-code classified**: `pdftotext` documents its exit
//!   statuses, and each one maps to exactly one variant:
//!
//!   | Exit code | Variant |
//!   |-----------|---------|
//!   | 1 | [`PdfToTextError::PdfOpen`] |
//!   | 2 | [`PdfToTextError::OutputFile`] |
//!   | 3 | [`PdfToTextError::Permissions`] |
//!   | other / signal | [`PdfToTextError::CommandFailed`] |
//!
//! * **Per-call, process level**: the subprocess could not be started
//!   ([`PdfToTextError::Launch`]) or the caller cancelled it
//!   ([`PdfToTextError::Cancelled`]).
//!
//! Callers that only care about the category match on [`PdfToTextError::kind`].

use crate::cancel::CancelReason;
use pdftotext_locate::LocateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdftotext library.
#[derive(Debug, Error)]
pub enum PdfToTextError {
    // ── Environment ───────────────────────────────────────────────────────
    /// The `pdftotext` executable could not be resolved.
    #[error(
        "pdftotext binary not found ('{binary}'); install poppler-utils (apt), \
poppler (brew) or xpdf, or pass an explicit path"
    )]
    BinaryNotFound {
        binary: String,
        #[source]
        source: LocateError,
    },

    // ── Exit-code classified ──────────────────────────────────────────────
    /// Exit code 1: the input could not be opened or read as a PDF.
    #[error("error opening PDF file: {}", .stderr.trim())]
    PdfOpen { stderr: String },

    /// Exit code 2: the output file could not be opened or written.
    #[error("error opening output file: {}", .stderr.trim())]
    OutputFile { stderr: String },

    /// Exit code 3: the PDF's permissions forbid text extraction.
    #[error("error related to PDF permissions: {}", .stderr.trim())]
    Permissions { stderr: String },

    /// Any other non-zero exit, or termination by a signal (`code == None`).
    #[error("pdftotext command failed ({}): {}", describe_code(.code), .stderr.trim())]
    CommandFailed { code: Option<i32>, stderr: String },

    // ── Process level ─────────────────────────────────────────────────────
    /// The subprocess could not be spawned or awaited.
    #[error("failed to run pdftotext '{}'", .binary.display())]
    Launch {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The caller's [`crate::Cancellation`] fired before the process finished.
    ///
    /// `stderr` holds what the tool had written before it was killed; it is
    /// empty when the process was never started.
    #[error("conversion {reason}")]
    Cancelled { reason: CancelReason, stderr: String },

    // ── Input / config ────────────────────────────────────────────────────
    /// Could not stage in-memory PDF bytes to a temporary file.
    #[error("failed to write temporary PDF file")]
    TempFile {
        #[source]
        source: std::io::Error,
    },

    /// A textual option value could not be parsed.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Closed set of error categories, one per [`PdfToTextError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BinaryNotFound,
    PdfOpen,
    OutputFile,
    Permissions,
    CommandFailed,
    Launch,
    Cancelled,
    TempFile,
    InvalidOption,
    Internal,
}

impl PdfToTextError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BinaryNotFound { .. } => ErrorKind::BinaryNotFound,
            Self::PdfOpen { .. } => ErrorKind::PdfOpen,
            Self::OutputFile { .. } => ErrorKind::OutputFile,
            Self::Permissions { .. } => ErrorKind::Permissions,
            Self::CommandFailed { .. } => ErrorKind::CommandFailed,
            Self::Launch { .. } => ErrorKind::Launch,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::TempFile { .. } => ErrorKind::TempFile,
            Self::InvalidOption(_) => ErrorKind::InvalidOption,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Diagnostic text captured from the subprocess's standard error, if the
    /// process got far enough to produce any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::PdfOpen { stderr }
            | Self::OutputFile { stderr }
            | Self::Permissions { stderr }
            | Self::CommandFailed { stderr, .. }
            | Self::Cancelled { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::BinaryNotFound => "binary_not_found",
            ErrorKind::PdfOpen => "pdf_open",
            ErrorKind::OutputFile => "output_file",
            ErrorKind::Permissions => "permissions",
            ErrorKind::CommandFailed => "command_failed",
            ErrorKind::Launch => "launch",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::TempFile => "temp_file",
            ErrorKind::InvalidOption => "invalid_option",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_string(),
    }
}

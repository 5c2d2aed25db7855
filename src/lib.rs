//! # edgequake-pdftotext
//!
//! A typed, async wrapper around the `pdftotext` command-line tool (poppler
//! or xpdf).
//!
//! The heavy lifting (PDF parsing, layout analysis, encodings) happens in the
//! external binary. This crate does four things around it:
//!
//! ```text
//! Converter::new()           1. locate pdftotext on PATH (once)
//!  │
//!  ├─ ConversionOptions      2. compile options → ordered argv
//!  ├─ tokio::process         3. run it, stdout → String or tool → file
//!  └─ PdfToTextError         4. exit code + stderr → typed error
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdftotext::{Cancellation, ConversionOptions, Converter, ErrorKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = Converter::new()?;
//!     let options = ConversionOptions::builder()
//!         .layout(true)
//!         .encoding("UTF-8")
//!         .build();
//!
//!     match converter.convert(&Cancellation::none(), "document.pdf", &options).await {
//!         Ok(text) => println!("{text}"),
//!         Err(e) if e.kind() == ErrorKind::PdfOpen => eprintln!("not a readable PDF: {e}"),
//!         Err(e) => return Err(e.into()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2txt` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdftotext = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod args;
pub mod cancel;
pub mod config;
pub mod convert;
pub mod error;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use args::{compile_args, redact_args, STDOUT_SENTINEL};
pub use cancel::{CancelReason, Cancellation};
pub use config::{ConversionOptions, ConversionOptionsBuilder, EndOfLine};
pub use convert::{classify_exit, Converter};
pub use error::{ErrorKind, PdfToTextError};
pub use pdftotext_locate::LocateError;

//! CLI binary for edgequake-pdftotext.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionOptions` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdftotext::{
    compile_args, redact_args, Cancellation, ConversionOptions, Converter, EndOfLine, ErrorKind,
    PdfToTextError, STDOUT_SENTINEL,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Plain text to stdout
  pdf2txt document.pdf

  # Keep the physical layout, UTF-8, pages 2-5, into a file
  pdf2txt --layout --encoding UTF-8 --first-page 2 --last-page 5 paper.pdf -o paper.txt

  # Word bounding boxes as XHTML
  pdf2txt --bbox document.pdf -o boxes.html

  # Encrypted document
  pdf2txt --user-password secret locked.pdf

  # Reuse a saved option set, override one flag
  pdf2txt --options opts.json --eol dos document.pdf

  # Show the pdftotext command line without running it
  pdf2txt --print-args --layout --owner-password x document.pdf

EXIT STATUS:
  0   success
  1   error opening the PDF file
  2   error opening the output file
  3   PDF permissions forbid extraction
  99  any other failure
  130 cancelled (Ctrl-C or --timeout)

ENVIRONMENT VARIABLES:
  PDF2TXT_BINARY          Path to pdftotext (default: search PATH)
  PDF2TXT_OUTPUT          Default output file
  PDF2TXT_OWNER_PASSWORD  Owner password
  PDF2TXT_USER_PASSWORD   User password
  RUST_LOG                Log filter override (e.g. edgequake_pdftotext=debug)

SETUP:
  pdftotext ships with poppler:
    apt install poppler-utils   |   brew install poppler   |   choco install poppler
"#;

/// Extract text from PDF files with pdftotext.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2txt",
    version,
    about = "Extract text from PDF files with pdftotext",
    long_about = "Extract text from PDF documents by driving the pdftotext command-line tool \
(poppler or xpdf). Every pdftotext option is available as a typed flag; failures are reported \
with pdftotext's own exit-status convention.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    input: PathBuf,

    /// Write text to this file instead of stdout.
    #[arg(short, long, env = "PDF2TXT_OUTPUT")]
    output: Option<PathBuf>,

    /// JSON file with a saved option set; explicit flags override it.
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Path to the pdftotext executable.
    #[arg(long, env = "PDF2TXT_BINARY")]
    binary: Option<PathBuf>,

    // ── pdftotext options ────────────────────────────────────────────────
    /// First page to convert.
    #[arg(long, value_name = "N", help_heading = "Conversion")]
    first_page: Option<i32>,

    /// Last page to convert.
    #[arg(long, value_name = "N", help_heading = "Conversion")]
    last_page: Option<i32>,

    /// Resolution in DPI for crop geometry.
    #[arg(long, value_name = "DPI", help_heading = "Conversion")]
    resolution: Option<i32>,

    /// Crop area x-coordinate.
    #[arg(long, value_name = "PX", help_heading = "Conversion")]
    crop_x: Option<i32>,

    /// Crop area y-coordinate.
    #[arg(long, value_name = "PX", help_heading = "Conversion")]
    crop_y: Option<i32>,

    /// Crop area width.
    #[arg(long, value_name = "PX", help_heading = "Conversion")]
    crop_width: Option<i32>,

    /// Crop area height.
    #[arg(long, value_name = "PX", help_heading = "Conversion")]
    crop_height: Option<i32>,

    /// Maintain the original physical layout.
    #[arg(long, help_heading = "Conversion")]
    layout: bool,

    /// Fixed character pitch in points (implies layout).
    #[arg(long, value_name = "PITCH", help_heading = "Conversion")]
    fixed: Option<f64>,

    /// Keep strings in content-stream order.
    #[arg(long, help_heading = "Conversion")]
    raw: bool,

    /// Discard diagonal text.
    #[arg(long, help_heading = "Conversion")]
    no_diagonal: bool,

    /// Generate a simple HTML file with meta information.
    #[arg(long, help_heading = "Conversion")]
    html_meta: bool,

    /// Generate XHTML with word bounding boxes.
    #[arg(long, help_heading = "Conversion")]
    bbox: bool,

    /// Generate XHTML with block/line/word bounding boxes.
    #[arg(long, help_heading = "Conversion")]
    bbox_layout: bool,

    /// Generate TSV with bounding-box information.
    #[arg(long, help_heading = "Conversion")]
    tsv: bool,

    /// Use the crop box rather than the media box.
    #[arg(long, help_heading = "Conversion")]
    crop_box: bool,

    /// Column spacing in multiples of font size.
    #[arg(long, value_name = "SPACING", help_heading = "Conversion")]
    col_spacing: Option<f64>,

    /// Output text encoding (e.g. UTF-8, Latin1).
    #[arg(long, value_name = "NAME", help_heading = "Conversion")]
    encoding: Option<String>,

    /// End-of-line convention.
    #[arg(long, value_enum, help_heading = "Conversion")]
    eol: Option<EolArg>,

    /// Don't insert page breaks between pages.
    #[arg(long, help_heading = "Conversion")]
    no_page_breaks: bool,

    /// Owner password for encrypted files.
    #[arg(
        long,
        env = "PDF2TXT_OWNER_PASSWORD",
        hide_env_values = true,
        help_heading = "Conversion"
    )]
    owner_password: Option<String>,

    /// User password for encrypted files.
    #[arg(
        long,
        env = "PDF2TXT_USER_PASSWORD",
        hide_env_values = true,
        help_heading = "Conversion"
    )]
    user_password: Option<String>,

    /// Pass -q to pdftotext (silences its diagnostics).
    #[arg(long, help_heading = "Conversion")]
    quiet_tool: bool,

    // ── Runner ───────────────────────────────────────────────────────────
    /// Abort the conversion after this many seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the pdftotext argument vector as JSON and exit.
    #[arg(long)]
    print_args: bool,

    /// Disable the spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EolArg {
    Unix,
    Dos,
    Mac,
}

impl From<EolArg> for EndOfLine {
    fn from(v: EolArg) -> Self {
        match v {
            EolArg::Unix => EndOfLine::Unix,
            EolArg::Dos => EndOfLine::Dos,
            EolArg::Mac => EndOfLine::Mac,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.print_args;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", red("✘"));
            ExitCode::from(exit_status(&e))
        }
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    let options = build_options(cli).await?;

    // ── Dry run: no binary needed ───────────────────────────────────────
    if cli.print_args {
        let output = cli.output.as_deref().unwrap_or(Path::new(STDOUT_SENTINEL));
        let argv = compile_args(&options, &cli.input, Some(output));
        println!(
            "{}",
            serde_json::to_string_pretty(&redact_args(&argv))
                .context("Failed to serialise arguments")?
        );
        return Ok(());
    }

    let converter = match cli.binary {
        Some(ref path) => Converter::with_binary(path),
        None => Converter::new(),
    }
    .context("pdftotext is not available")?;

    // ── Cancellation: --timeout and Ctrl-C ───────────────────────────────
    let cancel = match cli.timeout {
        Some(secs) => Cancellation::with_timeout(Duration::from_secs(secs)),
        None => Cancellation::new(),
    };
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let spinner = show_progress.then(|| spinner(&cli.input));
    let start = Instant::now();

    // ── Run conversion ───────────────────────────────────────────────────
    let result = match cli.output {
        Some(ref output_path) => converter
            .convert_to_file(&cancel, &cli.input, output_path, &options)
            .await
            .map(|()| None),
        None => converter
            .convert(&cancel, &cli.input, &options)
            .await
            .map(Some),
    };

    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }
    let text = result.context("Conversion failed")?;
    let elapsed_ms = start.elapsed().as_millis();

    match (text, &cli.output) {
        (Some(text), _) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
            if !cli.quiet && show_progress {
                eprintln!(
                    "{}  {} chars  {}",
                    green("✔"),
                    text.chars().count(),
                    dim(&format!("{elapsed_ms}ms"))
                );
            }
        }
        (None, Some(path)) => {
            if !cli.quiet {
                eprintln!(
                    "{}  {}  →  {}",
                    green("✔"),
                    dim(&format!("{elapsed_ms}ms")),
                    bold(&path.display().to_string()),
                );
            }
        }
        (None, None) => {}
    }

    Ok(())
}

fn spinner(input: &Path) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Converting");
    bar.set_message(input.display().to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Map CLI args onto `ConversionOptions`, starting from `--options` if given.
async fn build_options(cli: &Cli) -> Result<ConversionOptions> {
    let mut o = match cli.options {
        Some(ref path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read options from {:?}", path))?;
            ConversionOptions::from_json(&json)
                .with_context(|| format!("Invalid options file {:?}", path))?
        }
        None => ConversionOptions::default(),
    };

    if let Some(v) = cli.first_page {
        o.first_page = v;
    }
    if let Some(v) = cli.last_page {
        o.last_page = v;
    }
    if let Some(v) = cli.resolution {
        o.resolution = v;
    }
    if let Some(v) = cli.crop_x {
        o.crop_x = v;
    }
    if let Some(v) = cli.crop_y {
        o.crop_y = v;
    }
    if let Some(v) = cli.crop_width {
        o.crop_width = v;
    }
    if let Some(v) = cli.crop_height {
        o.crop_height = v;
    }
    if let Some(v) = cli.fixed {
        o.fixed_pitch = v;
    }
    if let Some(v) = cli.col_spacing {
        o.col_spacing = v;
    }
    if let Some(ref v) = cli.encoding {
        o.encoding = v.clone();
    }
    if let Some(v) = cli.eol {
        o.eol = Some(v.into());
    }
    if let Some(ref v) = cli.owner_password {
        o.owner_password = v.clone();
    }
    if let Some(ref v) = cli.user_password {
        o.user_password = v.clone();
    }

    // Switches can only be turned on from the command line.
    o.layout |= cli.layout;
    o.raw |= cli.raw;
    o.no_diagonal |= cli.no_diagonal;
    o.html_meta |= cli.html_meta;
    o.bbox |= cli.bbox;
    o.bbox_layout |= cli.bbox_layout;
    o.tsv |= cli.tsv;
    o.crop_box |= cli.crop_box;
    o.no_page_breaks |= cli.no_page_breaks;
    o.quiet |= cli.quiet_tool;

    Ok(o)
}

/// Process exit status mirroring pdftotext's own convention.
fn exit_status(err: &anyhow::Error) -> u8 {
    let Some(e) = err.downcast_ref::<PdfToTextError>() else {
        return 99;
    };
    match e.kind() {
        ErrorKind::PdfOpen => 1,
        ErrorKind::OutputFile => 2,
        ErrorKind::Permissions => 3,
        ErrorKind::Cancelled => 130,
        _ => 99,
    }
}

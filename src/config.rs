//! Configuration types for a single `pdftotext` invocation.
//!
//! Every knob the tool exposes lives in [`ConversionOptions`], built via its
//! [`ConversionOptionsBuilder`] or a struct literal over
//! [`ConversionOptions::default()`].
//!
//! # Zero means "unset"
//! Each field's default (`0`, `0.0`, `false`, `""`, `None`) means "do not
//! pass the flag", and the tool falls back to its own default. Values that
//! make no sense (a negative crop width, a NaN column spacing) are treated
//! the same way: they are dropped from the command line, never rejected.

use crate::error::PdfToTextError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Options controlling one `pdftotext` conversion.
///
/// # Example
/// ```rust
/// use edgequake_pdftotext::{ConversionOptions, EndOfLine};
///
/// let opts = ConversionOptions::builder()
///     .pages(1, 3)
///     .layout(true)
///     .encoding("UTF-8")
///     .eol(EndOfLine::Unix)
///     .build();
/// assert_eq!(opts.first_page, 1);
/// ```
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    // ── Page range ───────────────────────────────────────────────────────
    /// First page to convert (1-indexed). `-f`
    pub first_page: i32,
    /// Last page to convert (1-indexed, inclusive). `-l`
    pub last_page: i32,

    /// Resolution in DPI used for crop geometry; the tool defaults to 72. `-r`
    pub resolution: i32,

    // ── Crop area, in pixels at `resolution` ─────────────────────────────
    /// `-x`
    pub crop_x: i32,
    /// `-y`
    pub crop_y: i32,
    /// `-W`
    pub crop_width: i32,
    /// `-H`
    pub crop_height: i32,

    // ── Layout / rendering mode ──────────────────────────────────────────
    /// Keep the physical layout of the page. `-layout`
    pub layout: bool,
    /// Fixed character pitch in points, implies layout. `-fixed`
    pub fixed_pitch: f64,
    /// Keep text in content-stream order. `-raw`
    pub raw: bool,
    /// Discard diagonal text. `-nodiag`
    pub no_diagonal: bool,
    /// Emit a simple HTML file with meta information. `-htmlmeta`
    pub html_meta: bool,
    /// Emit XHTML with word bounding boxes. `-bbox`
    pub bbox: bool,
    /// Emit XHTML with block/line/word bounding boxes. `-bbox-layout`
    pub bbox_layout: bool,
    /// Emit TSV with bounding-box information. `-tsv`
    pub tsv: bool,
    /// Use the crop box instead of the media box. `-cropbox`
    pub crop_box: bool,
    /// Column spacing in multiples of font size; the tool defaults to 0.7. `-colspacing`
    pub col_spacing: f64,

    // ── Text output ──────────────────────────────────────────────────────
    /// Output text encoding name, e.g. `UTF-8`, `Latin1`. `-enc`
    pub encoding: String,
    /// End-of-line convention. `-eol`
    pub eol: Option<EndOfLine>,
    /// Do not insert form feeds between pages. `-nopgbrk`
    pub no_page_breaks: bool,

    // ── Access ───────────────────────────────────────────────────────────
    /// Owner password for encrypted documents. `-opw`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub owner_password: String,
    /// User password for encrypted documents. `-upw`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_password: String,

    /// Suppress the tool's own messages and errors. `-q`
    pub quiet: bool,
}

impl fmt::Debug for ConversionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOptions")
            .field("first_page", &self.first_page)
            .field("last_page", &self.last_page)
            .field("resolution", &self.resolution)
            .field("crop_x", &self.crop_x)
            .field("crop_y", &self.crop_y)
            .field("crop_width", &self.crop_width)
            .field("crop_height", &self.crop_height)
            .field("layout", &self.layout)
            .field("fixed_pitch", &self.fixed_pitch)
            .field("raw", &self.raw)
            .field("no_diagonal", &self.no_diagonal)
            .field("html_meta", &self.html_meta)
            .field("bbox", &self.bbox)
            .field("bbox_layout", &self.bbox_layout)
            .field("tsv", &self.tsv)
            .field("crop_box", &self.crop_box)
            .field("col_spacing", &self.col_spacing)
            .field("encoding", &self.encoding)
            .field("eol", &self.eol)
            .field("no_page_breaks", &self.no_page_breaks)
            .field("owner_password", &redact(&self.owner_password))
            .field("user_password", &redact(&self.user_password))
            .field("quiet", &self.quiet)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "***"
    }
}

impl ConversionOptions {
    /// Create a new builder for `ConversionOptions`.
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Parse options from a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, PdfToTextError> {
        serde_json::from_str(json).map_err(|e| PdfToTextError::InvalidOption(e.to_string()))
    }
}

/// Builder for [`ConversionOptions`].
#[derive(Debug)]
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptionsBuilder {
    pub fn first_page(mut self, page: i32) -> Self {
        self.options.first_page = page;
        self
    }

    pub fn last_page(mut self, page: i32) -> Self {
        self.options.last_page = page;
        self
    }

    /// Set both ends of the page range at once.
    pub fn pages(self, first: i32, last: i32) -> Self {
        self.first_page(first).last_page(last)
    }

    pub fn resolution(mut self, dpi: i32) -> Self {
        self.options.resolution = dpi;
        self
    }

    /// Crop area: top-left corner and size, in pixels at `resolution`.
    pub fn crop(mut self, x: i32, y: i32, width: i32, height: i32) -> Self {
        self.options.crop_x = x;
        self.options.crop_y = y;
        self.options.crop_width = width;
        self.options.crop_height = height;
        self
    }

    pub fn layout(mut self, v: bool) -> Self {
        self.options.layout = v;
        self
    }

    pub fn fixed_pitch(mut self, pitch: f64) -> Self {
        self.options.fixed_pitch = pitch;
        self
    }

    pub fn raw(mut self, v: bool) -> Self {
        self.options.raw = v;
        self
    }

    pub fn no_diagonal(mut self, v: bool) -> Self {
        self.options.no_diagonal = v;
        self
    }

    pub fn html_meta(mut self, v: bool) -> Self {
        self.options.html_meta = v;
        self
    }

    pub fn bbox(mut self, v: bool) -> Self {
        self.options.bbox = v;
        self
    }

    pub fn bbox_layout(mut self, v: bool) -> Self {
        self.options.bbox_layout = v;
        self
    }

    pub fn tsv(mut self, v: bool) -> Self {
        self.options.tsv = v;
        self
    }

    pub fn crop_box(mut self, v: bool) -> Self {
        self.options.crop_box = v;
        self
    }

    pub fn col_spacing(mut self, spacing: f64) -> Self {
        self.options.col_spacing = spacing;
        self
    }

    pub fn encoding(mut self, enc: impl Into<String>) -> Self {
        self.options.encoding = enc.into();
        self
    }

    pub fn eol(mut self, eol: EndOfLine) -> Self {
        self.options.eol = Some(eol);
        self
    }

    pub fn no_page_breaks(mut self, v: bool) -> Self {
        self.options.no_page_breaks = v;
        self
    }

    pub fn owner_password(mut self, pwd: impl Into<String>) -> Self {
        self.options.owner_password = pwd.into();
        self
    }

    pub fn user_password(mut self, pwd: impl Into<String>) -> Self {
        self.options.user_password = pwd.into();
        self
    }

    pub fn quiet(mut self, v: bool) -> Self {
        self.options.quiet = v;
        self
    }

    /// Finish building. Never fails: out-of-range values are simply omitted
    /// from the command line later.
    pub fn build(self) -> ConversionOptions {
        self.options
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// End-of-line convention for the text output (`-eol`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndOfLine {
    /// `\n`
    Unix,
    /// `\r\n`
    Dos,
    /// `\r`
    Mac,
}

impl EndOfLine {
    /// The literal value passed to `-eol`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EndOfLine::Unix => "unix",
            EndOfLine::Dos => "dos",
            EndOfLine::Mac => "mac",
        }
    }
}

impl fmt::Display for EndOfLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndOfLine {
    type Err = PdfToTextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unix" => Ok(EndOfLine::Unix),
            "dos" => Ok(EndOfLine::Dos),
            "mac" => Ok(EndOfLine::Mac),
            other => Err(PdfToTextError::InvalidOption(format!(
                "unknown end-of-line convention '{other}' (expected unix, dos or mac)"
            ))),
        }
    }
}

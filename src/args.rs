//! Compile [`ConversionOptions`] into the argument vector passed to `pdftotext`.
//!
//! The compiler is a static table of rules evaluated top to bottom. Each
//! rule pairs a flag literal with a typed accessor that decides whether the
//! flag is emitted and, for valued flags, renders the value. The table order
//! *is* the command-line order, and that order is part of the public contract:
//! tests and log scrapers match on it.
//!
//! The input path always follows the flags; the output path (or the
//! [`STDOUT_SENTINEL`]) comes last when present.

use crate::config::ConversionOptions;
use std::ffi::OsString;
use std::path::Path;

/// Output path understood by `pdftotext` as "write to standard output".
pub const STDOUT_SENTINEL: &str = "-";

const REDACTED: &str = "***";

/// How a rule turns options into arguments.
#[derive(Clone, Copy)]
enum Emit {
    /// Presence-only flag, emitted when the accessor returns `true`.
    Switch(fn(&ConversionOptions) -> bool),
    /// Flag followed by one value, emitted when the accessor returns `Some`.
    Value(fn(&ConversionOptions) -> Option<String>),
}

#[derive(Clone, Copy)]
struct Rule {
    flag: &'static str,
    emit: Emit,
}

static RULES: [Rule; 23] = [
    // Page range
    value("-f", |o| positive_int(o.first_page)),
    value("-l", |o| positive_int(o.last_page)),
    value("-r", |o| positive_int(o.resolution)),
    // Crop geometry
    value("-x", |o| positive_int(o.crop_x)),
    value("-y", |o| positive_int(o.crop_y)),
    value("-W", |o| positive_int(o.crop_width)),
    value("-H", |o| positive_int(o.crop_height)),
    // Layout / rendering mode
    switch("-layout", |o| o.layout),
    value("-fixed", |o| positive_float(o.fixed_pitch)),
    switch("-raw", |o| o.raw),
    switch("-nodiag", |o| o.no_diagonal),
    switch("-htmlmeta", |o| o.html_meta),
    switch("-bbox", |o| o.bbox),
    switch("-bbox-layout", |o| o.bbox_layout),
    switch("-tsv", |o| o.tsv),
    switch("-cropbox", |o| o.crop_box),
    value("-colspacing", |o| positive_float(o.col_spacing)),
    // Text output
    value("-enc", |o| non_empty(&o.encoding)),
    value("-eol", |o| o.eol.map(|e| e.as_str().to_string())),
    switch("-nopgbrk", |o| o.no_page_breaks),
    // Access
    value("-opw", |o| non_empty(&o.owner_password)),
    value("-upw", |o| non_empty(&o.user_password)),
    switch("-q", |o| o.quiet),
];

const fn switch(flag: &'static str, is_set: fn(&ConversionOptions) -> bool) -> Rule {
    Rule {
        flag,
        emit: Emit::Switch(is_set),
    }
}

const fn value(flag: &'static str, render: fn(&ConversionOptions) -> Option<String>) -> Rule {
    Rule {
        flag,
        emit: Emit::Value(render),
    }
}

/// Flags whose value must never appear in logs.
static SECRET_FLAGS: [&str; 2] = ["-opw", "-upw"];

/// Build the full `pdftotext` argument vector.
///
/// `output` is appended only when it is `Some` and non-empty. Pass
/// `Some(Path::new(STDOUT_SENTINEL))` to have the text written to stdout.
///
/// Never fails: values that do not pass a rule's predicate are omitted.
pub fn compile_args(
    options: &ConversionOptions,
    input: &Path,
    output: Option<&Path>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(8);

    for rule in &RULES {
        match rule.emit {
            Emit::Switch(is_set) => {
                if is_set(options) {
                    args.push(rule.flag.into());
                }
            }
            Emit::Value(value) => {
                if let Some(v) = value(options) {
                    args.push(rule.flag.into());
                    args.push(v.into());
                }
            }
        }
    }

    args.push(input.as_os_str().to_os_string());
    if let Some(out) = output.filter(|p| !p.as_os_str().is_empty()) {
        args.push(out.as_os_str().to_os_string());
    }
    args
}

/// Printable copy of `args` with password values replaced by `***`.
pub fn redact_args(args: &[OsString]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        let s = arg.to_string_lossy();
        if hide_next {
            out.push(REDACTED.to_string());
            hide_next = false;
            continue;
        }
        hide_next = SECRET_FLAGS.contains(&&*s);
        out.push(s.into_owned());
    }
    out
}

/// Shortest decimal form that round-trips, with no exponent: `12.0` → `"12"`,
/// `0.7` → `"0.7"`.
pub fn format_number(v: f64) -> String {
    format!("{v}")
}

// ── Predicates ───────────────────────────────────────────────────────────

fn positive_int(v: i32) -> Option<String> {
    (v > 0).then(|| v.to_string())
}

fn positive_float(v: f64) -> Option<String> {
    (v.is_finite() && v > 0.0).then(|| format_number(v))
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndOfLine;

    fn strs(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    fn compile(o: &ConversionOptions, out: Option<&str>) -> Vec<String> {
        strs(&compile_args(o, Path::new("in.pdf"), out.map(Path::new)))
    }

    fn with(set: impl FnOnce(&mut ConversionOptions)) -> ConversionOptions {
        let mut o = ConversionOptions::default();
        set(&mut o);
        o
    }

    fn everything() -> ConversionOptions {
        ConversionOptions {
            first_page: 1,
            last_page: 2,
            resolution: 150,
            crop_x: 3,
            crop_y: 4,
            crop_width: 5,
            crop_height: 6,
            layout: true,
            fixed_pitch: 12.0,
            raw: true,
            no_diagonal: true,
            html_meta: true,
            bbox: true,
            bbox_layout: true,
            tsv: true,
            crop_box: true,
            col_spacing: 0.7,
            encoding: "UTF-8".into(),
            eol: Some(EndOfLine::Dos),
            no_page_breaks: true,
            owner_password: "owner pw".into(),
            user_password: "user".into(),
            quiet: true,
        }
    }

    #[test]
    fn unset_options_yield_only_paths() {
        let o = ConversionOptions::default();
        assert_eq!(compile(&o, Some("out.txt")), ["in.pdf", "out.txt"]);
        assert_eq!(compile(&o, None), ["in.pdf"]);
    }

    #[test]
    fn empty_output_path_is_omitted() {
        let o = ConversionOptions::default();
        assert_eq!(compile(&o, Some("")), ["in.pdf"]);
    }

    #[test]
    fn non_positive_and_non_finite_values_are_omitted() {
        let o = ConversionOptions {
            first_page: -1,
            last_page: 0,
            resolution: -72,
            crop_x: -3,
            crop_y: 0,
            crop_width: -100,
            crop_height: i32::MIN,
            fixed_pitch: -1.5,
            col_spacing: f64::NAN,
            ..Default::default()
        };
        assert_eq!(compile(&o, Some("-")), ["in.pdf", "-"]);

        let o = ConversionOptions {
            fixed_pitch: f64::INFINITY,
            col_spacing: 0.0,
            ..Default::default()
        };
        assert_eq!(compile(&o, Some("-")), ["in.pdf", "-"]);
    }

    #[test]
    fn full_vector_matches_documented_order() {
        let expected = [
            "-f", "1", "-l", "2", "-r", "150", "-x", "3", "-y", "4", "-W", "5", "-H", "6",
            "-layout", "-fixed", "12", "-raw", "-nodiag", "-htmlmeta", "-bbox", "-bbox-layout",
            "-tsv", "-cropbox", "-colspacing", "0.7", "-enc", "UTF-8", "-eol", "dos", "-nopgbrk",
            "-opw", "owner pw", "-upw", "user", "-q", "in.pdf", "-",
        ];
        assert_eq!(compile(&everything(), Some("-")), expected);
    }

    #[test]
    fn each_flag_alone_appears_once_before_input() {
        let cases: Vec<(ConversionOptions, &[&str])> = vec![
            (with(|o| o.first_page = 7), &["-f", "7"]),
            (with(|o| o.last_page = 9), &["-l", "9"]),
            (with(|o| o.resolution = 300), &["-r", "300"]),
            (with(|o| o.crop_height = 11), &["-H", "11"]),
            (with(|o| o.layout = true), &["-layout"]),
            (with(|o| o.tsv = true), &["-tsv"]),
            (with(|o| o.col_spacing = 1.25), &["-colspacing", "1.25"]),
            (with(|o| o.eol = Some(EndOfLine::Mac)), &["-eol", "mac"]),
            (with(|o| o.user_password = "user".into()), &["-upw", "user"]),
            (with(|o| o.quiet = true), &["-q"]),
        ];

        for (opts, flag_args) in cases {
            let got = compile(&opts, Some("out.txt"));
            let mut expected: Vec<&str> = flag_args.to_vec();
            expected.extend(["in.pdf", "out.txt"]);
            assert_eq!(got, expected, "options: {opts:?}");
            assert_eq!(got.iter().filter(|a| *a == flag_args[0]).count(), 1);
        }
    }

    #[test]
    fn numeric_formatting_is_minimal() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(0.7), "0.7");
        assert_eq!(format_number(300.0), "300");
        assert_eq!(format_number(1.0e21), "1000000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn passwords_are_literal_argv_entries() {
        let o = ConversionOptions {
            owner_password: "p@ss word; rm -rf /".into(),
            ..Default::default()
        };
        assert_eq!(compile(&o, None), ["-opw", "p@ss word; rm -rf /", "in.pdf"]);
    }

    #[test]
    fn redaction_hides_only_password_values() {
        let args = compile_args(&everything(), Path::new("in.pdf"), Some(Path::new("-")));
        let shown = redact_args(&args);
        assert_eq!(shown.len(), args.len());
        assert!(!shown.iter().any(|a| a == "owner pw" || a == "user"));
        let opw = shown.iter().position(|a| a == "-opw").unwrap();
        assert_eq!(shown[opw + 1], "***");
        assert_eq!(shown.last().map(String::as_str), Some("-"));
    }
}

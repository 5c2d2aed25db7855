//! # pdftotext-locate
//!
//! Resolve the absolute path of an external executable (by default
//! `pdftotext`) from the process search path, the same way a shell would.
//!
//! ## How it works
//!
//! 1. If the requested name contains a path separator it is treated as a
//!    path and checked directly.
//! 2. Otherwise every absolute entry of `PATH` is visited in order and
//!    `{entry}/{name}{EXE_SUFFIX}` is checked.
//! 3. The first candidate that is a regular file with an executable bit
//!    (Unix) wins.
//!
//! Relative `PATH` entries (`.`, `bin`, empty segments) are skipped so the
//! result never depends on the current working directory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pdftotext_locate::{find_executable, PDFTOTEXT};
//!
//! let path = find_executable(PDFTOTEXT).expect("pdftotext not installed");
//! println!("using {}", path.display());
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Name of the poppler / xpdf text extraction tool.
pub const PDFTOTEXT: &str = "pdftotext";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by executable lookup.
#[derive(Error, Debug)]
pub enum LocateError {
    /// `PATH` is unset, so there is nothing to search.
    #[error("cannot search for '{name}': PATH is not set")]
    NoSearchPath { name: String },

    /// No directory on the search path holds an executable with this name.
    #[error("'{name}' not found in any of {searched} PATH entries")]
    NotFound { name: String, searched: usize },

    /// The name was an explicit path but it is missing or not executable.
    #[error("'{}' is not an executable file", .path.display())]
    NotExecutable { path: PathBuf },
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Find `name` on the current process's `PATH`.
pub fn find_executable(name: &str) -> Result<PathBuf, LocateError> {
    if has_separator(name) {
        return check_explicit(Path::new(name));
    }
    let search_path = std::env::var_os("PATH").ok_or_else(|| LocateError::NoSearchPath {
        name: name.to_string(),
    })?;
    find_executable_in(name, &search_path)
}

/// Find `name` on an explicit search path (same syntax as `PATH`).
pub fn find_executable_in(name: &str, search_path: &OsStr) -> Result<PathBuf, LocateError> {
    if has_separator(name) {
        return check_explicit(Path::new(name));
    }

    let file_name = executable_name(name);
    let mut searched = 0;

    for dir in std::env::split_paths(search_path) {
        if !dir.is_absolute() {
            continue;
        }
        searched += 1;
        let candidate = dir.join(&file_name);
        if is_executable(&candidate) {
            return Ok(candidate);
        }
    }

    Err(LocateError::NotFound {
        name: name.to_string(),
        searched,
    })
}

/// Check a caller-supplied path and make it absolute.
pub fn check_explicit(path: &Path) -> Result<PathBuf, LocateError> {
    if !is_executable(path) {
        return Err(LocateError::NotExecutable {
            path: path.to_path_buf(),
        });
    }
    std::path::absolute(path).map_err(|_| LocateError::NotExecutable {
        path: path.to_path_buf(),
    })
}

/// Platform file name for an executable, e.g. `pdftotext.exe` on Windows.
pub fn executable_name(name: &str) -> String {
    let suffix = std::env::consts::EXE_SUFFIX;
    if suffix.is_empty() || name.ends_with(suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

/// `true` when `path` is a regular file the current user may execute.
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn has_separator(name: &str) -> bool {
    name.contains('/') || (cfg!(windows) && name.contains('\\'))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn touch(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(executable_name(name));
        std::fs::write(&path, b"").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        }
        #[cfg(not(unix))]
        let _ = mode;
        path
    }

    fn search_path(dirs: &[&Path]) -> OsString {
        std::env::join_paths(dirs).unwrap()
    }

    #[test]
    fn finds_first_match_in_order() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        touch(b.path(), "tool", 0o755);
        let expected = touch(a.path(), "tool", 0o755);

        let found = find_executable_in("tool", &search_path(&[a.path(), b.path()])).unwrap();
        assert_eq!(found, expected);
        assert!(found.is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn skips_files_without_exec_bit() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        touch(a.path(), "tool", 0o644);
        let expected = touch(b.path(), "tool", 0o700);

        let found = find_executable_in("tool", &search_path(&[a.path(), b.path()])).unwrap();
        assert_eq!(found, expected);
    }

    #[test]
    fn skips_directories_with_matching_name() {
        let a = tempfile::tempdir().unwrap();
        std::fs::create_dir(a.path().join(executable_name("tool"))).unwrap();

        let err = find_executable_in("tool", &search_path(&[a.path()])).unwrap_err();
        assert!(matches!(err, LocateError::NotFound { searched: 1, .. }), "got {err:?}");
    }

    #[test]
    fn relative_entries_are_not_searched() {
        let err = find_executable_in("definitely-not-a-real-tool", OsStr::new("relative/bin"))
            .unwrap_err();
        match err {
            LocateError::NotFound { name, searched } => {
                assert_eq!(name, "definitely-not-a-real-tool");
                assert_eq!(searched, 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn explicit_path_is_checked_directly() {
        let a = tempfile::tempdir().unwrap();
        let tool = touch(a.path(), "tool", 0o755);
        let name = tool.to_str().unwrap();

        let found = find_executable_in(name, OsStr::new("")).unwrap();
        assert_eq!(found, tool);

        let missing = a.path().join("missing");
        let err = find_executable(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, LocateError::NotExecutable { .. }));
    }

    #[test]
    fn not_found_message_names_the_tool() {
        let err = LocateError::NotFound {
            name: PDFTOTEXT.into(),
            searched: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("pdftotext"), "got: {msg}");
        assert!(msg.contains('4'), "got: {msg}");
    }
}

//! Path and file-name helpers for nbacross
//!
//! ~/.config/nbacross/          # or $NBACROSS_HOME
//! └── config.toml              # Global defaults
//!
//! ./nbacross.toml              # Project config
//! ./failed_<stamp>.hoa         # Written by the driver
//! ./stats_<stamp>.csv          # Written by the driver

use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Project config file looked up in the current directory
pub const PROJECT_CONFIG: &str = "nbacross.toml";

/// Get the global nbacross directory, if one can be determined
pub fn nbacross_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("NBACROSS_HOME") {
        return Some(PathBuf::from(home));
    }
    dirs::config_dir().map(|dir| dir.join("nbacross"))
}

/// Get the global config file path (<nbacross dir>/config.toml)
pub fn global_config_file() -> Option<PathBuf> {
    nbacross_dir().map(|dir| dir.join("config.toml"))
}

/// Timestamp embedded in output file names, e.g. `20240131-235959`
pub fn run_stamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y%m%d-%H%M%S").to_string()
}

/// Bug report file (`failed_<stamp>.hoa`)
pub fn bogus_file(dir: Option<&Path>, stamp: &str) -> PathBuf {
    in_dir(dir, format!("failed_{}.hoa", stamp))
}

/// Statistics file (`stats_<stamp>.csv`)
pub fn stats_file(dir: Option<&Path>, stamp: &str) -> PathBuf {
    in_dir(dir, format!("stats_{}.csv", stamp))
}

fn in_dir(dir: Option<&Path>, name: String) -> PathBuf {
    match dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Whether a program name refers to a path rather than something on PATH
pub fn is_path_like(program: &str) -> bool {
    program.contains('/') || program.contains(MAIN_SEPARATOR)
}

/// Resolve a program relative to `base`.
///
/// Path-like names are joined to `base` (absolute paths pass through) and
/// must exist; bare names are looked up on PATH.
pub fn resolve_program(program: &str, base: &Path) -> Option<PathBuf> {
    if is_path_like(program) {
        let path = base.join(program);
        if !path.is_file() {
            return None;
        }
        return Some(std::fs::canonicalize(&path).unwrap_or(path));
    }

    which::which(program).ok()
}

/// Anchor a path-like program at `base`; bare names are left for PATH lookup
pub fn anchor_program(program: &str, base: &Path) -> PathBuf {
    if is_path_like(program) {
        base.join(program)
    } else {
        PathBuf::from(program)
    }
}

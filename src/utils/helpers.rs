//! Helpers for rgscope.
//!
//! - Color parsing from names or hex codes into crossterm colors
//! - Resolving the search executable through `PATH`
//! - Resolving the search root to an absolute directory
//! - Displaying home directories as "~" in paths

use crossterm::style::Color;
use std::ffi::OsString;
use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Parses a string (color name or hex) into a crossterm color.
///
/// Supports standard names (red, green, etc.) as well as hex values (#RRGGBB or #RGB)
pub fn parse_color(s: &str) -> Color {
    match s.to_lowercase().as_str() {
        "default" | "reset" => Color::Reset,
        "yellow" => Color::Yellow,
        "red" => Color::Red,
        "blue" => Color::Blue,
        "green" => Color::Green,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "black" => Color::Black,
        "gray" | "grey" => Color::Grey,
        "darkgray" | "darkgrey" => Color::DarkGrey,
        _ => {
            if let Some(color) = s.strip_prefix('#') {
                let expanded = match color.len() {
                    6 => Some(color.to_string()),
                    3 => Some(color.chars().flat_map(|c| [c, c]).collect::<String>()),
                    _ => None,
                };
                if let Some(rgb) = expanded.and_then(|hex| u32::from_str_radix(&hex, 16).ok()) {
                    return Color::Rgb {
                        r: ((rgb >> 16) & 0xFF) as u8,
                        g: ((rgb >> 8) & 0xFF) as u8,
                        b: (rgb & 0xFF) as u8,
                    };
                }
            }
            // fallback
            Color::Reset
        }
    }
}

pub fn get_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Find the search executable.
///
/// Names are looked up on `PATH` with the which crate. Paths (anything with a separator) are
/// taken as given. When the lookup fails the name is returned unchanged so the launch reports
/// the real OS error.
pub fn resolve_search_binary(configured: &str) -> OsString {
    if configured.contains(['/', '\\']) {
        return OsString::from(configured);
    }
    match which::which(configured) {
        Ok(path) => path.into_os_string(),
        Err(e) => {
            tracing::warn!(binary = configured, error = %e, "search binary not found on PATH");
            OsString::from(configured)
        }
    }
}

/// Turn a user supplied root into an absolute, existing directory.
pub fn resolve_root(arg: &str) -> io::Result<PathBuf> {
    let path = if arg.trim().is_empty() {
        std::env::current_dir()?
    } else if let Some(rest) = arg.strip_prefix('~')
        && let Some(home) = get_home()
    {
        home.join(rest.trim_start_matches(['/', '\\']))
    } else {
        PathBuf::from(arg)
    };

    let canonical = path.canonicalize()?;
    if !canonical.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("'{}' is not a directory", path.display()),
        ));
    }
    Ok(readable_path(canonical))
}

/// Util function to shorten home directory to ~.
pub fn shorten_home_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    if let Some(home_dir) = get_home()
        && let Ok(stripped) = path.strip_prefix(&home_dir)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        } else {
            let mut short = stripped.display().to_string();
            if short.starts_with(MAIN_SEPARATOR) {
                short.remove(0);
            }
            return format!("~{}{}", MAIN_SEPARATOR, short);
        }
    }
    path.display().to_string()
}

/// Drops the verbatim prefix Windows adds to canonical paths. Other paths pass through
/// untouched, including ones that are not valid UTF-8.
pub fn readable_path(path: PathBuf) -> PathBuf {
    #[cfg(windows)]
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix(r"\\?\")) {
        return PathBuf::from(rest);
    }
    path
}

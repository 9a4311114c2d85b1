//! Pre-open checks for matched files.
//!
//! Opening a huge or binary file from a result list can stall a viewer, so front ends ask
//! [check_open] first and confirm with the user when it returns [OpenCheck::Warn].

use humansize::{DECIMAL, format_size};
use phf::phf_set;

use std::fs;
use std::io;
use std::path::Path;

/// Files above this size trigger a warning.
pub const LARGE_FILE_BYTES: u64 = 1024 * 1024;

static BINARY_EXTENSIONS: phf::Set<&'static str> = phf_set! {
    "apk", "dex", "so", "jar", "zip", "class", "png", "jpg",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarnReason {
    /// Extension, lowercased.
    Binary(String),
    Large,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenCheck {
    Clear,
    Warn { reason: WarnReason, size: u64 },
}

impl OpenCheck {
    /// Confirmation text for a warning, `None` when the file is fine to open.
    pub fn message(&self) -> Option<String> {
        let OpenCheck::Warn { reason, size } = self else {
            return None;
        };
        let kind = match reason {
            WarnReason::Binary(ext) => format!("This is a BINARY file (.{}).", ext),
            WarnReason::Large => "This is a LARGE file.".to_string(),
        };
        Some(format!(
            "{}\nSize: {}\n\nOpening this might cause lag. Proceed?",
            kind,
            format_size(*size, DECIMAL)
        ))
    }
}

/// Inspect `path` before opening it.
///
/// A binary extension wins over size when both apply.
pub fn check_open(path: &Path) -> io::Result<OpenCheck> {
    let meta = fs::metadata(path)?;
    if !meta.is_file() {
        return Err(io::Error::other(format!(
            "'{}' is not a regular file",
            path.display()
        )));
    }
    let size = meta.len();

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if BINARY_EXTENSIONS.contains(ext.as_str()) {
        return Ok(OpenCheck::Warn {
            reason: WarnReason::Binary(ext),
            size,
        });
    }
    if size > LARGE_FILE_BYTES {
        return Ok(OpenCheck::Warn {
            reason: WarnReason::Large,
            size,
        });
    }
    Ok(OpenCheck::Clear)
}

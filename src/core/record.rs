//! Match records produced by the result stream parser.
//!
//! A [MatchRecord] is immutable once decoded. It is owned by the batch that carries it and is
//! then handed over to whatever consumes the session.

use std::path::{Path, PathBuf};

/// Shown instead of a matched line that is empty after trimming, which is what the search tool
/// reports for matches inside binary files.
pub const BLANK_LINE_PLACEHOLDER: &str = "[Binary match or empty line]";

/// Byte span of one submatch inside [MatchRecord::content].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
}

impl Highlight {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A span is usable only if it is non-empty, inside `text`, and on char boundaries.
    /// Spans failing this are dropped by every renderer, never clamped.
    pub fn fits(&self, text: &str) -> bool {
        self.start < self.end
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end)
    }
}

impl From<(usize, usize)> for Highlight {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

/// One match reported by the search tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    file_path: PathBuf,
    line_number: u64,
    content: String,
    highlights: Vec<Highlight>,
}

/// A line prepared for display: leading indentation removed and highlights moved along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine<'a> {
    pub text: &'a str,
    pub highlights: Vec<Highlight>,
}

impl MatchRecord {
    /// Create a record. Trailing whitespace (including the line terminator) is stripped from
    /// `content`.
    pub fn new(
        file_path: impl Into<PathBuf>,
        line_number: u64,
        content: &str,
        highlights: Vec<Highlight>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            line_number,
            content: content.trim_end().to_string(),
            highlights,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// 1-based line number, or 0 when the tool did not report one.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Highlights exactly as reported, including ones that may not fit [Self::content].
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Highlights that fit the content. Out of range spans are skipped.
    pub fn valid_highlights(&self) -> impl Iterator<Item = Highlight> + '_ {
        self.highlights
            .iter()
            .copied()
            .filter(|h| h.fits(&self.content))
    }

    /// Path relative to `root` with forward slashes, or the full path if it lies elsewhere.
    pub fn relative_path(&self, root: &Path) -> String {
        let rel = self.file_path.strip_prefix(root).unwrap_or(&self.file_path);
        let rel = rel.to_string_lossy();
        let rel = rel.trim_start_matches(['/', '\\']);
        #[cfg(windows)]
        {
            rel.replace('\\', "/")
        }
        #[cfg(not(windows))]
        {
            rel.to_string()
        }
    }

    /// The matched line without its indentation, highlights shifted to match.
    ///
    /// Blank lines become [BLANK_LINE_PLACEHOLDER] with no highlights.
    pub fn display_line(&self) -> DisplayLine<'_> {
        let text = self.content.trim_start();
        if text.is_empty() {
            return DisplayLine {
                text: BLANK_LINE_PLACEHOLDER,
                highlights: Vec::new(),
            };
        }

        let shift = self.content.len() - text.len();
        let highlights = self
            .highlights
            .iter()
            .map(|h| Highlight::new(h.start.saturating_sub(shift), h.end.saturating_sub(shift)))
            .filter(|h| h.fits(text))
            .collect();
        DisplayLine { text, highlights }
    }
}

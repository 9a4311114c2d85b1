//! Line rendering of match records.
//!
//! Each match is printed as `relative/path:line: text` with its submatches highlighted.
//! Highlights that do not fit the (possibly clipped) text are skipped, never stretched.

use crate::config::Display;
use crate::core::{Highlight, MatchRecord};

use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, PrintStyledContent, Stylize};
use unicode_width::UnicodeWidthChar;

use std::io::{self, Write};
use std::path::Path;

/// Colors used for one output stream. Disabled styles print plain text only.
#[derive(Debug, Clone, Copy)]
pub struct Styles {
    enabled: bool,
    path: Color,
    line: Color,
    highlight: Color,
}

impl Styles {
    pub fn plain() -> Self {
        Self {
            enabled: false,
            path: Color::Reset,
            line: Color::Reset,
            highlight: Color::Reset,
        }
    }

    pub fn from_display(display: &Display, enabled: bool) -> Self {
        Self {
            enabled: enabled && display.color(),
            path: display.path_color(),
            line: display.line_color(),
            highlight: display.highlight_color(),
        }
    }
}

/// Longest prefix of `text` that fits in `width` terminal columns.
pub fn clip_to_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            return &text[..idx];
        }
        used += w;
    }
    text
}

/// Replace ASCII control characters (tabs included) with spaces. Byte offsets are preserved.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_control() { ' ' } else { c })
        .collect()
}

/// Write one match. `width` of `None` disables clipping; `eol` is `"\r\n"` in raw mode.
pub fn render_match<W: Write>(
    out: &mut W,
    record: &MatchRecord,
    root: &Path,
    styles: &Styles,
    width: Option<usize>,
    eol: &str,
) -> io::Result<()> {
    let rel = record.relative_path(root);
    let line_no = record.line_number().to_string();
    let prefix_cols = rel.chars().count() + line_no.len() + 3;

    let display = record.display_line();
    let text = sanitize(display.text);
    let text = match width {
        Some(w) => clip_to_width(&text, w.saturating_sub(prefix_cols)),
        None => &text,
    };

    let mut spans: Vec<Highlight> = display
        .highlights
        .into_iter()
        .filter(|h| h.fits(text))
        .collect();
    spans.sort_by_key(|h| h.start);

    if styles.enabled {
        queue!(
            out,
            PrintStyledContent(rel.as_str().with(styles.path)),
            Print(":"),
            PrintStyledContent(line_no.as_str().with(styles.line)),
            Print(": ")
        )?;
    } else {
        queue!(out, Print(&rel), Print(":"), Print(&line_no), Print(": "))?;
    }

    let mut cursor = 0;
    for span in spans {
        // overlapping submatches: keep the first
        if span.start < cursor {
            continue;
        }
        queue!(out, Print(&text[cursor..span.start]))?;
        let hit = &text[span.start..span.end];
        if styles.enabled {
            queue!(
                out,
                PrintStyledContent(hit.with(styles.highlight).attribute(Attribute::Bold))
            )?;
        } else {
            queue!(out, Print(hit))?;
        }
        cursor = span.end;
    }
    queue!(out, Print(&text[cursor..]), Print(eol))?;
    Ok(())
}

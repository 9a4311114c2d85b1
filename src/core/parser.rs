//! Incremental decoder for the search tool's JSON Lines output.
//!
//! Every line is decoded on its own. Lines that are not JSON, events other than `match`
//! (`begin`, `end`, `context`, `summary`, ...) and records missing their `data` payload are
//! skipped without error, because the merged output stream legitimately carries all of them.
//! Only an I/O failure of the underlying reader ends the sequence early.

use crate::core::record::{Highlight, MatchRecord};

use serde::Deserialize;
use std::io::{self, BufRead};

/// The size of the buffered reader wrapped around the process output.
pub const BUFREADER_SIZE: usize = 32768;

/// Path reported when a match carries no decodable path.
const UNKNOWN_PATH: &str = "??";

// Wire shapes. Every field is optional so one missing piece never drops the whole record.

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: Option<String>,
    data: Option<RawMatch>,
}

#[derive(Deserialize)]
struct RawMatch {
    path: Option<RawText>,
    line_number: Option<u64>,
    lines: Option<RawText>,
    submatches: Option<Vec<RawSubmatch>>,
}

#[derive(Deserialize)]
struct RawText {
    text: Option<String>,
}

#[derive(Deserialize)]
struct RawSubmatch {
    start: Option<usize>,
    end: Option<usize>,
}

/// Decode one output line into a match, or `None` if the line is not a usable match event.
pub fn decode_line(line: &str) -> Option<MatchRecord> {
    let event: RawEvent = match serde_json::from_str(line) {
        Ok(event) => event,
        Err(e) => {
            tracing::trace!(error = %e, "skipping undecodable output line");
            return None;
        }
    };

    if event.kind.as_deref() != Some("match") {
        return None;
    }
    let data = event.data?;

    let path = data
        .path
        .and_then(|p| p.text)
        .unwrap_or_else(|| UNKNOWN_PATH.to_string());
    let content = data.lines.and_then(|l| l.text).unwrap_or_default();
    let highlights = data
        .submatches
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| Some(Highlight::new(s.start?, s.end?)))
        .collect();

    Some(MatchRecord::new(
        path,
        data.line_number.unwrap_or(0),
        &content,
        highlights,
    ))
}

/// Lazy sequence of [MatchRecord] decoded from a line oriented reader.
///
/// Yields `Err` at most once, when the reader fails, and is fused afterwards.
/// One parser belongs to one session and cannot be restarted.
pub struct ResultStreamParser<R> {
    reader: R,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> ResultStreamParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(512),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for ResultStreamParser<R> {
    type Item = io::Result<MatchRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            // Raw bytes: stderr shares the stream and may not be UTF-8.
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&self.buf);
                    if let Some(record) = decode_line(line.trim_end()) {
                        return Some(Ok(record));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

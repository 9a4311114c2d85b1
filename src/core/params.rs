//! Search parameter snapshots and their translation into a search command line.
//!
//! A [SearchParameters] value is a frozen copy of everything the user configured for one run.
//! Editing a filter produces a new value (see the `with_*` methods), so a snapshot handed to a
//! session never changes underneath it.

use crate::core::error::SearchError;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Immutable snapshot of a search configuration.
///
/// Equality is field-wise and is what the staleness check in
/// [SessionStateTracker](crate::core::SessionStateTracker) relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchParameters {
    query: String,
    root_path: PathBuf,
    globs: Vec<String>,
    case_insensitive: bool,
    include_hidden: bool,
    regex_mode: bool,
}

impl SearchParameters {
    pub fn new(query: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            query: query.into(),
            root_path: root_path.into(),
            ..Self::default()
        }
    }

    // Getters / Accessors

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn globs(&self) -> &[String] {
        &self.globs
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    pub fn regex_mode(&self) -> bool {
        self.regex_mode
    }

    /// True when the query has at least one non-whitespace character.
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// The glob filter as the user would type it back, e.g. `*.rs, *.toml`.
    pub fn glob_text(&self) -> String {
        self.globs.join(", ")
    }

    // Edits. Each one consumes the snapshot and returns the edited copy.

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_root_path(mut self, root_path: impl Into<PathBuf>) -> Self {
        self.root_path = root_path.into();
        self
    }

    /// Replace the glob filters from a comma separated list.
    pub fn with_globs(mut self, globs: &str) -> Self {
        self.globs = parse_globs(globs);
        self
    }

    pub fn without_globs(mut self) -> Self {
        self.globs.clear();
        self
    }

    pub fn with_case_insensitive(mut self, on: bool) -> Self {
        self.case_insensitive = on;
        self
    }

    pub fn with_include_hidden(mut self, on: bool) -> Self {
        self.include_hidden = on;
        self
    }

    pub fn with_regex_mode(mut self, on: bool) -> Self {
        self.regex_mode = on;
        self
    }

    /// Build the argument vector for the search executable.
    ///
    /// Flags always come in the same order and the vector always ends with
    /// `[query, root_path]`. The arguments are meant for [std::process::Command::args]
    /// and are never joined into a shell string.
    ///
    /// # Errors
    /// [SearchError::InvalidParameters] if the query is blank.
    pub fn to_args(&self) -> Result<Vec<OsString>, SearchError> {
        if !self.has_query() {
            return Err(SearchError::invalid("query must not be blank"));
        }

        let mut args: Vec<OsString> = Vec::with_capacity(6 + self.globs.len() * 2);
        args.push(OsString::from("--json"));
        if self.case_insensitive {
            args.push(OsString::from("-i"));
        }
        if self.include_hidden {
            args.push(OsString::from("-uuu"));
        }
        if !self.regex_mode {
            args.push(OsString::from("-F"));
        }
        for glob in &self.globs {
            args.push(OsString::from("-g"));
            args.push(OsString::from(glob));
        }
        args.push(OsString::from(&self.query));
        args.push(self.root_path.clone().into_os_string());
        Ok(args)
    }
}

/// Split a comma separated glob list, trimming each entry and dropping empty ones.
///
/// # Examples
/// `parse_globs("a, ,b,,c")` gives `["a", "b", "c"]`.
pub fn parse_globs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .map(str::to_owned)
        .collect()
}

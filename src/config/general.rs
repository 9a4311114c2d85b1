//! The general configuration settings for rgscope.
//!
//! This module defines the [General] struct for deserializing the `[general]` table of
//! rgscope.toml and the [InternalGeneral] struct used at runtime.
//!
//! It holds the search executable and the default filters applied when the command line does
//! not override them.

use crate::core::{SearchParameters, parse_globs};

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct General {
    binary: String,
    case_insensitive: bool,
    include_hidden: bool,
    regex: bool,
    globs: String,
}

impl Default for General {
    fn default() -> Self {
        General {
            binary: "rg".to_string(),
            case_insensitive: false,
            include_hidden: false,
            regex: false,
            globs: String::new(),
        }
    }
}

#[derive(Debug)]
pub struct InternalGeneral {
    binary: String,
    case_insensitive: bool,
    include_hidden: bool,
    regex: bool,
    globs: Vec<String>,
}

impl From<General> for InternalGeneral {
    fn from(g: General) -> Self {
        let binary = if g.binary.trim().is_empty() {
            General::default().binary
        } else {
            g.binary.trim().to_string()
        };
        Self {
            binary,
            case_insensitive: g.case_insensitive,
            include_hidden: g.include_hidden,
            regex: g.regex,
            globs: parse_globs(&g.globs),
        }
    }
}

impl InternalGeneral {
    #[inline]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    #[inline]
    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    #[inline]
    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    #[inline]
    pub fn regex(&self) -> bool {
        self.regex
    }

    #[inline]
    pub fn globs(&self) -> &[String] {
        &self.globs
    }

    /// Parameters seeded with the configured defaults for `query` under `root`.
    pub fn parameters(&self, query: &str, root: impl Into<PathBuf>) -> SearchParameters {
        SearchParameters::new(query, root)
            .with_globs(&self.globs.join(","))
            .with_case_insensitive(self.case_insensitive)
            .with_include_hidden(self.include_hidden)
            .with_regex_mode(self.regex)
    }
}

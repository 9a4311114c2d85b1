//! Miscellaneous utility functions for rgscope.
//!
//! This module holds the [cli] submodule for argument parsing and the [helpers] submodule,
//! which provides commonly used utilities such as:
//! - Color parsing
//! - Locating the search executable
//! - Resolving the search root
//! - Shortening the home directory path to "~"

pub mod cli;
pub mod helpers;

pub use helpers::{
    get_home, parse_color, readable_path, resolve_root, resolve_search_binary, shorten_home_path,
};

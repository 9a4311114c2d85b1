//! Display configuration options for rgscope
//!
//! This module defines the `[display]` table read from the rgscope.toml configuration file.
//! Colors are kept as strings and parsed with [parse_color] when the output is styled.

use crate::utils::parse_color;

use crossterm::style::Color;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Display {
    color: bool,
    path_color: String,
    line_color: String,
    highlight_color: String,
    max_width: usize,
}

impl Default for Display {
    fn default() -> Self {
        Display {
            color: true,
            path_color: "cyan".to_string(),
            line_color: "green".to_string(),
            highlight_color: "red".to_string(),
            max_width: 0,
        }
    }
}

impl Display {
    pub fn color(&self) -> bool {
        self.color
    }

    pub fn path_color(&self) -> Color {
        parse_color(&self.path_color)
    }

    pub fn line_color(&self) -> Color {
        parse_color(&self.line_color)
    }

    pub fn highlight_color(&self) -> Color {
        parse_color(&self.highlight_color)
    }

    /// Column limit for printed lines. `None` means "use the terminal width".
    pub fn max_width(&self) -> Option<usize> {
        (self.max_width > 0).then_some(self.max_width)
    }
}

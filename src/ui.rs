//! Terminal output for rgscope.
//!
//! - [render]: formats match records as highlighted, width-clipped lines.

pub mod render;

pub use render::{Styles, clip_to_width, render_match};

//! Application state for rgscope front ends.
//!
//! - [search_state]: the [SearchSurface] owning parameters, staleness tracking, the current
//!   session and its results.

pub mod search_state;

pub use search_state::{ResultBuffer, SearchSurface};

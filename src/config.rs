//! Configuration for rgscope.
//!
//! - [general]: search executable and default filters (`[general]`).
//! - [display]: output styling (`[display]`).
//! - [log]: log level and log file switch (`[log]`).
//! - [load]: locating, parsing and generating `rgscope.toml`.

pub mod display;
pub mod general;
pub mod load;
pub mod log;

pub use display::Display;
pub use general::{General, InternalGeneral};
pub use load::{Config, ConfigError, RawConfig};
pub use log::LogConfig;

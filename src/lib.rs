//! Library crate for rgscope.
//!
//! The shipped application is the `rgs` binary (`src/main.rs`).
//!
//! The search session controller lives in [core]; [app] holds the long-lived search surface
//! that front ends drive. The library is shared by the binary and the integration tests.

pub mod app;
pub mod config;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;

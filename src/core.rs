//! Core runtime logic for rgscope.
//!
//! This module contains the non-UI "engine" pieces:
//! - [params]: immutable search parameter snapshots and command construction.
//! - [record]: match records and their display helpers.
//! - [parser]: tolerant decoding of the search tool's JSON Lines output.
//! - [session]: the search session state machine, its reader thread and batching.
//! - [tracker]: staleness tracking between edited and submitted parameters.
//! - [preflight]: checks before opening a matched file.
//! - [error]: the search error taxonomy.
//! - [terminal]: the raw-mode terminal loop used by the `rgs` binary.

pub mod error;
pub mod params;
pub mod parser;
pub mod preflight;
pub mod record;
pub mod session;
pub mod terminal;
pub mod tracker;

pub use error::SearchError;
pub use params::{SearchParameters, parse_globs};
pub use parser::{ResultStreamParser, decode_line};
pub use preflight::{OpenCheck, WarnReason, check_open};
pub use record::{DisplayLine, Highlight, MatchRecord};
pub use session::{BATCH_SIZE, SearchSession, SessionSink, SessionState};
pub use tracker::{SessionStateTracker, should_show_submit_affordance};

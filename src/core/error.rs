//! Error taxonomy for search sessions.
//!
//! Only [SearchError::InvalidParameters] and the terminal failure variants are meant to reach
//! the user. Skipped output lines and cancelling an already finished session are not errors
//! and never produce a value of this type.

use crate::core::session::SessionState;

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Rejected before any process was spawned (blank query, unusable root path).
    #[error("invalid search parameters: {0}")]
    InvalidParameters(String),

    /// `start` was called on a session that already left the idle state.
    #[error("session cannot be started from the {0} state")]
    AlreadyStarted(SessionState),

    /// The search executable could not be launched.
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Reading the merged output of a running search failed.
    #[error("failed to read search output: {0}")]
    StreamIo(#[source] io::Error),
}

impl SearchError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameters(reason.into())
    }

    /// Whether retrying with the same environment can possibly succeed.
    ///
    /// Launch failures point at the environment (missing or non-executable binary),
    /// so callers should present them as final.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Spawn { .. })
    }
}

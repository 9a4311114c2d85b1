//! Staleness tracking between edited and submitted search parameters.
//!
//! The tracker only remembers what was last handed to a session. It is updated when a session
//! is submitted, never while the user edits, so editing during a run cannot change what the
//! displayed results belong to.

use crate::core::params::SearchParameters;

/// Whether the run/stop control should be offered to the user.
///
/// Always while a search runs (so it can be stopped). Otherwise only for a non-blank query
/// that differs from the parameters of the last submitted run.
pub fn should_show_submit_affordance(
    edited: &SearchParameters,
    last_applied: Option<&SearchParameters>,
    running: bool,
) -> bool {
    running || (edited.has_query() && last_applied != Some(edited))
}

#[derive(Debug, Default, Clone)]
pub struct SessionStateTracker {
    last_applied: Option<SearchParameters>,
}

impl SessionStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parameters of the last submitted session, `None` before the first run.
    pub fn last_applied(&self) -> Option<&SearchParameters> {
        self.last_applied.as_ref()
    }

    /// Record `params` as submitted. Pass exactly what was given to the session's `start`.
    pub fn on_session_submitted(&mut self, params: SearchParameters) {
        self.last_applied = Some(params);
    }

    /// Edited parameters differ from what the displayed results were produced with.
    pub fn is_dirty(&self, edited: &SearchParameters) -> bool {
        self.last_applied.as_ref() != Some(edited)
    }

    pub fn should_show_submit_affordance(&self, edited: &SearchParameters, running: bool) -> bool {
        should_show_submit_affordance(edited, self.last_applied(), running)
    }
}

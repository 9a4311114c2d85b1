//! Long-lived search state for one search surface.
//!
//! [SearchSurface] owns the edited parameters, the staleness tracker, the current session and
//! (through the session's [ResultBuffer]) the results on display. Views come and go; they only
//! read from the surface and call its actions.

use crate::core::{
    MatchRecord, SearchError, SearchParameters, SearchSession, SessionSink, SessionState,
    SessionStateTracker,
};

use std::ffi::OsString;
use std::time::Duration;

/// Session sink that keeps every delivered match for display.
#[derive(Debug, Default)]
pub struct ResultBuffer {
    matches: Vec<MatchRecord>,
    batches: u64,
    last_state: Option<SessionState>,
}

impl ResultBuffer {
    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn batches(&self) -> u64 {
        self.batches
    }

    pub fn last_state(&self) -> Option<SessionState> {
        self.last_state
    }
}

impl SessionSink for ResultBuffer {
    fn on_batch(&mut self, _seq: u64, matches: Vec<MatchRecord>) {
        self.batches += 1;
        self.matches.extend(matches);
    }

    fn on_state_change(&mut self, state: SessionState) {
        self.last_state = Some(state);
    }
}

pub struct SearchSurface {
    program: OsString,
    edited: SearchParameters,
    tracker: SessionStateTracker,
    session: Option<SearchSession<ResultBuffer>>,
    error: Option<String>,
}

impl SearchSurface {
    pub fn new(program: impl Into<OsString>, initial: SearchParameters) -> Self {
        Self {
            program: program.into(),
            edited: initial,
            tracker: SessionStateTracker::new(),
            session: None,
            error: None,
        }
    }

    // Getters / Accessors

    pub fn edited(&self) -> &SearchParameters {
        &self.edited
    }

    pub fn tracker(&self) -> &SessionStateTracker {
        &self.tracker
    }

    pub fn session(&self) -> Option<&SearchSession<ResultBuffer>> {
        self.session.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Idle, SearchSession::state)
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Matches of the current (or last) run, in tool order.
    pub fn results(&self) -> &[MatchRecord] {
        self.session
            .as_ref()
            .map(|s| s.sink().matches())
            .unwrap_or_default()
    }

    /// Last error surfaced to the user, cleared on the next submit.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Glob filter the displayed results were produced with, if any.
    pub fn active_filter(&self) -> Option<String> {
        self.tracker
            .last_applied()
            .filter(|p| !p.globs().is_empty())
            .map(SearchParameters::glob_text)
    }

    /// Whether the run/stop control should be offered.
    pub fn show_submit(&self) -> bool {
        self.tracker
            .should_show_submit_affordance(&self.edited, self.is_running())
    }

    /// Replace the edited parameters. Never touches the running session or the tracker.
    pub fn edit(&mut self, f: impl FnOnce(SearchParameters) -> SearchParameters) {
        let current = std::mem::take(&mut self.edited);
        self.edited = f(current);
    }

    /// Start a search with the edited parameters.
    ///
    /// Returns `Ok(false)` without doing anything for a blank query. Previous results are
    /// dropped. The exact snapshot handed to the session becomes the tracker's last applied
    /// parameters.
    pub fn submit(&mut self) -> Result<bool, SearchError> {
        if !self.edited.has_query() {
            return Ok(false);
        }
        if self.is_running() {
            return Err(SearchError::AlreadyStarted(SessionState::Running));
        }

        self.error = None;
        // The old run goes away even when this one is rejected before launch.
        self.session = None;
        let snapshot = self.edited.clone();
        let mut session = SearchSession::new(self.program.clone(), ResultBuffer::default());
        let started = session.start(&snapshot);

        if session.state() != SessionState::Idle {
            self.tracker.on_session_submitted(snapshot);
            self.session = Some(session);
        }

        match started {
            Ok(()) => Ok(true),
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Stop the running search. `false` if nothing was running.
    pub fn stop(&mut self) -> bool {
        self.session.as_mut().is_some_and(SearchSession::cancel)
    }

    /// The run/stop control: stops a running search, otherwise submits.
    pub fn toggle(&mut self) -> Result<bool, SearchError> {
        if self.stop() {
            return Ok(true);
        }
        self.submit()
    }

    /// Drop the glob filters and run again right away.
    pub fn clear_filter(&mut self) -> Result<bool, SearchError> {
        if self.is_running() {
            return Err(SearchError::AlreadyStarted(SessionState::Running));
        }
        self.edit(SearchParameters::without_globs);
        self.submit()
    }

    /// Deliver whatever the running session has produced so far.
    pub fn tick(&mut self) -> Result<usize, SearchError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(0);
        };
        session.poll().inspect_err(|e| self.error = Some(e.to_string()))
    }

    /// Like [Self::tick], waiting up to `timeout` for the next delivery.
    pub fn tick_timeout(&mut self, timeout: Duration) -> Result<usize, SearchError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(0);
        };
        session
            .poll_timeout(timeout)
            .inspect_err(|e| self.error = Some(e.to_string()))
    }

    /// Block until the running session ends.
    pub fn wait(&mut self) -> Result<SessionState, SearchError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(SessionState::Idle);
        };
        session.wait().inspect_err(|e| self.error = Some(e.to_string()))
    }

    pub fn status_line(&self) -> String {
        let count = self.results().len();
        match self.state() {
            SessionState::Running => format!("Searching... {} matches", count),
            SessionState::Failed => format!(
                "Search failed: {}",
                self.error
                    .as_deref()
                    .or(self.session.as_ref().and_then(|s| s.failure()))
                    .unwrap_or("unknown error")
            ),
            SessionState::Idle if self.error.is_some() => format!(
                "Cannot search: {}",
                self.error.as_deref().unwrap_or_default()
            ),
            SessionState::Cancelled if count > 0 => format!("Found {} matches (stopped)", count),
            _ if count > 0 => format!("Found {} matches", count),
            _ if self.tracker.last_applied().is_some() => "No matches found.".to_string(),
            _ => "Ready to search".to_string(),
        }
    }
}

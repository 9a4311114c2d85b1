//! Search sessions: one external search process, streamed in batches.
//!
//! A [SearchSession] owns the child process for its whole running life. A dedicated reader
//! thread owns the read end of the merged stdout/stderr pipe, decodes it with
//! [ResultStreamParser] and sends frozen batches of [BATCH_SIZE] matches over a single
//! channel. The owning thread drains that channel with [SearchSession::poll] (or
//! [SearchSession::wait]) and hands batches to its [SessionSink] in the order they were
//! produced.
//!
//! # Caution:
//! Cancellation is immediate on the session side. Once [SearchSession::cancel] returns the
//! state is [SessionState::Cancelled] and nothing else reaches the sink, even if the reader
//! thread is still draining the dying process.

use crate::core::error::SearchError;
use crate::core::params::SearchParameters;
use crate::core::parser::{BUFREADER_SIZE, ResultStreamParser};
use crate::core::record::MatchRecord;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, BufRead, BufReader, PipeReader};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Number of matches collected before a batch is handed to the consumer.
pub const BATCH_SIZE: usize = 10;

/// Lifecycle of a [SearchSession].
///
/// `Idle -> Running -> {Completed | Cancelled | Failed}`. The last three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Consumer of a session's output.
///
/// Called only from the thread that owns the session, never from the reader thread.
pub trait SessionSink {
    /// A batch of matches, in tool order. `seq` starts at 0 and grows by one per batch.
    fn on_batch(&mut self, seq: u64, matches: Vec<MatchRecord>);

    fn on_state_change(&mut self, _state: SessionState) {}
}

/// Collects every delivered match, in order.
impl SessionSink for Vec<MatchRecord> {
    fn on_batch(&mut self, _seq: u64, matches: Vec<MatchRecord>) {
        self.extend(matches);
    }
}

/// Messages from the reader thread to the owning session.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    Batch { seq: u64, matches: Vec<MatchRecord> },
    Finished,
    Failed(io::Error),
}

/// Owns one invocation of the search executable.
pub struct SearchSession<S: SessionSink> {
    program: OsString,
    sink: S,
    state: SessionState,
    child: Option<Child>,
    events: Option<Receiver<SessionEvent>>,
    reader: Option<JoinHandle<()>>,
    cancel: Arc<AtomicBool>,
    next_seq: u64,
    match_count: usize,
    failure: Option<String>,
}

impl<S: SessionSink> SearchSession<S> {
    /// Create an idle session that will run `program` and report to `sink`.
    pub fn new(program: impl Into<OsString>, sink: S) -> Self {
        Self {
            program: program.into(),
            sink,
            state: SessionState::Idle,
            child: None,
            events: None,
            reader: None,
            cancel: Arc::new(AtomicBool::new(false)),
            next_seq: 0,
            match_count: 0,
            failure: None,
        }
    }

    // Getters / Accessors

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Matches delivered to the sink so far.
    pub fn match_count(&self) -> usize {
        self.match_count
    }

    /// Batches delivered to the sink so far.
    pub fn batch_count(&self) -> u64 {
        self.next_seq
    }

    /// Description of the failure that moved the session to [SessionState::Failed].
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Launch the search for `params`.
    ///
    /// Valid only from [SessionState::Idle]. Parameter problems are reported before anything
    /// is spawned and leave the session idle. A launch failure moves it to
    /// [SessionState::Failed].
    pub fn start(&mut self, params: &SearchParameters) -> Result<(), SearchError> {
        if self.state != SessionState::Idle {
            return Err(SearchError::AlreadyStarted(self.state));
        }

        let args = params.to_args()?;
        if !params.root_path().is_dir() {
            return Err(SearchError::invalid(format!(
                "'{}' is not a directory",
                params.root_path().display()
            )));
        }

        tracing::debug!(
            program = %self.program.to_string_lossy(),
            ?args,
            "starting search"
        );

        let (child, pipe) = match spawn_merged(&self.program, &args) {
            Ok(spawned) => spawned,
            Err(source) => return Err(self.fail_launch(source)),
        };
        self.child = Some(child);

        let (tx, rx) = unbounded::<SessionEvent>();
        let cancel = Arc::clone(&self.cancel);
        let spawned = thread::Builder::new()
            .name("rgscope-reader".into())
            .spawn(move || {
                let reader = BufReader::with_capacity(BUFREADER_SIZE, pipe);
                pump(reader, &cancel, &tx);
            });

        match spawned {
            Ok(handle) => {
                self.reader = Some(handle);
                self.events = Some(rx);
                self.set_state(SessionState::Running);
                Ok(())
            }
            Err(source) => {
                self.kill_child();
                Err(self.fail_launch(source))
            }
        }
    }

    /// Deliver every event that is already waiting, without blocking.
    ///
    /// Returns the number of matches delivered by this call. A read failure of the running
    /// search is returned once, as [SearchError::StreamIo], together with the move to
    /// [SessionState::Failed].
    pub fn poll(&mut self) -> Result<usize, SearchError> {
        let mut delivered = 0;
        while self.is_running() {
            let Some(events) = &self.events else { break };
            let event = match events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => lost_reader(),
            };
            delivered += self.handle(event)?;
        }
        Ok(delivered)
    }

    /// Like [Self::poll], but waits up to `timeout` for the first event.
    pub fn poll_timeout(&mut self, timeout: Duration) -> Result<usize, SearchError> {
        let Some(events) = self.events.as_ref().filter(|_| self.is_running()) else {
            return Ok(0);
        };
        let first = match events.recv_timeout(timeout) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => return Ok(0),
            Err(RecvTimeoutError::Disconnected) => lost_reader(),
        };
        let delivered = self.handle(first)?;
        Ok(delivered + self.poll()?)
    }

    /// Block until the session reaches a terminal state, delivering everything on the way.
    pub fn wait(&mut self) -> Result<SessionState, SearchError> {
        while self.is_running() {
            let Some(events) = &self.events else { break };
            let event = events.recv().unwrap_or_else(|_| lost_reader());
            self.handle(event)?;
        }
        Ok(self.state)
    }

    /// Stop a running search.
    ///
    /// Kills the process (errors ignored), drops whatever has not been delivered yet and moves
    /// to [SessionState::Cancelled] before returning. Returns `false` and does nothing when the
    /// session is not running.
    pub fn cancel(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.teardown();
        tracing::debug!(delivered = self.match_count, "search cancelled");
        self.set_state(SessionState::Cancelled);
        true
    }

    fn handle(&mut self, event: SessionEvent) -> Result<usize, SearchError> {
        match event {
            SessionEvent::Batch { seq, matches } => {
                debug_assert_eq!(seq, self.next_seq, "batches must arrive in order");
                self.next_seq = seq + 1;
                let len = matches.len();
                self.match_count += len;
                self.sink.on_batch(seq, matches);
                Ok(len)
            }
            SessionEvent::Finished => {
                self.reap();
                tracing::debug!(
                    matches = self.match_count,
                    batches = self.next_seq,
                    "search completed"
                );
                self.set_state(SessionState::Completed);
                Ok(0)
            }
            SessionEvent::Failed(e) => {
                tracing::warn!(error = %e, "search output failed");
                self.teardown();
                self.failure = Some(e.to_string());
                self.set_state(SessionState::Failed);
                Err(SearchError::StreamIo(e))
            }
        }
    }

    fn fail_launch(&mut self, source: io::Error) -> SearchError {
        let program = self.program.to_string_lossy().into_owned();
        tracing::warn!(%program, error = %source, "failed to launch search");
        self.failure = Some(format!("failed to launch '{}': {}", program, source));
        self.set_state(SessionState::Failed);
        SearchError::Spawn { program, source }
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.sink.on_state_change(state);
    }

    /// Normal end of output: the process is exiting on its own.
    fn reap(&mut self) {
        self.events = None;
        if let Some(mut child) = self.child.take() {
            // Exit status is not interpreted. The tool exits non-zero when nothing matched.
            match child.wait() {
                Ok(status) => tracing::debug!(%status, "search process exited"),
                Err(e) => tracing::debug!(error = %e, "failed to reap search process"),
            }
        }
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }

    /// Forced end: stop the reader from flushing, kill the process, forget pending events.
    fn teardown(&mut self) {
        self.cancel.store(true, Ordering::Release);
        self.events = None;
        self.kill_child();
        // Detach the reader. It exits on its own once the pipe closes.
        self.reader = None;
    }

    fn kill_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl<S: SessionSink> Drop for SearchSession<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Spawn `program` with stdout and stderr sharing one pipe.
fn spawn_merged(program: &OsStr, args: &[OsString]) -> io::Result<(Child, PipeReader)> {
    let (reader, writer) = io::pipe()?;
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer);
    let child = cmd.spawn()?;
    // The command still holds our copies of the write end. Dropping it lets EOF through.
    drop(cmd);
    Ok((child, reader))
}

fn lost_reader() -> SessionEvent {
    SessionEvent::Failed(io::Error::other("search reader stopped unexpectedly"))
}

/// Body of the reader thread: decode `reader` and send batches until the stream ends.
///
/// Nothing is sent once `cancel` is set, not even the partial batch.
pub(crate) fn pump<R: BufRead>(reader: R, cancel: &AtomicBool, tx: &Sender<SessionEvent>) {
    let mut batch: Vec<MatchRecord> = Vec::with_capacity(BATCH_SIZE);
    let mut seq = 0u64;

    for item in ResultStreamParser::new(reader) {
        if cancel.load(Ordering::Acquire) {
            return;
        }
        match item {
            Ok(record) => {
                batch.push(record);
                if batch.len() >= BATCH_SIZE {
                    let matches = std::mem::replace(&mut batch, Vec::with_capacity(BATCH_SIZE));
                    if tx.send(SessionEvent::Batch { seq, matches }).is_err() {
                        return;
                    }
                    seq += 1;
                }
            }
            Err(e) => {
                let _ = tx.send(SessionEvent::Failed(e));
                return;
            }
        }
    }

    if cancel.load(Ordering::Acquire) {
        return;
    }
    if !batch.is_empty() {
        let _ = tx.send(SessionEvent::Batch {
            seq,
            matches: batch,
        });
    }
    let _ = tx.send(SessionEvent::Finished);
}

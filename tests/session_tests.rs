//! Session lifecycle tests against real child processes.
//!
//! A small shell script stands in for the search executable so batching, completion and
//! cancellation can be checked without ripgrep. The tests at the bottom use the real `rg` and
//! are skipped when it is not installed.

use rgscope::core::{
    MatchRecord, SearchError, SearchParameters, SearchSession, SessionSink, SessionState,
};

use std::error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::{TempDir, tempdir};

#[derive(Default)]
struct Recorder {
    batches: Vec<(u64, Vec<MatchRecord>)>,
    states: Vec<SessionState>,
}

impl Recorder {
    fn sizes(&self) -> Vec<usize> {
        self.batches.iter().map(|(_, b)| b.len()).collect()
    }

    fn lines(&self) -> Vec<u64> {
        self.batches
            .iter()
            .flat_map(|(_, b)| b.iter().map(MatchRecord::line_number))
            .collect()
    }
}

impl SessionSink for Recorder {
    fn on_batch(&mut self, seq: u64, matches: Vec<MatchRecord>) {
        self.batches.push((seq, matches));
    }

    fn on_state_change(&mut self, state: SessionState) {
        self.states.push(state);
    }
}

fn match_line(path: &str, line: usize) -> String {
    format!(
        r#"{{"type":"match","data":{{"path":{{"text":"{}"}},"line_number":{},"lines":{{"text":"needle {}\n"}},"submatches":[{{"match":{{"text":"needle"}},"start":0,"end":6}}]}}}}"#,
        path, line, line
    )
}

/// Output of a search run: begin/end noise around `count` matches.
fn fixture(count: usize) -> String {
    let mut out =
        String::from("{\"type\":\"begin\",\"data\":{\"path\":{\"text\":\"/r/a.txt\"}}}\n");
    for n in 1..=count {
        out.push_str(&match_line("/r/a.txt", n));
        out.push('\n');
    }
    out.push_str("{\"type\":\"end\",\"data\":{}}\n");
    out.push_str("{\"type\":\"summary\",\"data\":{}}\n");
    out
}

#[cfg(unix)]
fn fake_tool(dir: &Path, name: &str, body: &str) -> Result<PathBuf, Box<dyn error::Error>> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Start a session, retrying while the freshly written script is still busy (ETXTBSY).
fn start(
    program: &Path,
    params: &SearchParameters,
) -> Result<SearchSession<Recorder>, Box<dyn error::Error>> {
    let mut attempts = 0;
    loop {
        let mut session = SearchSession::new(program, Recorder::default());
        match session.start(params) {
            Ok(()) => return Ok(session),
            Err(SearchError::Spawn { source, .. })
                if source.raw_os_error() == Some(26) && attempts < 10 =>
            {
                attempts += 1;
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn poll_until(
    session: &mut SearchSession<Recorder>,
    done: impl Fn(&SearchSession<Recorder>) -> bool,
) -> Result<(), Box<dyn error::Error>> {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !done(session) {
        if Instant::now() > deadline {
            return Err("timed out waiting for the session".into());
        }
        session.poll_timeout(Duration::from_millis(20))?;
    }
    Ok(())
}

fn workspace() -> Result<(TempDir, SearchParameters), Box<dyn error::Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("root");
    fs::create_dir(&root)?;
    let params = SearchParameters::new("needle", &root);
    Ok((dir, params))
}

#[cfg(unix)]
#[test]
fn test_batches_of_ten_in_order() -> Result<(), Box<dyn error::Error>> {
    let (dir, params) = workspace()?;
    let data = dir.path().join("out.jsonl");
    fs::write(&data, fixture(25))?;
    let tool = fake_tool(
        dir.path(),
        "rg",
        &format!("echo 'rg: some warning' 1>&2\ncat '{}'", data.display()),
    )?;

    let mut session = start(&tool, &params)?;
    assert_eq!(session.wait()?, SessionState::Completed);

    let rec = session.sink();
    assert_eq!(rec.sizes(), vec![10, 10, 5]);
    assert_eq!(
        rec.batches.iter().map(|(seq, _)| *seq).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(rec.lines(), (1..=25).collect::<Vec<u64>>());
    assert_eq!(
        rec.states,
        vec![SessionState::Running, SessionState::Completed]
    );
    assert_eq!(session.match_count(), 25);
    assert_eq!(session.batch_count(), 3);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_nonzero_exit_still_completes() -> Result<(), Box<dyn error::Error>> {
    let (dir, params) = workspace()?;
    let data = dir.path().join("out.jsonl");
    fs::write(&data, fixture(3))?;
    let tool = fake_tool(dir.path(), "rg", &format!("cat '{}'\nexit 1", data.display()))?;

    let mut session = start(&tool, &params)?;
    assert_eq!(session.wait()?, SessionState::Completed);
    assert_eq!(session.sink().sizes(), vec![3]);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_no_output_completes_empty() -> Result<(), Box<dyn error::Error>> {
    let (dir, params) = workspace()?;
    let tool = fake_tool(dir.path(), "rg", "exit 1")?;

    let mut session = start(&tool, &params)?;
    assert_eq!(session.wait()?, SessionState::Completed);
    assert!(session.sink().batches.is_empty());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_cancel_before_output() -> Result<(), Box<dyn error::Error>> {
    let (dir, params) = workspace()?;
    let tool = fake_tool(dir.path(), "rg", "exec sleep 30")?;

    let mut session = start(&tool, &params)?;
    assert_eq!(session.state(), SessionState::Running);

    let began = Instant::now();
    assert!(session.cancel());
    assert_eq!(session.state(), SessionState::Cancelled);
    assert!(began.elapsed() < Duration::from_secs(10));

    // second cancel: no-op, nothing re-emitted
    assert!(!session.cancel());
    assert_eq!(session.poll()?, 0);
    assert_eq!(session.wait()?, SessionState::Cancelled);

    let rec = session.sink();
    assert!(rec.batches.is_empty());
    assert_eq!(
        rec.states,
        vec![SessionState::Running, SessionState::Cancelled]
    );
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_cancel_discards_partial_batch() -> Result<(), Box<dyn error::Error>> {
    let (dir, params) = workspace()?;
    let data = dir.path().join("out.jsonl");
    fs::write(&data, fixture(15))?;
    let tool = fake_tool(
        dir.path(),
        "rg",
        &format!("cat '{}'\nexec sleep 30", data.display()),
    )?;

    let mut session = start(&tool, &params)?;
    poll_until(&mut session, |s| s.match_count() >= 10)?;
    assert!(session.cancel());

    // the five buffered matches never show up
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(session.poll()?, 0);
    assert_eq!(session.sink().sizes(), vec![10]);
    assert_eq!(session.state(), SessionState::Cancelled);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_start_twice_is_rejected() -> Result<(), Box<dyn error::Error>> {
    let (dir, params) = workspace()?;
    let tool = fake_tool(dir.path(), "rg", "exec sleep 30")?;

    let mut session = start(&tool, &params)?;
    assert!(matches!(
        session.start(&params),
        Err(SearchError::AlreadyStarted(SessionState::Running))
    ));
    assert!(session.cancel());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_arguments_reach_the_tool_verbatim() -> Result<(), Box<dyn error::Error>> {
    let (dir, params) = workspace()?;
    let params = params
        .with_query("it's a \"quoted\" $query")
        .with_case_insensitive(true)
        .with_globs("*.rs, ,*.md");
    let args_file = dir.path().join("args.txt");
    let tool = fake_tool(
        dir.path(),
        "rg",
        &format!(
            "for a in \"$@\"; do printf '%s\\n' \"$a\" >> '{}'; done",
            args_file.display()
        ),
    )?;

    let mut session = start(&tool, &params)?;
    assert_eq!(session.wait()?, SessionState::Completed);

    let recorded = fs::read_to_string(&args_file)?;
    let root = params.root_path().display().to_string();
    let expected = vec![
        "--json",
        "-i",
        "-F",
        "-g",
        "*.rs",
        "-g",
        "*.md",
        "it's a \"quoted\" $query",
        root.as_str(),
    ];
    assert_eq!(recorded.lines().collect::<Vec<_>>(), expected);
    Ok(())
}

#[test]
fn test_missing_executable_fails() -> Result<(), Box<dyn error::Error>> {
    let (dir, params) = workspace()?;
    let mut session = SearchSession::new(dir.path().join("missing-rg"), Recorder::default());
    assert!(matches!(
        session.start(&params),
        Err(SearchError::Spawn { .. })
    ));
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.sink().states, vec![SessionState::Failed]);
    assert_eq!(session.wait()?, SessionState::Failed);
    Ok(())
}

fn rg_available() -> bool {
    which::which("rg").is_ok()
}

/// Macro to skip tests if `rg` is not available.
macro_rules! skip_if_no_rg {
    () => {
        if !rg_available() {
            return Ok(());
        }
    };
}

#[test]
fn test_real_rg_finds_matches() -> Result<(), Box<dyn error::Error>> {
    skip_if_no_rg!();
    let (_dir, params) = workspace()?;
    let root = params.root_path().to_path_buf();
    fs::write(root.join("crab.txt"), "nothing here\n    the crab walks\n")?;
    fs::write(root.join("other.md"), "no match\n")?;

    let mut session = start(Path::new("rg"), &params.with_query("crab"))?;
    assert_eq!(session.wait()?, SessionState::Completed);

    let found: Vec<MatchRecord> = session
        .sink()
        .batches
        .iter()
        .flat_map(|(_, b)| b.clone())
        .collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].line_number(), 2);
    assert_eq!(found[0].content(), "    the crab walks");
    assert_eq!(found[0].relative_path(&root), "crab.txt");
    assert_eq!(
        found[0]
            .valid_highlights()
            .map(|h| &found[0].content()[h.start..h.end])
            .collect::<Vec<_>>(),
        vec!["crab"]
    );
    Ok(())
}

#[test]
fn test_real_rg_respects_globs_and_case() -> Result<(), Box<dyn error::Error>> {
    skip_if_no_rg!();
    let (_dir, params) = workspace()?;
    let root = params.root_path().to_path_buf();
    fs::write(root.join("a.rs"), "Crab\n")?;
    fs::write(root.join("b.txt"), "crab\n")?;

    let params = params
        .with_query("crab")
        .with_case_insensitive(true)
        .with_globs("*.rs");
    let mut session = start(Path::new("rg"), &params)?;
    assert_eq!(session.wait()?, SessionState::Completed);

    let paths: Vec<String> = session
        .sink()
        .batches
        .iter()
        .flat_map(|(_, b)| b.iter().map(|m| m.relative_path(&root)))
        .collect();
    assert_eq!(paths, vec!["a.rs"]);
    Ok(())
}

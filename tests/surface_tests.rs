//! SearchSurface flows driven end to end through a stand-in search executable.

#![cfg(unix)]

use rgscope::app::SearchSurface;
use rgscope::core::{SearchError, SearchParameters, SessionState};

use std::error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{TempDir, tempdir};

fn match_line(line: usize) -> String {
    format!(
        r#"{{"type":"match","data":{{"path":{{"text":"/r/src/lib.rs"}},"line_number":{},"lines":{{"text":"  let needle = {};\n"}},"submatches":[{{"start":6,"end":12}}]}}}}"#,
        line, line
    )
}

fn fake_tool(dir: &Path, body: &str) -> Result<PathBuf, Box<dyn error::Error>> {
    let path = dir.join("rg");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// A tool that prints `count` matches, or sleeps when called with `-g slow`.
fn setup(count: usize) -> Result<(TempDir, PathBuf, SearchParameters), Box<dyn error::Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("root");
    fs::create_dir(&root)?;

    let data = dir.path().join("out.jsonl");
    let lines: Vec<String> = (1..=count).map(match_line).collect();
    fs::write(&data, lines.join("\n") + "\n")?;

    let tool = fake_tool(
        dir.path(),
        &format!(
            "for a in \"$@\"; do [ \"$a\" = slow ] && exec sleep 30; done\ncat '{}'",
            data.display()
        ),
    )?;
    let params = SearchParameters::new("needle", &root);
    Ok((dir, tool, params))
}

/// Submit, retrying while the freshly written script is still busy (ETXTBSY).
fn submit(surface: &mut SearchSurface) -> Result<bool, SearchError> {
    let mut attempts = 0;
    loop {
        match surface.submit() {
            Err(SearchError::Spawn { source, .. })
                if source.raw_os_error() == Some(26) && attempts < 10 =>
            {
                attempts += 1;
                std::thread::sleep(Duration::from_millis(20));
            }
            other => return other,
        }
    }
}

#[test]
fn test_submit_collects_results() -> Result<(), Box<dyn error::Error>> {
    let (_dir, tool, params) = setup(12)?;
    let mut surface = SearchSurface::new(&tool, params.clone());

    assert_eq!(surface.status_line(), "Ready to search");
    assert!(surface.show_submit());

    assert!(submit(&mut surface)?);
    assert_eq!(surface.wait()?, SessionState::Completed);

    assert_eq!(surface.results().len(), 12);
    assert_eq!(surface.session().map(|s| s.sink().batches()), Some(2));
    assert_eq!(surface.status_line(), "Found 12 matches");
    assert_eq!(surface.tracker().last_applied(), Some(&params));
    // nothing changed since the run: no reason to offer it again
    assert!(!surface.show_submit());

    let first = &surface.results()[0];
    assert_eq!(first.display_line().text, "let needle = 1;");
    Ok(())
}

#[test]
fn test_no_matches_status() -> Result<(), Box<dyn error::Error>> {
    let (_dir, tool, params) = setup(0)?;
    let mut surface = SearchSurface::new(&tool, params);
    submit(&mut surface)?;
    assert_eq!(surface.wait()?, SessionState::Completed);
    assert_eq!(surface.status_line(), "No matches found.");
    Ok(())
}

#[test]
fn test_toggle_stops_then_restarts() -> Result<(), Box<dyn error::Error>> {
    let (_dir, tool, params) = setup(3)?;
    let mut surface = SearchSurface::new(&tool, params.with_globs("slow"));

    assert!(submit(&mut surface)?);
    assert!(surface.is_running());
    assert!(surface.show_submit());
    assert!(surface.status_line().starts_with("Searching..."));

    // a second submit while running is refused
    assert!(matches!(
        surface.submit(),
        Err(SearchError::AlreadyStarted(SessionState::Running))
    ));

    assert!(surface.toggle()?);
    assert_eq!(surface.state(), SessionState::Cancelled);
    assert_eq!(surface.status_line(), "No matches found.");

    // toggling again runs the same parameters
    assert!(surface.toggle()?);
    assert!(surface.is_running());
    assert!(surface.stop());
    Ok(())
}

#[test]
fn test_clear_filter_reruns_without_globs() -> Result<(), Box<dyn error::Error>> {
    let (_dir, tool, params) = setup(4)?;
    let mut surface = SearchSurface::new(&tool, params.clone().with_globs("*.rs"));

    submit(&mut surface)?;
    surface.wait()?;
    assert_eq!(surface.active_filter().as_deref(), Some("*.rs"));

    assert!(surface.clear_filter()?);
    assert_eq!(surface.wait()?, SessionState::Completed);
    assert_eq!(surface.active_filter(), None);
    assert_eq!(surface.tracker().last_applied(), Some(&params));
    assert_eq!(surface.results().len(), 4);
    Ok(())
}

#[test]
fn test_edit_during_run_keeps_running_snapshot() -> Result<(), Box<dyn error::Error>> {
    let (_dir, tool, params) = setup(1)?;
    let running = params.with_globs("slow");
    let mut surface = SearchSurface::new(&tool, running.clone());

    submit(&mut surface)?;
    surface.edit(|p| p.with_query("other"));

    assert!(surface.is_running());
    assert_eq!(surface.tracker().last_applied(), Some(&running));
    assert!(surface.tracker().is_dirty(surface.edited()));

    assert!(surface.stop());
    // stopped, but the edit is still pending
    assert!(surface.show_submit());
    Ok(())
}

#[test]
fn test_rejected_submit_drops_previous_results() -> Result<(), Box<dyn error::Error>> {
    let (dir, tool, params) = setup(3)?;
    let mut surface = SearchSurface::new(&tool, params.clone());

    submit(&mut surface)?;
    assert_eq!(surface.wait()?, SessionState::Completed);
    assert_eq!(surface.results().len(), 3);

    surface.edit(|p| p.with_root_path(dir.path().join("gone")));
    assert!(matches!(
        surface.submit(),
        Err(SearchError::InvalidParameters(_))
    ));

    assert!(surface.results().is_empty());
    assert!(surface.session().is_none());
    assert_eq!(surface.state(), SessionState::Idle);
    let status = surface.status_line();
    assert!(status.starts_with("Cannot search: "), "{}", status);
    assert!(status.contains("is not a directory"), "{}", status);
    // the rejected parameters never ran
    assert_eq!(surface.tracker().last_applied(), Some(&params));
    Ok(())
}

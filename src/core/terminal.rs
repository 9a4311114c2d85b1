//! Terminal front end: runs one search surface and streams its matches to stdout.
//!
//! On an interactive terminal raw mode is enabled so `q`, `Esc` and `Ctrl-C` arrive as key
//! presses and stop the search. Piped output just streams until the search ends.

use crate::app::SearchSurface;
use crate::config::Config;
use crate::core::SessionState;
use crate::ui::{Styles, render_match};
use crate::utils::shorten_home_path;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Poll interval of the interactive loop.
const TICK: Duration = Duration::from_millis(16);

/// How long a non-interactive run waits for output before flushing.
const PIPE_TICK: Duration = Duration::from_millis(50);

fn is_stop_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Submit the surface's edited parameters and print matches until the search ends.
///
/// Returns the terminal state of the session. Search errors are reported on stderr, not
/// returned; only terminal I/O failures are.
pub fn run_search(surface: &mut SearchSurface, config: &Config) -> io::Result<SessionState> {
    let stdout = io::stdout();
    let interactive = stdout.is_terminal();

    let width = config.display().max_width().or_else(|| {
        interactive
            .then(|| crossterm::terminal::size().ok())
            .flatten()
            .map(|(cols, _)| cols as usize)
    });
    let styles = Styles::from_display(config.display(), interactive);
    let root = surface.edited().root_path().to_path_buf();

    match surface.submit() {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("[rgscope] Error: the query must not be blank");
            return Ok(surface.state());
        }
        Err(e) => {
            eprintln!("[rgscope] Error: {}", e);
            return Ok(surface.state());
        }
    }

    let mut out = BufWriter::new(stdout.lock());
    let mut printer = Printer {
        root,
        styles,
        width,
        printed: 0,
    };

    let result = if interactive {
        enable_raw_mode()?;
        let result = interactive_loop(surface, &mut printer, &mut out);
        disable_raw_mode()?;
        result
    } else {
        piped_loop(surface, &mut printer, &mut out)
    };
    out.flush()?;
    result?;

    let mut status = format!(
        "{} in {}",
        surface.status_line(),
        shorten_home_path(&printer.root)
    );
    if let Some(filter) = surface.active_filter() {
        status.push_str(&format!("  [filter: {}]", filter));
    }
    eprintln!("{}", status);
    Ok(surface.state())
}

struct Printer {
    root: PathBuf,
    styles: Styles,
    width: Option<usize>,
    printed: usize,
}

impl Printer {
    /// Print every match delivered since the last call.
    fn flush_new<W: Write>(
        &mut self,
        surface: &SearchSurface,
        out: &mut W,
        eol: &str,
    ) -> io::Result<()> {
        let results = surface.results();
        for record in &results[self.printed..] {
            render_match(out, record, &self.root, &self.styles, self.width, eol)?;
        }
        self.printed = results.len();
        out.flush()
    }
}

fn interactive_loop<W: Write>(
    surface: &mut SearchSurface,
    printer: &mut Printer,
    out: &mut W,
) -> io::Result<()> {
    loop {
        // Errors are already kept on the surface and shown in the status line.
        let _ = surface.tick();
        printer.flush_new(surface, out, "\r\n")?;

        if !surface.is_running() {
            return Ok(());
        }

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && is_stop_key(&key)
        {
            surface.stop();
            tracing::info!("search stopped from keyboard");
        }
    }
}

fn piped_loop<W: Write>(
    surface: &mut SearchSurface,
    printer: &mut Printer,
    out: &mut W,
) -> io::Result<()> {
    loop {
        let _ = surface.tick_timeout(PIPE_TICK);
        match printer.flush_new(surface, out, "\n") {
            // downstream closed (e.g. `rgs foo | head`): stop searching
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                surface.stop();
                return Ok(());
            }
            other => other?,
        }
        if !surface.is_running() {
            return Ok(());
        }
    }
}

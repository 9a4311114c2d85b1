//! main.rs
//! Entry point for rgscope

use rgscope::app::SearchSurface;
use rgscope::config::Config;
use rgscope::core::{SessionState, terminal};
use rgscope::logging;
use rgscope::utils::cli::{CliAction, handle_args};
use rgscope::utils::{resolve_root, resolve_search_binary};

use std::process::ExitCode;

fn main() -> std::io::Result<ExitCode> {
    std::panic::set_hook(Box::new(|info| {
        let _ = crossterm::terminal::disable_raw_mode();
        tracing::error!(panic = %info, "panic");
        eprintln!("\n[rgscope] Error occurred: {}", info);

        #[cfg(debug_assertions)]
        {
            let bt = std::backtrace::Backtrace::force_capture();
            eprintln!("\nStack Backtrace:\n{}", bt);
        }
    }));

    let CliAction::Search(args) = handle_args() else {
        return Ok(ExitCode::SUCCESS);
    };

    let config = Config::load();
    let _log_guard = logging::init(config.log());

    let root = match resolve_root(args.path.as_deref().unwrap_or("")) {
        Ok(root) => root,
        Err(e) => {
            eprintln!(
                "[rgscope] Error: path '{}' cannot be searched: {}",
                args.path.as_deref().unwrap_or("."),
                e
            );
            return Ok(ExitCode::from(2));
        }
    };

    let program = resolve_search_binary(config.general().binary());
    let params = args.to_parameters(config.general(), &root);
    tracing::info!(query = params.query(), root = %root.display(), "search requested");

    let mut surface = SearchSurface::new(program, params);
    let state = terminal::run_search(&mut surface, &config)?;

    let code = match state {
        SessionState::Failed | SessionState::Idle => 2,
        _ if surface.results().is_empty() => 1,
        _ => 0,
    };
    Ok(ExitCode::from(code))
}

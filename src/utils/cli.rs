//! Command-line argument parsing and help for rgscope.
//!
//! `rgs [OPTIONS] QUERY [PATH]` runs one search and streams the matches to the terminal.
//! Flags only switch filters on; anything not given falls back to the `[general]` table of
//! rgscope.toml.

use crate::config::{Config, InternalGeneral};
use crate::core::SearchParameters;

use std::path::Path;

/// Options collected from the command line for one search run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchArgs {
    pub query: String,
    pub path: Option<String>,
    pub ignore_case: bool,
    pub hidden: bool,
    pub regex: bool,
    pub globs: Option<String>,
}

impl SearchArgs {
    /// Merge with the configured defaults into the parameters of the run.
    pub fn to_parameters(&self, general: &InternalGeneral, root: &Path) -> SearchParameters {
        let params = general
            .parameters(&self.query, root)
            .with_case_insensitive(self.ignore_case || general.case_insensitive())
            .with_include_hidden(self.hidden || general.include_hidden())
            .with_regex_mode(self.regex || general.regex());
        match &self.globs {
            Some(globs) => params.with_globs(globs),
            None => params,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CliAction {
    Search(SearchArgs),
    Exit,
}

pub fn handle_args() -> CliAction {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Try --help for available options");
            CliAction::Exit
        }
    }
}

/// Parse the arguments after the program name. Informational flags are handled right here.
pub fn parse_args(args: &[String]) -> Result<CliAction, String> {
    let mut search = SearchArgs::default();
    let mut positional: Vec<&str> = Vec::new();
    let mut only_positional = false;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if only_positional || !arg.starts_with('-') || arg == "-" {
            positional.push(arg.as_str());
            continue;
        }
        match arg.as_str() {
            "--" => only_positional = true,
            "-i" | "--ignore-case" => search.ignore_case = true,
            "-u" | "--hidden" => search.hidden = true,
            "-e" | "--regex" => search.regex = true,
            "-g" | "--glob" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("{} needs a comma separated list of globs", arg))?;
                search.globs = Some(value.clone());
            }
            "--version" | "-v" => {
                print_version();
                return Ok(CliAction::Exit);
            }
            "-h" | "--help" => {
                print_help();
                return Ok(CliAction::Exit);
            }
            "--config-help" => {
                print_config_help();
                return Ok(CliAction::Exit);
            }
            "--init" => {
                let path = Config::default_path();
                match Config::generate_default(&path) {
                    Ok(()) => println!("Default config generated at {:?}", path),
                    Err(e) => eprintln!("Error: {}", e),
                }
                return Ok(CliAction::Exit);
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }

    match positional.as_slice() {
        [] => Err("missing QUERY".to_string()),
        [query] => {
            search.query = query.to_string();
            Ok(CliAction::Search(search))
        }
        [query, path] => {
            search.query = query.to_string();
            search.path = Some(path.to_string());
            Ok(CliAction::Search(search))
        }
        _ => Err("rgs accepts at most a QUERY and a PATH".to_string()),
    }
}

fn print_version() {
    println!("rgscope {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    println!(
        r#"rgscope - stream ripgrep matches while the search is still running

USAGE:
  rgs [OPTIONS] QUERY [PATH]

ARGS:
  QUERY                   Text to search for (literal unless --regex)
  PATH                    Directory to search (defaults to current directory)

OPTIONS:
  -i, --ignore-case       Case insensitive search
  -u, --hidden            Include hidden, ignored and binary files
  -e, --regex             Treat QUERY as a regular expression
  -g, --glob LIST         Comma separated glob filters, e.g. "*.rs, !target/**"
      --init              Generate the default configuration file
      --config-help       Display all the configuration options
  -h, --help              Print help information
  -v, --version           Display the current installed version of rgscope

KEYS (interactive terminal):
  q, Esc, Ctrl-C          Stop the running search

ENVIRONMENT:
  RGSCOPE_CONFIG          Override the default config path
  RGSCOPE_LOG             Log filter, e.g. "debug" or "rgscope=trace"
"#
    );
}

fn print_config_help() {
    let help_text = r##"
rgscope - Full Configuration Guide (rgscope.toml)

=========================
 General Settings
=========================
[general]
  binary                     ripgrep executable, name on PATH or path [default: "rg"]
  case_insensitive           Ignore case [default: false]
  include_hidden             Search hidden, ignored and binary files [default: false]
  regex                      Treat the query as a regex [default: false]
  globs                      Comma separated glob filters [default: ""]

=========================
 Display Settings
=========================
[display]
  color                      Style the output [default: true]
  path_color                 Color of file paths [default: "cyan"]
  line_color                 Color of line numbers [default: "green"]
  highlight_color            Color of matched text [default: "red"]
  max_width                  Clip lines at this many columns, 0 = terminal width

=========================
 Logging
=========================
[log]
  level                      Log filter when RGSCOPE_LOG is unset [default: "info"]
  file                       Write a daily rolling log file [default: true]
"##;

    println!("{}", help_text);
}

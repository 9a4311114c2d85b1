//! The main config loading module for rgscope.
//!
//! Handles loading and deserializing settings from `rgscope.toml`.
//!
//! Provides the main [Config] struct, as well as the internal [RawConfig] used for parsing.
//!
//! Also implements default config generation for `rgs --init`.

use crate::config::{Display, General, InternalGeneral, LogConfig};
use crate::utils::get_home;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config file already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Raw configuration as read from the toml file.
/// It is converted into the main [Config] struct right after parsing.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RawConfig {
    general: General,
    display: Display,
    log: LogConfig,
}

/// Main configuration struct for rgscope
#[derive(Debug)]
pub struct Config {
    general: InternalGeneral,
    display: Display,
    log: LogConfig,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: InternalGeneral::from(raw.general),
            display: raw.display,
            log: raw.log,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    /// A missing or broken file is reported on stderr and the internal defaults are used.
    ///
    /// Called by the entry point at startup, before logging is up.
    pub fn load() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}. Using internal defaults.", e);
                Self::default()
            }
        }
    }

    /// Load and parse the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawConfig>(content).map(Config::from)
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &InternalGeneral {
        &self.general
    }

    #[inline]
    pub fn display(&self) -> &Display {
        &self.display
    }

    #[inline]
    pub fn log(&self) -> &LogConfig {
        &self.log
    }

    /// Determine the default configuration file path.
    /// Checks the RGSCOPE_CONFIG environment variable first,
    /// Checks for XDG_CONFIG_HOME after,
    /// then defaults to ~/.config/rgscope/rgscope.toml,
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("RGSCOPE_CONFIG") {
            return PathBuf::from(path);
        }

        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("rgscope/rgscope.toml");
        }

        if let Some(home) = get_home() {
            return home.join(".config/rgscope/rgscope.toml");
        }
        PathBuf::from("rgscope.toml")
    }

    /// Generate a default configuration file at the specified path.
    /// If the file already exists, returns an error.
    pub fn generate_default(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, DEFAULT_TOML).map_err(write_err)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

pub(crate) const DEFAULT_TOML: &str = r##"# rgscope.toml - default configuration for rgscope

# Note:
# Commented values are the internal defaults of rgscope.
# Command line flags override the [general] defaults.

[general]
# binary = "rg"              # name on PATH or absolute path of ripgrep
# case_insensitive = false
# include_hidden = false     # search hidden, ignored and binary files (-uuu)
# regex = false              # false searches the query literally (-F)
# globs = ""                 # e.g. "*.rs, !target/**"

[display]
# color = true
# path_color = "cyan"
# line_color = "green"
# highlight_color = "red"    # names or "#RRGGBB"
# max_width = 0              # 0 uses the terminal width

[log]
# level = "info"             # RGSCOPE_LOG overrides this
# file = true
"##;

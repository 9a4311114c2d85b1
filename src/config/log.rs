//! The `[log]` table of rgscope.toml.

use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct LogConfig {
    level: String,
    file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            file: true,
        }
    }
}

impl LogConfig {
    /// Filter directive used when `RGSCOPE_LOG` is not set, e.g. `info` or `rgscope=debug`.
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Whether logs are written to the rolling log file at all.
    pub fn file(&self) -> bool {
        self.file
    }
}

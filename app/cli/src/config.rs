//! `plugsync.json` configuration.
//!
//! ```json
//! {
//!   "logging": { "level": "debug", "modules": ["plugsync_plugin=trace"] },
//!   "executor": { "kind": "cli", "program": "claude", "timeoutSecs": 120 }
//! }
//! ```
//!
//! Every field is optional. A missing or empty file means defaults.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use plugsync_plugin::ClaudePaths;
use plugsync_plugin::executor::DEFAULT_PROGRAM;
use plugsync_plugin::executor::DEFAULT_TIMEOUT;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::logging::LoggingConfig;

/// Config file name inside the Claude config root.
pub const CONFIG_FILE: &str = "plugsync.json";

/// How plugin state changes are carried out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// Shell out to the `claude` CLI.
    #[default]
    Cli,
    /// Edit settings and registry files directly.
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutorConfig {
    pub kind: ExecutorKind,
    pub program: String,
    pub timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            kind: ExecutorKind::default(),
            program: DEFAULT_PROGRAM.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub logging: LoggingConfig,
    pub executor: ExecutorConfig,
}

/// Overrides taken from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub executor: Option<ExecutorKind>,
    pub timeout_secs: Option<u64>,
}

impl CliConfig {
    /// Apply flag overrides on top of the file values.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(kind) = overrides.executor {
            self.executor.kind = kind;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.executor.timeout_secs = secs;
        }
        self
    }
}

/// Default config location: `<claude home>/plugsync.json`.
pub fn default_config_path(paths: &ClaudePaths) -> PathBuf {
    paths.home().join(CONFIG_FILE)
}

/// Load the config file, falling back to defaults when it is absent.
pub fn load_config(path: &Path) -> anyhow::Result<CliConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(CliConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        debug!(path = %path.display(), "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    serde_json::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;

//! Tracing subscriber setup.

use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Default level when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LEVEL: &str = "info";

/// `logging` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Per-module directives, e.g. `plugsync_plugin=debug`.
    pub modules: Vec<String>,
    /// Include file and line in log lines.
    pub location: bool,
    /// Include the event target in log lines.
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            modules: Vec::new(),
            location: false,
            target: false,
        }
    }
}

/// Build the filter from `RUST_LOG`, else from the config.
///
/// Directives that fail to parse are skipped.
pub fn build_env_filter(logging: &LoggingConfig, rust_log: Option<&str>) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|s| !s.trim().is_empty()) {
        return EnvFilter::new(directives);
    }

    let level = if logging.level.trim().is_empty() {
        DEFAULT_LEVEL
    } else {
        logging.level.trim()
    };
    let mut filter = EnvFilter::new(level);
    for module in &logging.modules {
        match module.parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring invalid log directive '{module}': {e}"),
        }
    }
    filter
}

/// Install the global subscriber, writing to stderr.
pub fn init_logging(logging: &LoggingConfig) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(logging, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .with_file(logging.location)
        .with_line_number(logging.location)
        .with_target(logging.target)
        .init();
}

#[cfg(test)]
#[path = "logging.test.rs"]
mod tests;

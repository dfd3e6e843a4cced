//! On-disk layout of settings, registry and marketplace files.
//!
//! ```text
//! ~/.claude/settings.json                              user settings
//! ~/.claude/plugins/installed_plugins.json             install registry
//! ~/.claude/plugins/marketplaces/<name>/...            marketplace checkouts
//! <project>/.claude/settings.json                      project settings
//! <project>/.claude/settings.local.json                local settings
//! ```

use std::path::Path;
use std::path::PathBuf;

use crate::error::Result;
use crate::error::plugin_error::HomeDirNotFoundSnafu;
use crate::error::plugin_error::MissingProjectPathSnafu;
use crate::scope::PluginScope;

/// Name of the per-user and per-project config directory.
pub const CLAUDE_DIR_NAME: &str = ".claude";

/// Environment variable that relocates the per-user config directory.
pub const CLAUDE_CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

pub const SETTINGS_FILE: &str = "settings.json";
pub const LOCAL_SETTINGS_FILE: &str = "settings.local.json";
pub const PLUGINS_DIR_NAME: &str = "plugins";
pub const INSTALLED_PLUGINS_FILE: &str = "installed_plugins.json";
pub const MARKETPLACES_DIR_NAME: &str = "marketplaces";

/// Resolved per-user config root (`~/.claude` by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaudePaths {
    home: PathBuf,
}

impl ClaudePaths {
    /// Use an explicit config root.
    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Find the config root.
    ///
    /// Checks `CLAUDE_CONFIG_DIR` first, then falls back to `~/.claude`.
    /// A relative `CLAUDE_CONFIG_DIR` is resolved against the current
    /// working directory.
    pub fn discover() -> Result<Self> {
        if let Ok(custom) = std::env::var(CLAUDE_CONFIG_DIR_ENV) {
            let path = PathBuf::from(&custom);
            if path.is_absolute() {
                return Ok(Self::from_home(path));
            }
            let resolved = std::env::current_dir()
                .map(|cwd| cwd.join(&custom))
                .unwrap_or(path);
            return Ok(Self::from_home(resolved));
        }

        let home = dirs::home_dir().ok_or_else(|| HomeDirNotFoundSnafu.build())?;
        Ok(Self::from_home(home.join(CLAUDE_DIR_NAME)))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn user_settings(&self) -> PathBuf {
        self.home.join(SETTINGS_FILE)
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.home.join(PLUGINS_DIR_NAME)
    }

    pub fn installed_plugins(&self) -> PathBuf {
        self.plugins_dir().join(INSTALLED_PLUGINS_FILE)
    }

    pub fn marketplaces_dir(&self) -> PathBuf {
        self.plugins_dir().join(MARKETPLACES_DIR_NAME)
    }
}

/// Resolve the settings file an enable flag for `scope` lives in.
///
/// `project_path` is ignored for [`PluginScope::User`] and required for the
/// two project-bound scopes.
pub fn resolve_settings_path(
    paths: &ClaudePaths,
    scope: PluginScope,
    project_path: Option<&Path>,
) -> Result<PathBuf> {
    match scope {
        PluginScope::User => Ok(paths.user_settings()),
        PluginScope::Project => {
            let project = project_path.ok_or_else(|| MissingProjectPathSnafu { scope }.build())?;
            Ok(project.join(CLAUDE_DIR_NAME).join(SETTINGS_FILE))
        }
        PluginScope::Local => {
            let project = project_path.ok_or_else(|| MissingProjectPathSnafu { scope }.build())?;
            Ok(project.join(CLAUDE_DIR_NAME).join(LOCAL_SETTINGS_FILE))
        }
    }
}

#[cfg(test)]
#[path = "paths.test.rs"]
mod tests;

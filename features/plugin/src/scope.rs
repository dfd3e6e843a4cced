//! Plugin scope definitions.
//!
//! A scope decides which settings file an enable/disable mutation targets.

use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::PluginError;
use crate::error::plugin_error::InvalidScopeSnafu;

/// The configuration scope of an installation or enable flag.
///
/// - User - `~/.claude/settings.json`, applies everywhere
/// - Project - `<project>/.claude/settings.json`, shared through version control
/// - Local - `<project>/.claude/settings.local.json`, never committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginScope {
    /// User-global.
    User,

    /// Shared project settings.
    Project,

    /// Personal project settings.
    Local,
}

impl PluginScope {
    /// All scopes, in the order bulk operations visit them.
    pub const ALL: [PluginScope; 3] = [Self::User, Self::Project, Self::Local];

    /// Whether this scope is bound to a workspace root.
    pub fn requires_project(self) -> bool {
        matches!(self, Self::Project | Self::Local)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Project => "project",
            Self::Local => "local",
        }
    }
}

impl std::fmt::Display for PluginScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginScope {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "project" => Ok(Self::Project),
            "local" => Ok(Self::Local),
            _ => InvalidScopeSnafu { value: s }.fail(),
        }
    }
}

#[cfg(test)]
#[path = "scope.test.rs"]
mod tests;

//! Error types for the plugin state engine.

use std::path::PathBuf;

use plugsync_error::ErrorExt;
use plugsync_error::StatusCode;
use snafu::Location;
use snafu::Snafu;

use crate::scope::PluginScope;

/// Plugin errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum PluginError {
    /// A settings or registry file exists but cannot be parsed.
    #[snafu(display("Corrupt config file at {}: {message}", path.display()))]
    ConfigCorrupt {
        path: PathBuf,
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// IO error other than a missing file.
    #[snafu(display("IO error at {}: {message}", path.display()))]
    Io {
        path: PathBuf,
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// Document could not be serialized.
    #[snafu(display("Failed to serialize {}: {message}", path.display()))]
    Serialize {
        path: PathBuf,
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// A project-bound scope was used without a workspace root.
    #[snafu(display("Scope '{scope}' requires a project path"))]
    MissingProjectPath {
        scope: PluginScope,
        #[snafu(implicit)]
        location: Location,
    },

    /// The user's home directory could not be determined.
    #[snafu(display("Home directory not found"))]
    HomeDirNotFound {
        #[snafu(implicit)]
        location: Location,
    },

    /// Unknown scope name.
    #[snafu(display("Invalid scope: {value} (expected user, project or local)"))]
    InvalidScope {
        value: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// Plugin is not offered by any known marketplace.
    #[snafu(display("Plugin not found in any marketplace: {plugin_id}"))]
    PluginNotFound {
        plugin_id: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// Plugin has no install record at the given scope.
    #[snafu(display("Plugin {plugin_id} is not installed at {scope} scope"))]
    PluginNotInstalled {
        plugin_id: String,
        scope: PluginScope,
        #[snafu(implicit)]
        location: Location,
    },

    /// The external command executor reported a failure.
    #[snafu(display("Failed to {action} {plugin_id} ({scope}): {message}"))]
    ExecutorFailure {
        plugin_id: String,
        scope: PluginScope,
        action: String,
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// The external command executor did not finish in time.
    #[snafu(display("Timed out after {seconds}s trying to {action} {plugin_id} ({scope})"))]
    ExecutorTimeout {
        plugin_id: String,
        scope: PluginScope,
        action: String,
        seconds: u64,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ErrorExt for PluginError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ConfigCorrupt { .. } => StatusCode::ConfigFileError,
            Self::Io { .. } => StatusCode::IoError,
            Self::Serialize { .. } => StatusCode::Internal,
            Self::MissingProjectPath { .. } => StatusCode::InvalidArguments,
            Self::HomeDirNotFound { .. } => StatusCode::InvalidConfig,
            Self::InvalidScope { .. } => StatusCode::InvalidArguments,
            Self::PluginNotFound { .. } => StatusCode::PluginNotFound,
            Self::PluginNotInstalled { .. } => StatusCode::PluginNotInstalled,
            Self::ExecutorFailure { .. } => StatusCode::ExecutorFailed,
            Self::ExecutorTimeout { .. } => StatusCode::ExecutorTimeout,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;

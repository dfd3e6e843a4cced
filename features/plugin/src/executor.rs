//! Executors that carry out install/enable/disable/update for one plugin.
//!
//! The orchestrator never touches plugin files itself; it delegates every
//! state transition to a [`PluginCommandExecutor`]. Two implementations:
//!
//! - [`CliCommandExecutor`] shells out to `claude plugin <action> <id> --scope <scope>`.
//! - [`LocalExecutor`] applies the same transitions directly through a
//!   [`ConfigStore`], for offline use.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use tracing::info;

use crate::catalog::MarketplaceScanner;
use crate::error::Result;
use crate::error::plugin_error::ExecutorFailureSnafu;
use crate::error::plugin_error::ExecutorTimeoutSnafu;
use crate::error::plugin_error::PluginNotFoundSnafu;
use crate::error::plugin_error::PluginNotInstalledSnafu;
use crate::installed_registry::InstallRecord;
use crate::installed_registry::now_timestamp;
use crate::scope::PluginScope;
use crate::store::ConfigStore;

/// Default program invoked by [`CliCommandExecutor`].
pub const DEFAULT_PROGRAM: &str = "claude";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Version recorded when the catalog does not declare one.
pub const UNKNOWN_VERSION: &str = "unknown";

/// A single executor action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginAction {
    Install,
    Enable,
    Disable,
    Update,
}

impl PluginAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for PluginAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Performs plugin state transitions.
///
/// Implementations are expected to be idempotent from the caller's point of
/// view: enabling an enabled plugin is not an error. `install` leaves the
/// plugin enabled at the given scope.
#[async_trait]
pub trait PluginCommandExecutor: Send + Sync + fmt::Debug {
    async fn install(&self, plugin_id: &str, scope: PluginScope) -> Result<()>;

    async fn enable(&self, plugin_id: &str, scope: PluginScope) -> Result<()>;

    async fn disable(&self, plugin_id: &str, scope: PluginScope) -> Result<()>;

    async fn update(&self, plugin_id: &str, scope: PluginScope) -> Result<()>;

    /// Dispatch by action.
    async fn run(&self, action: PluginAction, plugin_id: &str, scope: PluginScope) -> Result<()> {
        match action {
            PluginAction::Install => self.install(plugin_id, scope).await,
            PluginAction::Enable => self.enable(plugin_id, scope).await,
            PluginAction::Disable => self.disable(plugin_id, scope).await,
            PluginAction::Update => self.update(plugin_id, scope).await,
        }
    }
}

/// Runs the `claude` CLI in the workspace root.
#[derive(Debug, Clone)]
pub struct CliCommandExecutor {
    program: String,
    project_path: Option<PathBuf>,
    timeout: Duration,
}

impl CliCommandExecutor {
    pub fn new(project_path: Option<PathBuf>) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            project_path,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn invoke(
        &self,
        action: PluginAction,
        plugin_id: &str,
        scope: PluginScope,
    ) -> Result<()> {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(["plugin", action.as_str(), plugin_id, "--scope", scope.as_str()])
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.project_path {
            command.current_dir(dir);
        }

        debug!(
            program = %self.program,
            action = %action,
            plugin = plugin_id,
            scope = %scope,
            "Running plugin command"
        );

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|e| {
                ExecutorFailureSnafu {
                    plugin_id: plugin_id.to_string(),
                    scope,
                    action: action.to_string(),
                    message: format!("Failed to spawn {}: {e}", self.program),
                }
                .build()
            })?,
            Err(_) => {
                return ExecutorTimeoutSnafu {
                    plugin_id: plugin_id.to_string(),
                    scope,
                    action: action.to_string(),
                    seconds: self.timeout.as_secs(),
                }
                .fail();
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return ExecutorFailureSnafu {
                plugin_id: plugin_id.to_string(),
                scope,
                action: action.to_string(),
                message,
            }
            .fail();
        }

        info!(action = %action, plugin = plugin_id, scope = %scope, "Plugin command completed");
        Ok(())
    }
}

#[async_trait]
impl PluginCommandExecutor for CliCommandExecutor {
    async fn install(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        self.invoke(PluginAction::Install, plugin_id, scope).await
    }

    async fn enable(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        self.invoke(PluginAction::Enable, plugin_id, scope).await
    }

    async fn disable(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        self.invoke(PluginAction::Disable, plugin_id, scope).await
    }

    async fn update(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        self.invoke(PluginAction::Update, plugin_id, scope).await
    }
}

/// Applies transitions directly to the settings and registry files.
///
/// Install records the plugin's marketplace location rather than copying
/// files into a cache.
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    store: ConfigStore,
    scanner: Arc<dyn MarketplaceScanner>,
    project_path: Option<PathBuf>,
}

impl LocalExecutor {
    pub fn new(
        store: ConfigStore,
        scanner: Arc<dyn MarketplaceScanner>,
        project_path: Option<PathBuf>,
    ) -> Self {
        Self {
            store,
            scanner,
            project_path,
        }
    }

    /// Workspace bound to the record for project-bound scopes.
    fn record_project(&self, scope: PluginScope) -> Option<PathBuf> {
        match scope {
            PluginScope::User => None,
            PluginScope::Project | PluginScope::Local => self.project_path.clone(),
        }
    }
}

#[async_trait]
impl PluginCommandExecutor for LocalExecutor {
    async fn install(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        let project = self.project_path.as_deref();
        // Fail on a missing workspace before anything is written.
        self.store.settings_path(scope, project)?;

        let catalog = self.scanner.scan_available_plugins().await?;
        let Some(entry) = catalog.into_iter().find(|e| e.id() == plugin_id) else {
            return PluginNotFoundSnafu { plugin_id }.fail();
        };

        let install_path = entry.source_dir.clone().unwrap_or_else(|| {
            self.store
                .paths()
                .marketplaces_dir()
                .join(&entry.marketplace_name)
        });
        let version = entry.version.as_deref().unwrap_or(UNKNOWN_VERSION);
        let record = InstallRecord::new(scope, install_path, version, self.record_project(scope));

        self.store.add_install_entry(plugin_id, record)?;
        self.store
            .set_enabled_plugin(scope, project, plugin_id, true)?;
        info!(plugin = plugin_id, scope = %scope, version, "Installed plugin");
        Ok(())
    }

    async fn enable(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        self.store
            .set_enabled_plugin(scope, self.project_path.as_deref(), plugin_id, true)
    }

    async fn disable(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        self.store
            .set_enabled_plugin(scope, self.project_path.as_deref(), plugin_id, false)
    }

    async fn update(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        let project = self.project_path.as_deref();
        let registry = self.store.read_installed_plugins()?;
        let Some(current) = registry.records_at(plugin_id, scope, project).next().cloned() else {
            return PluginNotInstalledSnafu { plugin_id, scope }.fail();
        };

        let catalog = self.scanner.scan_available_plugins().await?;
        let latest = catalog.into_iter().find(|e| e.id() == plugin_id);

        let mut record = current;
        if let Some(entry) = latest {
            if let Some(version) = entry.version {
                record.version = version;
            }
            if let Some(dir) = entry.source_dir {
                record.install_path = dir;
            }
        }
        record.last_updated = now_timestamp();
        let version = record.version.clone();

        self.store.replace_install_entry(plugin_id, record)?;
        info!(plugin = plugin_id, scope = %scope, version = %version, "Updated plugin");
        Ok(())
    }
}

#[cfg(test)]
#[path = "executor.test.rs"]
mod tests;

//! Orchestration of plugin state changes.
//!
//! [`PluginOrchestrator`] turns user intents (toggle, update, bulk
//! enable/disable per marketplace, update everything) into executor calls,
//! keeps a cached merged view fresh, and makes sure the same operation is
//! never running twice at once.
//!
//! Concurrency rules:
//!
//! - A toggle or update holds the `(plugin_id, scope)` pair; a second call
//!   for the same pair returns [`ToggleOutcome::Skipped`].
//! - Bulk loops hold their [`ProgressKey`]; a second call for the same key
//!   returns `None`. Nothing is queued.
//! - Items of one bulk loop run strictly one after another.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::RwLock;

use serde::Deserialize;
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::catalog::MarketplaceScanner;
use crate::catalog::split_plugin_id;
use crate::conflicts::ResourceConflict;
use crate::conflicts::find_conflicts;
use crate::error::PluginError;
use crate::error::Result;
use crate::executor::PluginAction;
use crate::executor::PluginCommandExecutor;
use crate::guard::InFlight;
use crate::installed_registry::InstalledPluginsRegistry;
use crate::merge::MergedPlugin;
use crate::merge::merge_plugins;
use crate::progress::BulkAction;
use crate::progress::BulkError;
use crate::progress::BulkItem;
use crate::progress::BulkReport;
use crate::progress::ProgressEvent;
use crate::progress::ProgressKey;
use crate::protocol::PluginRequest;
use crate::protocol::PluginResponse;
use crate::protocol::ResponsePayload;
use crate::scope::PluginScope;
use crate::store::ConfigStore;

/// What a single-item operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Installed,
    Enabled,
    Disabled,
    Updated,
    /// The same `(plugin_id, scope)` was already in flight.
    Skipped,
}

/// How a plugin gets enabled at a scope.
///
/// Installing leaves the plugin enabled, so a fresh install is never
/// followed by an `enable` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableStep {
    /// No install record at the scope.
    Install,
    /// Installed but possibly disabled.
    Enable,
}

impl EnableStep {
    /// Pick the step from the current registry.
    pub fn plan(
        registry: &InstalledPluginsRegistry,
        plugin_id: &str,
        scope: PluginScope,
        project_path: Option<&Path>,
    ) -> Self {
        if registry.is_installed_at(plugin_id, scope, project_path) {
            Self::Enable
        } else {
            Self::Install
        }
    }

    pub fn action(self) -> PluginAction {
        match self {
            Self::Install => PluginAction::Install,
            Self::Enable => PluginAction::Enable,
        }
    }
}

/// Identity of a toggle for error reporting and retry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleKey {
    pub plugin_id: String,
    pub scope: PluginScope,
    pub enable: bool,
}

/// One step of a bulk loop.
#[derive(Debug, Clone)]
struct BulkTask {
    plugin_id: String,
    scope: PluginScope,
    action: PluginAction,
}

/// Drives plugin state changes through an executor.
#[derive(Debug)]
pub struct PluginOrchestrator {
    store: ConfigStore,
    executor: Arc<dyn PluginCommandExecutor>,
    scanner: Arc<dyn MarketplaceScanner>,
    project_path: Option<PathBuf>,
    merged: RwLock<Vec<MergedPlugin>>,
    pairs: InFlight<(String, PluginScope)>,
    bulk: InFlight<ProgressKey>,
    toggle_errors: Mutex<HashMap<ToggleKey, String>>,
    progress: watch::Sender<Option<ProgressEvent>>,
}

impl PluginOrchestrator {
    pub fn new(
        store: ConfigStore,
        executor: Arc<dyn PluginCommandExecutor>,
        scanner: Arc<dyn MarketplaceScanner>,
        project_path: Option<PathBuf>,
    ) -> Self {
        let (progress, _) = watch::channel(None);
        Self {
            store,
            executor,
            scanner,
            project_path,
            merged: RwLock::new(Vec::new()),
            pairs: InFlight::new(),
            bulk: InFlight::new(),
            toggle_errors: Mutex::new(HashMap::new()),
            progress,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    /// Latest bulk progress. `None` until a bulk loop has started.
    pub fn subscribe_progress(&self) -> watch::Receiver<Option<ProgressEvent>> {
        self.progress.subscribe()
    }

    /// The merged view as of the last refresh.
    pub fn merged_plugins(&self) -> Vec<MergedPlugin> {
        self.merged
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recompute the merged view from the registry and the catalog.
    pub async fn refresh(&self) -> Result<Vec<MergedPlugin>> {
        let registry = self.store.read_installed_plugins()?;
        let available = self.scanner.scan_available_plugins().await?;
        let merged = merge_plugins(&registry.flatten(), &available, self.project_path.as_deref());
        debug!(
            plugins = merged.len(),
            installed = merged.iter().filter(|p| p.is_installed()).count(),
            "Refreshed merged plugin view"
        );
        *self.merged.write().unwrap_or_else(PoisonError::into_inner) = merged.clone();
        Ok(merged)
    }

    /// Refresh without surfacing failures.
    pub async fn refresh_silent(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Failed to refresh merged plugin view");
        }
    }

    /// Fresh merged view of installed and available plugins.
    pub async fn list_available(&self) -> Result<Vec<MergedPlugin>> {
        self.refresh().await
    }

    /// Resource names claimed by more than one installed plugin.
    pub async fn conflicts(&self) -> Result<Vec<ResourceConflict>> {
        let installed: Vec<MergedPlugin> = self
            .refresh()
            .await?
            .into_iter()
            .filter(MergedPlugin::is_installed)
            .collect();
        Ok(find_conflicts(&installed))
    }

    /// Turn a plugin on or off at a scope.
    ///
    /// Enabling a plugin with no install record at `scope` installs it,
    /// which also enables it. Disabling is always attempted. A failure is
    /// remembered under `(plugin_id, scope, enable)` until the same toggle
    /// succeeds.
    pub async fn toggle(
        &self,
        plugin_id: &str,
        scope: PluginScope,
        enable: bool,
    ) -> Result<ToggleOutcome> {
        let Some(_guard) = self.pairs.try_acquire((plugin_id.to_string(), scope)) else {
            debug!(plugin = plugin_id, scope = %scope, "Toggle already in flight, skipping");
            return Ok(ToggleOutcome::Skipped);
        };

        let key = ToggleKey {
            plugin_id: plugin_id.to_string(),
            scope,
            enable,
        };
        match self.apply_toggle(plugin_id, scope, enable).await {
            Ok(outcome) => {
                self.errors().remove(&key);
                info!(plugin = plugin_id, scope = %scope, ?outcome, "Toggled plugin");
                self.refresh_silent().await;
                Ok(outcome)
            }
            Err(e) => {
                warn!(plugin = plugin_id, scope = %scope, enable, error = %e, "Toggle failed");
                self.errors().insert(key, e.to_string());
                Err(e)
            }
        }
    }

    /// Re-run exactly the toggle that failed under `key`.
    pub async fn retry_toggle(&self, key: &ToggleKey) -> Result<ToggleOutcome> {
        self.toggle(&key.plugin_id, key.scope, key.enable).await
    }

    /// Last failure message of a toggle, if it has not since succeeded.
    pub fn toggle_error(
        &self,
        plugin_id: &str,
        scope: PluginScope,
        enable: bool,
    ) -> Option<String> {
        let key = ToggleKey {
            plugin_id: plugin_id.to_string(),
            scope,
            enable,
        };
        self.errors().get(&key).cloned()
    }

    /// All outstanding toggle failures, ordered by key.
    pub fn toggle_errors(&self) -> BTreeMap<ToggleKey, String> {
        self.errors()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Install a plugin at a scope.
    pub async fn install(&self, plugin_id: &str, scope: PluginScope) -> Result<ToggleOutcome> {
        self.single(PluginAction::Install, plugin_id, scope).await
    }

    /// Update one installed plugin at a scope.
    pub async fn update(&self, plugin_id: &str, scope: PluginScope) -> Result<ToggleOutcome> {
        self.single(PluginAction::Update, plugin_id, scope).await
    }

    /// Update every installed plugin at every scope that applies here.
    ///
    /// Returns `None` when an update-all is already running.
    pub async fn update_all(&self) -> Result<Option<BulkReport>> {
        let Some(_guard) = self.bulk.try_acquire(ProgressKey::UpdateAll) else {
            debug!("Update-all already in flight, skipping");
            return Ok(None);
        };

        let project = self.project_path.as_deref();
        let mut tasks = Vec::new();
        for plugin in self.refresh().await? {
            for scope in plugin.installed_scopes() {
                // Project records of other workspaces are left alone.
                if plugin.install_at(scope, project).is_some() {
                    tasks.push(BulkTask {
                        plugin_id: plugin.id.clone(),
                        scope,
                        action: PluginAction::Update,
                    });
                }
            }
        }

        let report = self
            .drive(ProgressKey::UpdateAll, BulkAction::Update, None, tasks)
            .await;
        self.refresh_silent().await;
        Ok(Some(report))
    }

    /// Enable `items` of a marketplace at `scope`.
    ///
    /// Items already enabled there are skipped; the rest are installed or
    /// enabled one at a time. Returns `None` when a bulk operation for the
    /// marketplace is already running.
    pub async fn bulk_enable(
        &self,
        marketplace: &str,
        items: &[String],
        scope: PluginScope,
    ) -> Result<Option<BulkReport>> {
        let key = ProgressKey::Marketplace(marketplace.to_string());
        let Some(_guard) = self.bulk.try_acquire(key.clone()) else {
            debug!(marketplace, "Bulk operation already in flight, skipping");
            return Ok(None);
        };

        let project = self.project_path.as_deref();
        let enabled = self.store.read_enabled_plugins(scope, project)?;
        let registry = self.store.read_installed_plugins()?;

        let mut seen = HashSet::new();
        let tasks: Vec<BulkTask> = items
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter(|id| enabled.get(id.as_str()) != Some(&true))
            .map(|id| BulkTask {
                plugin_id: id.clone(),
                scope,
                action: EnableStep::plan(&registry, id, scope, project).action(),
            })
            .collect();

        let report = self
            .drive(key, BulkAction::Enable, Some(marketplace), tasks)
            .await;
        self.refresh_silent().await;
        Ok(Some(report))
    }

    /// Disable `items` of a marketplace wherever they are enabled.
    ///
    /// Work is ordered by item, then user, project, local. Project-bound
    /// scopes are only considered with a workspace.
    pub async fn bulk_disable(
        &self,
        marketplace: &str,
        items: &[String],
    ) -> Result<Option<BulkReport>> {
        let key = ProgressKey::Marketplace(marketplace.to_string());
        let Some(_guard) = self.bulk.try_acquire(key.clone()) else {
            debug!(marketplace, "Bulk operation already in flight, skipping");
            return Ok(None);
        };

        let project = self.project_path.as_deref();
        let mut enabled_by_scope = Vec::new();
        for scope in PluginScope::ALL {
            if scope.requires_project() && project.is_none() {
                continue;
            }
            enabled_by_scope.push((scope, self.store.read_enabled_plugins(scope, project)?));
        }

        let mut seen = HashSet::new();
        let mut tasks = Vec::new();
        for id in items.iter().filter(|id| seen.insert(id.as_str())) {
            for (scope, enabled) in &enabled_by_scope {
                if enabled.get(id.as_str()) == Some(&true) {
                    tasks.push(BulkTask {
                        plugin_id: id.clone(),
                        scope: *scope,
                        action: PluginAction::Disable,
                    });
                }
            }
        }

        let report = self
            .drive(key, BulkAction::Disable, Some(marketplace), tasks)
            .await;
        self.refresh_silent().await;
        Ok(Some(report))
    }

    /// Answer one transport request.
    pub async fn handle(&self, request: PluginRequest) -> PluginResponse {
        let result = match request {
            PluginRequest::Install { plugin_id, scope } => self
                .install(&plugin_id, scope)
                .await
                .map(|outcome| ResponsePayload::Outcome { outcome }),
            PluginRequest::Enable { plugin_id, scope } => self
                .toggle(&plugin_id, scope, true)
                .await
                .map(|outcome| ResponsePayload::Outcome { outcome }),
            PluginRequest::Disable { plugin_id, scope } => self
                .toggle(&plugin_id, scope, false)
                .await
                .map(|outcome| ResponsePayload::Outcome { outcome }),
            PluginRequest::Update { plugin_id, scope } => self
                .update(&plugin_id, scope)
                .await
                .map(|outcome| ResponsePayload::Outcome { outcome }),
            PluginRequest::ListAvailable => self
                .list_available()
                .await
                .map(|plugins| ResponsePayload::Plugins { plugins }),
            PluginRequest::UpdateAll => self
                .update_all()
                .await
                .map(|report| ResponsePayload::Bulk { report }),
            PluginRequest::BulkEnable {
                marketplace,
                plugin_ids,
                scope,
            } => self
                .bulk_enable(&marketplace, &plugin_ids, scope)
                .await
                .map(|report| ResponsePayload::Bulk { report }),
            PluginRequest::BulkDisable {
                marketplace,
                plugin_ids,
            } => self
                .bulk_disable(&marketplace, &plugin_ids)
                .await
                .map(|report| ResponsePayload::Bulk { report }),
            PluginRequest::ListConflicts => self
                .conflicts()
                .await
                .map(|conflicts| ResponsePayload::Conflicts { conflicts }),
        };

        match result {
            Ok(payload) => PluginResponse::success(payload),
            Err(e) => PluginResponse::from_error(&e),
        }
    }

    async fn apply_toggle(
        &self,
        plugin_id: &str,
        scope: PluginScope,
        enable: bool,
    ) -> Result<ToggleOutcome> {
        if !enable {
            self.executor.disable(plugin_id, scope).await?;
            return Ok(ToggleOutcome::Disabled);
        }

        let registry = self.store.read_installed_plugins()?;
        match EnableStep::plan(&registry, plugin_id, scope, self.project_path.as_deref()) {
            EnableStep::Install => {
                self.executor.install(plugin_id, scope).await?;
                Ok(ToggleOutcome::Installed)
            }
            EnableStep::Enable => {
                self.executor.enable(plugin_id, scope).await?;
                Ok(ToggleOutcome::Enabled)
            }
        }
    }

    async fn single(
        &self,
        action: PluginAction,
        plugin_id: &str,
        scope: PluginScope,
    ) -> Result<ToggleOutcome> {
        let Some(_guard) = self.pairs.try_acquire((plugin_id.to_string(), scope)) else {
            debug!(
                plugin = plugin_id,
                scope = %scope,
                action = %action,
                "Already in flight, skipping"
            );
            return Ok(ToggleOutcome::Skipped);
        };

        self.executor.run(action, plugin_id, scope).await?;
        info!(plugin = plugin_id, scope = %scope, action = %action, "Plugin operation completed");
        self.refresh_silent().await;
        Ok(match action {
            PluginAction::Install => ToggleOutcome::Installed,
            PluginAction::Enable => ToggleOutcome::Enabled,
            PluginAction::Disable => ToggleOutcome::Disabled,
            PluginAction::Update => ToggleOutcome::Updated,
        })
    }

    /// Run `tasks` in order, collecting failures and publishing progress
    /// after every item.
    async fn drive(
        &self,
        key: ProgressKey,
        action: BulkAction,
        marketplace: Option<&str>,
        tasks: Vec<BulkTask>,
    ) -> BulkReport {
        let mut report = BulkReport::new(action, tasks.len());
        self.publish(&key, &report);
        info!(key = %key, action = %action, total = tasks.len(), "Starting bulk operation");

        for task in tasks {
            match self
                .executor
                .run(task.action, &task.plugin_id, task.scope)
                .await
            {
                Ok(()) => report.succeeded.push(BulkItem {
                    plugin_id: task.plugin_id,
                    scope: task.scope,
                }),
                Err(e) => {
                    warn!(
                        key = %key,
                        plugin = %task.plugin_id,
                        scope = %task.scope,
                        error = %e,
                        "Bulk item failed"
                    );
                    report.failed.push(bulk_error(marketplace, &task, &e));
                }
            }
            report.progress.current += 1;
            self.publish(&key, &report);
        }

        info!(
            key = %key,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Bulk operation finished"
        );
        report
    }

    fn publish(&self, key: &ProgressKey, report: &BulkReport) {
        self.progress.send_replace(Some(ProgressEvent {
            key: key.clone(),
            progress: report.progress,
        }));
    }

    fn errors(&self) -> std::sync::MutexGuard<'_, HashMap<ToggleKey, String>> {
        self.toggle_errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn bulk_error(marketplace: Option<&str>, task: &BulkTask, error: &PluginError) -> BulkError {
    BulkError {
        marketplace: marketplace
            .map(String::from)
            .or_else(|| split_plugin_id(&task.plugin_id).1.map(String::from)),
        plugin_id: task.plugin_id.clone(),
        scope: task.scope,
        message: error.to_string(),
    }
}

#[cfg(test)]
#[path = "orchestrator.test.rs"]
mod tests;

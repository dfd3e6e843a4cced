//! Scope-aware configuration store.
//!
//! Every mutation is a read-modify-write of one whole document: read the
//! current file (or its default), change only the fields this engine owns,
//! write the full document back. There is no locking; the window between
//! read and write is kept as short as a single call.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::document::DocumentStore;
use crate::document::FsDocumentStore;
use crate::document::read_document;
use crate::document::write_document;
use crate::error::Result;
use crate::installed_registry::InstallRecord;
use crate::installed_registry::InstalledPluginsRegistry;
use crate::paths::ClaudePaths;
use crate::paths::resolve_settings_path;
use crate::plugin_settings::PluginSettings;
use crate::scope::PluginScope;

/// Reads and writes settings and registry documents.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    backend: Arc<dyn DocumentStore>,
    paths: ClaudePaths,
}

impl ConfigStore {
    pub fn new(backend: Arc<dyn DocumentStore>, paths: ClaudePaths) -> Self {
        Self { backend, paths }
    }

    /// Store backed by the real filesystem.
    pub fn on_disk(paths: ClaudePaths) -> Self {
        Self::new(Arc::new(FsDocumentStore), paths)
    }

    pub fn paths(&self) -> &ClaudePaths {
        &self.paths
    }

    pub fn backend(&self) -> &dyn DocumentStore {
        self.backend.as_ref()
    }

    /// Settings file for `scope`.
    pub fn settings_path(
        &self,
        scope: PluginScope,
        project_path: Option<&Path>,
    ) -> Result<PathBuf> {
        resolve_settings_path(&self.paths, scope, project_path)
    }

    /// Read the whole settings document of a scope (`{}` when absent).
    pub fn read_settings(
        &self,
        scope: PluginScope,
        project_path: Option<&Path>,
    ) -> Result<PluginSettings> {
        let path = self.settings_path(scope, project_path)?;
        read_document(self.backend(), &path, PluginSettings::default())
    }

    /// Enable or disable a plugin at a scope.
    ///
    /// Idempotent: a call that changes nothing does not touch the file.
    pub fn set_enabled_plugin(
        &self,
        scope: PluginScope,
        project_path: Option<&Path>,
        plugin_id: &str,
        enabled: bool,
    ) -> Result<()> {
        let path = self.settings_path(scope, project_path)?;
        let mut settings = read_document(self.backend(), &path, PluginSettings::default())?;
        let changed = settings.set_enabled(plugin_id, enabled);
        if changed {
            write_document(self.backend(), &path, &settings)?;
        }

        debug!(
            plugin = plugin_id,
            scope = %scope,
            enabled,
            changed,
            path = %path.display(),
            "Updated enabledPlugins"
        );
        Ok(())
    }

    /// Enabled plugins at a scope. `{}` when the settings file is absent.
    pub fn read_enabled_plugins(
        &self,
        scope: PluginScope,
        project_path: Option<&Path>,
    ) -> Result<BTreeMap<String, bool>> {
        Ok(self.read_settings(scope, project_path)?.enabled_plugins())
    }

    /// Read the install registry (`{version:2, plugins:{}}` when absent).
    pub fn read_installed_plugins(&self) -> Result<InstalledPluginsRegistry> {
        read_document(
            self.backend(),
            &self.paths.installed_plugins(),
            InstalledPluginsRegistry::empty(),
        )
    }

    /// Add an install record unless its identity is already present.
    ///
    /// Returns whether a record was inserted. The file is only rewritten
    /// when something changed.
    pub fn add_install_entry(&self, plugin_id: &str, record: InstallRecord) -> Result<bool> {
        let scope = record.scope;
        let mut registry = self.read_installed_plugins()?;
        let inserted = registry.add(plugin_id, record)?;
        if inserted {
            self.write_registry(&registry)?;
            info!(plugin = plugin_id, scope = %scope, "Recorded plugin install");
        } else {
            debug!(plugin = plugin_id, scope = %scope, "Install record already present");
        }
        Ok(inserted)
    }

    /// Remove the install record with identity `(scope, project_path)`.
    pub fn remove_install_entry(
        &self,
        plugin_id: &str,
        scope: PluginScope,
        project_path: Option<&Path>,
    ) -> Result<Option<InstallRecord>> {
        let mut registry = self.read_installed_plugins()?;
        let removed = registry.remove(plugin_id, scope, project_path);
        if removed.is_some() {
            self.write_registry(&registry)?;
            info!(plugin = plugin_id, scope = %scope, "Removed plugin install record");
        }
        Ok(removed)
    }

    /// Replace the record with the same identity in one read-modify-write.
    pub fn replace_install_entry(
        &self,
        plugin_id: &str,
        record: InstallRecord,
    ) -> Result<Option<InstallRecord>> {
        let mut registry = self.read_installed_plugins()?;
        let previous = registry.replace(plugin_id, record)?;
        self.write_registry(&registry)?;
        Ok(previous)
    }

    fn write_registry(&self, registry: &InstalledPluginsRegistry) -> Result<()> {
        write_document(self.backend(), &self.paths.installed_plugins(), registry)
    }
}

#[cfg(test)]
#[path = "store.test.rs"]
mod tests;

//! Installation tracking for installed plugins.
//!
//! The registry lives in `~/.claude/plugins/installed_plugins.json`:
//!
//! ```json
//! {
//!   "version": 2,
//!   "plugins": {
//!     "looping@plugins-local": [
//!       {
//!         "scope": "project",
//!         "installPath": "/home/u/.claude/plugins/cache/plugins-local/looping/1.0.0",
//!         "version": "1.0.0",
//!         "installedAt": "2025-01-01T00:00:00.000Z",
//!         "lastUpdated": "2025-01-01T00:00:00.000Z",
//!         "projectPath": "/work/app"
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! A plugin id maps to a non-empty list; a missing id means the plugin is not
//! installed anywhere. Within one list a record is identified by
//! `(scope, projectPath)`.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use chrono::SecondsFormat;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::Result;
use crate::error::plugin_error::MissingProjectPathSnafu;
use crate::scope::PluginScope;

/// Current registry schema version.
pub const REGISTRY_VERSION: u32 = 2;

/// Registry of installed plugins (V2 format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledPluginsRegistry {
    /// Schema version (always 2).
    #[serde(default = "default_version")]
    pub version: u32,
    /// Installed plugins keyed by plugin ID, with per-scope entries.
    #[serde(default)]
    pub plugins: BTreeMap<String, Vec<InstallRecord>>,
    /// Top-level fields written by other tools.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> u32 {
    REGISTRY_VERSION
}

/// One installation of one plugin at one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRecord {
    pub scope: PluginScope,
    #[serde(default)]
    pub install_path: PathBuf,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub installed_at: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit_sha: Option<String>,
    /// Workspace root. Required for project scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,
    /// Record fields written by other tools.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InstallRecord {
    /// A fresh record stamped with the current time.
    pub fn new(
        scope: PluginScope,
        install_path: PathBuf,
        version: impl Into<String>,
        project_path: Option<PathBuf>,
    ) -> Self {
        let now = now_timestamp();
        Self {
            scope,
            install_path,
            version: version.into(),
            installed_at: now.clone(),
            last_updated: now,
            git_commit_sha: None,
            project_path,
            extra: Map::new(),
        }
    }

    /// Whether this record has the identity `(scope, project_path)`.
    pub fn has_identity(&self, scope: PluginScope, project_path: Option<&Path>) -> bool {
        self.scope == scope && self.project_path.as_deref() == project_path
    }

    /// Whether this record installs the plugin for `scope` in `project_path`.
    ///
    /// User records apply everywhere. Project records apply only to their own
    /// workspace. Local records without a workspace are treated as belonging
    /// to the current one.
    pub fn applies_to(&self, scope: PluginScope, project_path: Option<&Path>) -> bool {
        if self.scope != scope {
            return false;
        }
        match scope {
            PluginScope::User => true,
            PluginScope::Project => {
                project_path.is_some() && self.project_path.as_deref() == project_path
            }
            PluginScope::Local => match self.project_path.as_deref() {
                None => true,
                Some(own) => project_path == Some(own),
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.scope == PluginScope::Project && self.project_path.is_none() {
            return MissingProjectPathSnafu { scope: self.scope }.fail();
        }
        Ok(())
    }
}

/// Current time in the registry's timestamp format.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Default for InstalledPluginsRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl InstalledPluginsRegistry {
    /// Create a new empty registry.
    pub fn empty() -> Self {
        Self {
            version: REGISTRY_VERSION,
            plugins: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// Add a record unless one with the same identity already exists.
    ///
    /// Returns whether the record was inserted. An existing record is left as
    /// is, even when its version differs; use [`Self::replace`] to update.
    pub fn add(&mut self, plugin_id: &str, record: InstallRecord) -> Result<bool> {
        record.validate()?;
        let entries = self.plugins.entry(plugin_id.to_string()).or_default();

        if entries
            .iter()
            .any(|e| e.has_identity(record.scope, record.project_path.as_deref()))
        {
            return Ok(false);
        }
        entries.push(record);
        Ok(true)
    }

    /// Remove the record with identity `(scope, project_path)`.
    ///
    /// Deletes the plugin id when its last record goes.
    pub fn remove(
        &mut self,
        plugin_id: &str,
        scope: PluginScope,
        project_path: Option<&Path>,
    ) -> Option<InstallRecord> {
        let entries = self.plugins.get_mut(plugin_id)?;
        let pos = entries
            .iter()
            .position(|e| e.has_identity(scope, project_path))?;
        let removed = entries.remove(pos);

        if entries.is_empty() {
            self.plugins.remove(plugin_id);
        }

        Some(removed)
    }

    /// Replace the record with the same identity, or add it.
    ///
    /// Returns the previous record.
    pub fn replace(
        &mut self,
        plugin_id: &str,
        record: InstallRecord,
    ) -> Result<Option<InstallRecord>> {
        record.validate()?;
        let previous = self.remove(plugin_id, record.scope, record.project_path.as_deref());
        self.add(plugin_id, record)?;
        Ok(previous)
    }

    /// Get all entries for a plugin.
    pub fn get(&self, plugin_id: &str) -> Option<&[InstallRecord]> {
        self.plugins.get(plugin_id).map(Vec::as_slice)
    }

    /// Records of a plugin that apply to `scope` in `project_path`.
    pub fn records_at<'a>(
        &'a self,
        plugin_id: &str,
        scope: PluginScope,
        project_path: Option<&'a Path>,
    ) -> impl Iterator<Item = &'a InstallRecord> + 'a {
        self.get(plugin_id)
            .unwrap_or_default()
            .iter()
            .filter(move |r| r.applies_to(scope, project_path))
    }

    /// Whether the plugin has a record that applies to `scope` in `project_path`.
    pub fn is_installed_at(
        &self,
        plugin_id: &str,
        scope: PluginScope,
        project_path: Option<&Path>,
    ) -> bool {
        self.records_at(plugin_id, scope, project_path).next().is_some()
    }

    /// Check if there are no installed plugins.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Get all plugin IDs.
    pub fn all_plugin_ids(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Flatten into `(plugin_id, record)` pairs, records in insertion order.
    pub fn flatten(&self) -> Vec<(String, InstallRecord)> {
        self.plugins
            .iter()
            .flat_map(|(id, records)| records.iter().map(move |r| (id.clone(), r.clone())))
            .collect()
    }
}

#[cfg(test)]
#[path = "installed_registry.test.rs"]
mod tests;

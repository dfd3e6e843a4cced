//! Unified per-plugin view of install records and catalog metadata.
//!
//! [`merge_plugins`] is pure and deterministic; it is recomputed on every
//! refresh and never persisted.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::FixedOffset;
use serde::Deserialize;
use serde::Serialize;

use crate::catalog::CatalogEntry;
use crate::catalog::PluginContents;
use crate::catalog::split_plugin_id;
use crate::installed_registry::InstallRecord;
use crate::scope::PluginScope;

/// One plugin as seen by the orchestration layer and the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedPlugin {
    pub id: String,
    pub name: String,
    pub marketplace_name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub contents: Option<PluginContents>,
    pub source_dir: Option<PathBuf>,
    pub available_last_updated: Option<String>,
    pub user_install: Option<InstallRecord>,
    pub project_installs: Vec<InstallRecord>,
    pub local_install: Option<InstallRecord>,
}

impl MergedPlugin {
    fn from_id(id: &str) -> Self {
        let (name, marketplace) = split_plugin_id(id);
        Self {
            id: id.to_string(),
            name: name.to_string(),
            marketplace_name: marketplace.map(String::from),
            ..Default::default()
        }
    }

    /// All install records, user first, then project, then local.
    pub fn install_records(&self) -> impl Iterator<Item = &InstallRecord> {
        self.user_install
            .iter()
            .chain(self.project_installs.iter())
            .chain(self.local_install.iter())
    }

    pub fn is_installed(&self) -> bool {
        self.install_records().next().is_some()
    }

    /// Distinct scopes the plugin is installed at, in scope order.
    pub fn installed_scopes(&self) -> Vec<PluginScope> {
        let mut scopes = Vec::new();
        if self.user_install.is_some() {
            scopes.push(PluginScope::User);
        }
        if !self.project_installs.is_empty() {
            scopes.push(PluginScope::Project);
        }
        if self.local_install.is_some() {
            scopes.push(PluginScope::Local);
        }
        scopes
    }

    /// The record installing this plugin for `scope` in `project_path`.
    pub fn install_at(
        &self,
        scope: PluginScope,
        project_path: Option<&Path>,
    ) -> Option<&InstallRecord> {
        self.install_records().find(|r| r.applies_to(scope, project_path))
    }

    pub fn has_update(&self) -> bool {
        has_update(self)
    }

    fn route(&mut self, record: InstallRecord, project_path: Option<&Path>) {
        if self.version.is_none() && !record.version.is_empty() {
            self.version = Some(record.version.clone());
        }
        match record.scope {
            PluginScope::User => self.user_install = Some(record),
            PluginScope::Project => self.project_installs.push(record),
            PluginScope::Local => {
                // One local slot: the active workspace's record is never displaced.
                let keep = self
                    .local_install
                    .as_ref()
                    .is_some_and(|current| current.applies_to(PluginScope::Local, project_path));
                if !keep {
                    self.local_install = Some(record);
                }
            }
        }
    }

    fn absorb(&mut self, entry: &CatalogEntry) {
        // Catalog metadata may only replace existing values while nothing
        // install-sourced (a version) is known yet.
        let overwrite = self.version.is_none();

        if self.name.is_empty() {
            self.name = entry.name.clone();
        }
        if self.marketplace_name.is_none() {
            self.marketplace_name = Some(entry.marketplace_name.clone());
        }
        merge_field(&mut self.description, &entry.description, overwrite);
        merge_field(&mut self.author, &entry.author, overwrite);
        merge_field(&mut self.contents, &entry.contents, overwrite);
        merge_field(&mut self.source_dir, &entry.source_dir, overwrite);
        merge_field(&mut self.version, &entry.version, false);

        if let Some(incoming) = &entry.last_updated {
            let newer = match &self.available_last_updated {
                None => true,
                Some(current) => match (parse_instant(incoming), parse_instant(current)) {
                    (Some(a), Some(b)) => a > b,
                    (Some(_), None) => true,
                    (None, Some(_)) => false,
                    (None, None) => true,
                },
            };
            if newer {
                self.available_last_updated = Some(incoming.clone());
            }
        }
    }
}

fn merge_field<T: Clone>(slot: &mut Option<T>, incoming: &Option<T>, overwrite: bool) {
    if let Some(value) = incoming
        && (slot.is_none() || overwrite)
    {
        *slot = Some(value.clone());
    }
}

/// Merge install records with catalog entries.
///
/// Installed records are grouped first (routing by scope), then catalog
/// entries fill in metadata or add not-installed plugins. The result is
/// sorted by name case-insensitively, ties broken by id.
///
/// When several local records exist for one plugin, the one belonging to
/// `project_path` fills `local_install`.
pub fn merge_plugins(
    installed: &[(String, InstallRecord)],
    available: &[CatalogEntry],
    project_path: Option<&Path>,
) -> Vec<MergedPlugin> {
    let mut merged: Vec<MergedPlugin> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (id, record) in installed {
        let pos = *index.entry(id.clone()).or_insert_with(|| {
            merged.push(MergedPlugin::from_id(id));
            merged.len() - 1
        });
        merged[pos].route(record.clone(), project_path);
    }

    for entry in available {
        let id = entry.id();
        match index.get(&id) {
            Some(&pos) => merged[pos].absorb(entry),
            None => {
                let mut plugin = MergedPlugin {
                    id: id.clone(),
                    ..Default::default()
                };
                plugin.absorb(entry);
                index.insert(id, merged.len());
                merged.push(plugin);
            }
        }
    }

    merged.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    merged
}

/// Whether the catalog has something newer than every install of `plugin`.
///
/// False when the catalog has no timestamp or the plugin is not installed.
/// Timestamps are compared as parsed instants; unparseable ones are ignored.
pub fn has_update(plugin: &MergedPlugin) -> bool {
    let Some(available) = plugin
        .available_last_updated
        .as_deref()
        .and_then(parse_instant)
    else {
        return false;
    };

    let newest_install = plugin
        .install_records()
        .filter_map(|r| parse_instant(&r.last_updated))
        .max();

    match newest_install {
        Some(installed) => available > installed,
        None => false,
    }
}

fn parse_instant(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.trim()).ok()
}

#[cfg(test)]
#[path = "merge.test.rs"]
mod tests;

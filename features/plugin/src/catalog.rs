//! Catalog of plugins available from marketplaces.
//!
//! Marketplaces are checked out under `~/.claude/plugins/marketplaces/<name>/`.
//! Each carries `.claude-plugin/marketplace.json`; plugins vendored inside the
//! checkout may carry their own `.claude-plugin/plugin.json`, whose
//! `description`, `version` and `author` take precedence.

use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::error::Result;
use crate::error::plugin_error::IoSnafu;
use crate::marketplace_types::MarketplaceManifest;
use crate::marketplace_types::MarketplacePluginEntry;
use crate::marketplace_types::MarketplacePluginSource;
use crate::marketplace_types::PluginManifest;

/// Manifest directory inside marketplaces and plugins.
pub const MANIFEST_DIR: &str = ".claude-plugin";
pub const MARKETPLACE_MANIFEST: &str = "marketplace.json";
pub const PLUGIN_MANIFEST: &str = "plugin.json";
pub const MCP_CONFIG_FILE: &str = ".mcp.json";

/// Resources a plugin declares, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginContents {
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub agents: Vec<String>,
    #[serde(default)]
    pub mcp_servers: Vec<String>,
}

impl PluginContents {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
            && self.skills.is_empty()
            && self.agents.is_empty()
            && self.mcp_servers.is_empty()
    }
}

/// A plugin offered by a marketplace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Explicit id. Defaults to `name@marketplaceName`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    pub name: String,
    pub marketplace_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<PluginContents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl CatalogEntry {
    /// The plugin id this entry describes.
    pub fn id(&self) -> String {
        match &self.plugin_id {
            Some(id) => id.clone(),
            None => plugin_id(&self.name, &self.marketplace_name),
        }
    }
}

/// Build a `name@marketplace` plugin id.
pub fn plugin_id(name: &str, marketplace: &str) -> String {
    format!("{name}@{marketplace}")
}

/// Split a plugin id into `(name, marketplace)`.
pub fn split_plugin_id(id: &str) -> (&str, Option<&str>) {
    match id.rsplit_once('@') {
        Some((name, marketplace)) if !name.is_empty() => (name, Some(marketplace)),
        _ => (id, None),
    }
}

/// Source of catalog entries.
#[async_trait]
pub trait MarketplaceScanner: Send + Sync + std::fmt::Debug {
    /// List every plugin offered by every known marketplace.
    async fn scan_available_plugins(&self) -> Result<Vec<CatalogEntry>>;
}

/// A fixed catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl MarketplaceScanner for StaticCatalog {
    async fn scan_available_plugins(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.entries.clone())
    }
}

/// Scans marketplace checkouts on disk.
#[derive(Debug, Clone)]
pub struct FsMarketplaceScanner {
    marketplaces_dir: PathBuf,
}

impl FsMarketplaceScanner {
    pub fn new(marketplaces_dir: PathBuf) -> Self {
        Self { marketplaces_dir }
    }

    /// Scan synchronously.
    ///
    /// A marketplace with a missing or unreadable manifest is skipped with a
    /// warning so one broken checkout does not hide the others.
    pub fn scan(&self) -> Result<Vec<CatalogEntry>> {
        let dirs = match std::fs::read_dir(&self.marketplaces_dir) {
            Ok(dirs) => dirs,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %self.marketplaces_dir.display(), "No marketplaces directory");
                return Ok(Vec::new());
            }
            Err(e) => {
                return IoSnafu {
                    path: self.marketplaces_dir.clone(),
                    message: format!("Failed to list marketplaces: {e}"),
                }
                .fail();
            }
        };

        let mut market_dirs: Vec<PathBuf> = dirs
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        market_dirs.sort();

        let mut entries = Vec::new();
        for dir in market_dirs {
            let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(String::from) else {
                continue;
            };
            let manifest_path = dir.join(MANIFEST_DIR).join(MARKETPLACE_MANIFEST);
            let manifest = match load_json::<MarketplaceManifest>(&manifest_path) {
                Some(Ok(manifest)) => manifest,
                Some(Err(e)) => {
                    warn!(
                        marketplace = %name,
                        path = %manifest_path.display(),
                        error = %e,
                        "Invalid marketplace manifest, skipping"
                    );
                    continue;
                }
                None => {
                    debug!(marketplace = %name, "Marketplace has no manifest, skipping");
                    continue;
                }
            };
            let manifest_mtime = modified_timestamp(&manifest_path);

            for plugin in &manifest.plugins {
                entries.push(catalog_entry(&name, &dir, plugin, manifest_mtime.as_deref()));
            }
            debug!(marketplace = %name, plugins = manifest.plugins.len(), "Scanned marketplace");
        }

        Ok(entries)
    }
}

#[async_trait]
impl MarketplaceScanner for FsMarketplaceScanner {
    async fn scan_available_plugins(&self) -> Result<Vec<CatalogEntry>> {
        self.scan()
    }
}

fn catalog_entry(
    marketplace: &str,
    marketplace_dir: &Path,
    plugin: &MarketplacePluginEntry,
    manifest_mtime: Option<&str>,
) -> CatalogEntry {
    let source_dir = match &plugin.source {
        MarketplacePluginSource::RelativePath(rel) => {
            Some(marketplace_dir.join(rel.trim_start_matches("./")))
        }
        MarketplacePluginSource::Remote(_) => None,
    };

    let mut entry = CatalogEntry {
        plugin_id: None,
        name: plugin.name.clone(),
        marketplace_name: marketplace.to_string(),
        description: plugin.description.clone(),
        version: plugin.version.clone(),
        author: plugin.author.as_ref().map(|a| a.name().to_string()),
        contents: None,
        source_dir: None,
        last_updated: plugin.last_updated.clone(),
    };

    let Some(dir) = source_dir.filter(|d| d.is_dir()) else {
        if entry.last_updated.is_none() {
            entry.last_updated = manifest_mtime.map(String::from);
        }
        return entry;
    };

    let manifest_path = dir.join(MANIFEST_DIR).join(PLUGIN_MANIFEST);
    let manifest = match load_json::<PluginManifest>(&manifest_path) {
        Some(Ok(manifest)) => manifest,
        Some(Err(e)) => {
            warn!(
                plugin = %plugin.name,
                path = %manifest_path.display(),
                error = %e,
                "Invalid plugin manifest, using marketplace metadata"
            );
            PluginManifest::default()
        }
        None => PluginManifest::default(),
    };

    // plugin.json wins over marketplace.json.
    if manifest.description.is_some() {
        entry.description = manifest.description.clone();
    }
    if manifest.version.is_some() {
        entry.version = manifest.version.clone();
    }
    if let Some(author) = &manifest.author {
        entry.author = Some(author.name().to_string());
    }

    let contents = scan_contents(&dir, &manifest);
    entry.contents = (!contents.is_empty()).then_some(contents);
    if entry.last_updated.is_none() {
        entry.last_updated = modified_timestamp(&manifest_path)
            .or_else(|| manifest_mtime.map(String::from));
    }
    entry.source_dir = Some(dir);
    entry
}

/// Discover declared resources from the conventional plugin layout.
///
/// - `commands/*.md` and `agents/*.md` by file stem
/// - `skills/<name>/SKILL.md` by directory name
/// - MCP servers from `.mcp.json` and inline `mcpServers` in plugin.json
pub fn scan_contents(plugin_dir: &Path, manifest: &PluginManifest) -> PluginContents {
    let mut contents = PluginContents {
        commands: markdown_stems(&plugin_dir.join("commands")),
        skills: skill_dirs(&plugin_dir.join("skills")),
        agents: markdown_stems(&plugin_dir.join("agents")),
        mcp_servers: Vec::new(),
    };

    if let Some(Ok(mcp)) = load_json::<Value>(&plugin_dir.join(MCP_CONFIG_FILE)) {
        let servers = mcp.get("mcpServers").and_then(Value::as_object);
        if let Some(servers) = servers {
            contents.mcp_servers.extend(servers.keys().cloned());
        }
    }
    if let Some(servers) = &manifest.mcp_servers {
        contents.mcp_servers.extend(servers.keys().cloned());
    }
    contents.mcp_servers.sort();
    contents.mcp_servers.dedup();
    contents
}

fn markdown_stems(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
        .collect();
    names.sort();
    names
}

fn skill_dirs(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.join("SKILL.md").is_file())
        .filter_map(|p| p.file_name().and_then(|s| s.to_str()).map(String::from))
        .collect();
    names.sort();
    names
}

/// `None` when the file does not exist.
fn load_json<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Option<std::result::Result<T, String>> {
    let content = std::fs::read_to_string(path).ok()?;
    Some(serde_json::from_str(&content).map_err(|e| e.to_string()))
}

fn modified_timestamp(path: &Path) -> Option<String> {
    let modified: SystemTime = std::fs::metadata(path).ok()?.modified().ok()?;
    let time: DateTime<Utc> = modified.into();
    Some(time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
#[path = "catalog.test.rs"]
mod tests;

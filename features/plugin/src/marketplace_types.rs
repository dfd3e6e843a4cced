//! Pure data types for marketplace and plugin manifests.
//!
//! These mirror `.claude-plugin/marketplace.json` and
//! `.claude-plugin/plugin.json`. Unknown fields are ignored.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Where a marketplace-listed plugin's code comes from when it is not
/// vendored inside the marketplace checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum RemotePluginSource {
    /// A GitHub repository (owner/repo).
    Github {
        repo: String,
        #[serde(default, rename = "ref")]
        git_ref: Option<String>,
    },
    /// A generic git URL.
    #[serde(alias = "git")]
    Url {
        url: String,
        #[serde(default, rename = "ref")]
        git_ref: Option<String>,
    },
}

/// Where plugin code lives -- relative path or remote source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarketplacePluginSource {
    /// A relative path within the marketplace directory.
    RelativePath(String),
    /// A remote source (GitHub, git, etc.).
    Remote(RemotePluginSource),
}

/// Plugin author, either a bare name or a structured record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginAuthor {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl PluginAuthor {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Detailed { name, .. } => name,
        }
    }
}

/// A plugin listed in a marketplace manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplacePluginEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<PluginAuthor>,
    pub source: MarketplacePluginSource,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// The marketplace.json content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceManifest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub plugins: Vec<MarketplacePluginEntry>,
}

/// The plugin.json content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<PluginAuthor>,
    /// Inline MCP server definitions keyed by server name.
    #[serde(default)]
    pub mcp_servers: Option<Map<String, Value>>,
}

#[cfg(test)]
#[path = "marketplace_types.test.rs"]
mod tests;

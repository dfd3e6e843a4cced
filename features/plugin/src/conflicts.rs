//! Detection of resources declared by more than one plugin.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::merge::MergedPlugin;

/// Kind of resource a plugin can contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Mcp,
    Command,
    Skill,
    Agent,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mcp => "mcp",
            Self::Command => "command",
            Self::Skill => "skill",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource name claimed by two or more plugins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConflict {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    pub plugin_ids: Vec<String>,
}

/// Find every `(type, name)` declared by at least two distinct plugins.
///
/// A plugin listing the same resource twice does not conflict with itself.
/// Output is sorted by type, then name.
pub fn find_conflicts(plugins: &[MergedPlugin]) -> Vec<ResourceConflict> {
    let mut claims: BTreeMap<(ResourceType, String), Vec<String>> = BTreeMap::new();

    for plugin in plugins {
        let Some(contents) = &plugin.contents else {
            continue;
        };
        let declared = [
            (ResourceType::Mcp, &contents.mcp_servers),
            (ResourceType::Command, &contents.commands),
            (ResourceType::Skill, &contents.skills),
            (ResourceType::Agent, &contents.agents),
        ];
        for (resource_type, names) in declared {
            for name in names {
                let ids = claims.entry((resource_type, name.clone())).or_default();
                if !ids.contains(&plugin.id) {
                    ids.push(plugin.id.clone());
                }
            }
        }
    }

    claims
        .into_iter()
        .filter(|(_, ids)| ids.len() >= 2)
        .map(|((resource_type, name), plugin_ids)| ResourceConflict {
            resource_type,
            name,
            plugin_ids,
        })
        .collect()
}

#[cfg(test)]
#[path = "conflicts.test.rs"]
mod tests;

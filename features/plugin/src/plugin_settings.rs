//! Plugin enable/disable state inside a `settings.json` document.
//!
//! Settings files are shared with the rest of the tool, so the document is
//! kept as an open JSON object: only `enabledPlugins` is interpreted and every
//! other field is carried through untouched.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Key of the enabled-plugins map inside a settings document.
pub const ENABLED_PLUGINS_KEY: &str = "enabledPlugins";

/// A settings document of one scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginSettings {
    fields: Map<String, Value>,
}

impl PluginSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a plugin is enabled. Absence means disabled.
    pub fn is_enabled(&self, plugin_id: &str) -> bool {
        self.enabled_map()
            .and_then(|m| m.get(plugin_id))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Set the enabled state for a plugin.
    ///
    /// Enabling stores `true`; disabling removes the key. Returns whether the
    /// document changed.
    pub fn set_enabled(&mut self, plugin_id: &str, enabled: bool) -> bool {
        if enabled {
            let slot = self
                .fields
                .entry(ENABLED_PLUGINS_KEY)
                .or_insert_with(|| Value::Object(Map::new()));
            match slot {
                Value::Object(map) => {
                    let previous = map.insert(plugin_id.to_string(), Value::Bool(true));
                    previous != Some(Value::Bool(true))
                }
                other => {
                    // A non-object value here is not ours to interpret; replace it.
                    let mut map = Map::new();
                    map.insert(plugin_id.to_string(), Value::Bool(true));
                    *other = Value::Object(map);
                    true
                }
            }
        } else {
            match self.fields.get_mut(ENABLED_PLUGINS_KEY) {
                Some(Value::Object(map)) => map.remove(plugin_id).is_some(),
                _ => false,
            }
        }
    }

    /// Ids of all enabled plugins.
    ///
    /// Entries whose value is not `true` are not reported.
    pub fn enabled_plugins(&self) -> BTreeMap<String, bool> {
        self.enabled_map()
            .map(|m| {
                m.iter()
                    .filter(|(_, v)| v.as_bool() == Some(true))
                    .map(|(k, _)| (k.clone(), true))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fields this engine does not own.
    pub fn other_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter().filter(|(k, _)| k.as_str() != ENABLED_PLUGINS_KEY)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn enabled_map(&self) -> Option<&Map<String, Value>> {
        self.fields.get(ENABLED_PLUGINS_KEY)?.as_object()
    }
}

impl From<Map<String, Value>> for PluginSettings {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
#[path = "plugin_settings.test.rs"]
mod tests;

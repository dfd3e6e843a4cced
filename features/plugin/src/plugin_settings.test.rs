use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn settings(value: Value) -> PluginSettings {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_default_settings() {
    let settings = PluginSettings::default();
    assert!(settings.enabled_plugins().is_empty());
    assert!(!settings.is_enabled("any-plugin"));
}

#[test]
fn test_set_enabled_then_disabled_removes_key() {
    let mut settings = PluginSettings::new();
    assert!(settings.set_enabled("my-plugin@mp", true));
    assert!(settings.is_enabled("my-plugin@mp"));

    assert!(settings.set_enabled("my-plugin@mp", false));
    assert!(!settings.is_enabled("my-plugin@mp"));
    assert_eq!(
        serde_json::to_value(&settings).unwrap(),
        json!({"enabledPlugins": {}})
    );
}

#[test]
fn test_set_enabled_is_idempotent() {
    let mut settings = PluginSettings::new();
    assert!(settings.set_enabled("a@mp", true));
    assert!(!settings.set_enabled("a@mp", true));

    assert!(settings.set_enabled("a@mp", false));
    assert!(!settings.set_enabled("a@mp", false));
}

#[test]
fn test_other_fields_are_preserved() {
    let mut settings = settings(json!({
        "permissions": {"allow": ["Read"], "deny": []},
        "model": "opus",
        "enabledPlugins": {"a@mp": true}
    }));

    settings.set_enabled("b@mp", true);

    assert_eq!(
        serde_json::to_value(&settings).unwrap(),
        json!({
            "permissions": {"allow": ["Read"], "deny": []},
            "model": "opus",
            "enabledPlugins": {"a@mp": true, "b@mp": true}
        })
    );
    assert_eq!(settings.other_fields().count(), 2);
}

#[test]
fn test_explicit_false_reads_as_disabled() {
    let mut settings = settings(json!({"enabledPlugins": {"a@mp": false, "b@mp": true}}));
    assert!(!settings.is_enabled("a@mp"));
    assert_eq!(
        settings.enabled_plugins(),
        BTreeMap::from([("b@mp".to_string(), true)])
    );

    // Disabling clears the stale explicit false.
    assert!(settings.set_enabled("a@mp", false));
    assert_eq!(
        serde_json::to_value(&settings).unwrap(),
        json!({"enabledPlugins": {"b@mp": true}})
    );
}

#[test]
fn test_enable_replaces_non_object_value() {
    let mut settings = settings(json!({"enabledPlugins": ["legacy"]}));
    assert!(!settings.is_enabled("legacy"));

    settings.set_enabled("a@mp", true);
    assert_eq!(
        serde_json::to_value(&settings).unwrap(),
        json!({"enabledPlugins": {"a@mp": true}})
    );
}

#[test]
fn test_disable_on_missing_map_is_noop() {
    let mut settings = settings(json!({"theme": "dark"}));
    assert!(!settings.set_enabled("a@mp", false));
    assert_eq!(serde_json::to_value(&settings).unwrap(), json!({"theme": "dark"}));
}

use super::*;
use crate::document::MemoryDocumentStore;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;

fn disk_store(tmp: &tempfile::TempDir) -> ConfigStore {
    ConfigStore::on_disk(ClaudePaths::from_home(tmp.path().join("home").join(".claude")))
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn record(scope: PluginScope, version: &str, project: Option<&Path>) -> InstallRecord {
    InstallRecord::new(
        scope,
        PathBuf::from(format!("/cache/{version}")),
        version,
        project.map(Path::to_path_buf),
    )
}

#[test]
fn test_enable_twice_equals_once() {
    let tmp = tempfile::tempdir().unwrap();
    let store = disk_store(&tmp);
    let path = store.paths().user_settings();

    store.set_enabled_plugin(PluginScope::User, None, "a@mp", true).unwrap();
    let once = std::fs::read_to_string(&path).unwrap();
    store.set_enabled_plugin(PluginScope::User, None, "a@mp", true).unwrap();
    let twice = std::fs::read_to_string(&path).unwrap();
    assert_eq!(once, twice);

    store.set_enabled_plugin(PluginScope::User, None, "a@mp", false).unwrap();
    let disabled_once = std::fs::read_to_string(&path).unwrap();
    store.set_enabled_plugin(PluginScope::User, None, "a@mp", false).unwrap();
    assert_eq!(disabled_once, std::fs::read_to_string(&path).unwrap());
    assert!(
        store
            .read_enabled_plugins(PluginScope::User, None)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_unchanged_state_leaves_file_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let store = disk_store(&tmp);
    let path = store.paths().user_settings();

    store.set_enabled_plugin(PluginScope::User, None, "a@mp", false).unwrap();
    assert!(!path.exists());

    let compact = r#"{"enabledPlugins":{"a@mp":true},"theme":"dark"}"#;
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, compact).unwrap();

    store.set_enabled_plugin(PluginScope::User, None, "a@mp", true).unwrap();
    store.set_enabled_plugin(PluginScope::User, None, "b@mp", false).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), compact);
}

#[test]
fn test_enable_preserves_unrelated_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let store = disk_store(&tmp);
    let path = store.paths().user_settings();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{"permissions":{"allow":["Bash(git *)"],"deny":["Read(.env)"]},"enabledPlugins":{"a":true}}"#,
    )
    .unwrap();

    store.set_enabled_plugin(PluginScope::User, None, "b", true).unwrap();

    assert_eq!(
        read_json(&path),
        json!({
            "permissions": {"allow": ["Bash(git *)"], "deny": ["Read(.env)"]},
            "enabledPlugins": {"a": true, "b": true}
        })
    );
}

#[test]
fn test_read_enabled_plugins_missing_file() {
    let tmp = tempfile::tempdir().unwrap();
    let store = disk_store(&tmp);
    let project = tmp.path().join("work");

    assert!(store
        .read_enabled_plugins(PluginScope::Local, Some(&project))
        .unwrap()
        .is_empty());
    assert!(!project.exists());
}

#[test]
fn test_read_enabled_plugins_corrupt_file() {
    let tmp = tempfile::tempdir().unwrap();
    let store = disk_store(&tmp);
    let project = tmp.path().join("work");
    let path = project.join(".claude").join("settings.local.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{\"enabledPlugins\": {").unwrap();

    let err = store
        .read_enabled_plugins(PluginScope::Local, Some(&project))
        .unwrap_err();
    assert!(matches!(err, crate::PluginError::ConfigCorrupt { .. }));
    assert!(err.to_string().contains(&path.display().to_string()));

    // The corrupt file is never overwritten by a mutation either.
    assert!(store
        .set_enabled_plugin(PluginScope::Local, Some(&project), "a@mp", true)
        .is_err());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{\"enabledPlugins\": {"
    );
}

#[test]
fn test_project_scope_creates_claude_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let store = disk_store(&tmp);
    let project = tmp.path().join("workspace");
    std::fs::create_dir_all(&project).unwrap();

    store
        .set_enabled_plugin(
            PluginScope::Project,
            Some(&project),
            "looping@plugins-local",
            true,
        )
        .unwrap();

    let path = project.join(".claude").join("settings.json");
    assert_eq!(
        read_json(&path),
        json!({"enabledPlugins": {"looping@plugins-local": true}})
    );
}

#[test]
fn test_read_installed_plugins_missing_file() {
    let tmp = tempfile::tempdir().unwrap();
    let store = disk_store(&tmp);

    let registry = store.read_installed_plugins().unwrap();
    assert_eq!(
        serde_json::to_value(&registry).unwrap(),
        json!({"version": 2, "plugins": {}})
    );
}

#[test]
fn test_read_installed_plugins_corrupt_file() {
    let tmp = tempfile::tempdir().unwrap();
    let store = disk_store(&tmp);
    let path = store.paths().installed_plugins();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "not valid json").unwrap();

    let err = store.read_installed_plugins().unwrap_err();
    assert!(err.to_string().contains("installed_plugins.json"));
}

#[test]
fn test_registry_dedupe_and_key_removal() {
    let tmp = tempfile::tempdir().unwrap();
    let store = disk_store(&tmp);
    let project = tmp.path().join("w");

    assert!(store
        .add_install_entry("a@mp", record(PluginScope::Project, "1.0.0", Some(&project)))
        .unwrap());
    assert!(!store
        .add_install_entry("a@mp", record(PluginScope::Project, "1.0.0", Some(&project)))
        .unwrap());
    assert_eq!(
        store.read_installed_plugins().unwrap().get("a@mp").unwrap().len(),
        1
    );

    let removed = store
        .remove_install_entry("a@mp", PluginScope::Project, Some(&project))
        .unwrap();
    assert!(removed.is_some());

    let on_disk = read_json(&store.paths().installed_plugins());
    assert_eq!(on_disk, json!({"version": 2, "plugins": {}}));
}

#[test]
fn test_remove_missing_entry_does_not_create_file() {
    let tmp = tempfile::tempdir().unwrap();
    let store = disk_store(&tmp);

    assert!(store
        .remove_install_entry("ghost@mp", PluginScope::User, None)
        .unwrap()
        .is_none());
    assert!(!store.paths().installed_plugins().exists());
}

#[test]
fn test_replace_install_entry_bumps_version() {
    let store = ConfigStore::new(
        Arc::new(MemoryDocumentStore::new()),
        ClaudePaths::from_home("/home/u/.claude"),
    );
    store
        .add_install_entry("a@mp", record(PluginScope::User, "1.0.0", None))
        .unwrap();
    store
        .replace_install_entry("a@mp", record(PluginScope::User, "1.1.0", None))
        .unwrap();

    let registry = store.read_installed_plugins().unwrap();
    let entries = registry.get("a@mp").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].version, "1.1.0");
}

#[test]
fn test_memory_backend_isolated_per_scope_file() {
    let backend = Arc::new(MemoryDocumentStore::new());
    let store = ConfigStore::new(backend.clone(), ClaudePaths::from_home("/home/u/.claude"));
    let project = Path::new("/work/app");

    store
        .set_enabled_plugin(PluginScope::Project, Some(project), "a@mp", true)
        .unwrap();
    store
        .set_enabled_plugin(PluginScope::Local, Some(project), "b@mp", true)
        .unwrap();

    assert_eq!(
        backend.paths(),
        vec![
            PathBuf::from("/work/app/.claude/settings.json"),
            PathBuf::from("/work/app/.claude/settings.local.json"),
        ]
    );
    assert_eq!(
        store
            .read_enabled_plugins(PluginScope::Project, Some(project))
            .unwrap()
            .into_keys()
            .collect::<Vec<_>>(),
        vec!["a@mp".to_string()]
    );
}

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn make_entry(scope: PluginScope, version: &str, project: Option<&str>) -> InstallRecord {
    InstallRecord {
        scope,
        version: version.to_string(),
        install_path: PathBuf::from(format!("/cache/{scope}/plugin/{version}")),
        installed_at: "2025-01-01T00:00:00.000Z".to_string(),
        last_updated: "2025-01-01T00:00:00.000Z".to_string(),
        git_commit_sha: None,
        project_path: project.map(PathBuf::from),
        extra: Map::new(),
    }
}

#[test]
fn test_empty_registry() {
    let reg = InstalledPluginsRegistry::empty();
    assert_eq!(reg.version, 2);
    assert!(reg.is_empty());
    assert_eq!(
        serde_json::to_value(&reg).unwrap(),
        json!({"version": 2, "plugins": {}})
    );
}

#[test]
fn test_add_and_get() {
    let mut reg = InstalledPluginsRegistry::empty();
    assert!(reg.add("hello@mp", make_entry(PluginScope::User, "1.0.0", None)).unwrap());

    let entries = reg.get("hello@mp").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].version, "1.0.0");
    assert_eq!(entries[0].scope, PluginScope::User);
}

#[test]
fn test_add_same_identity_is_noop() {
    let mut reg = InstalledPluginsRegistry::empty();
    assert!(reg.add("hello@mp", make_entry(PluginScope::User, "1.0.0", None)).unwrap());
    assert!(!reg.add("hello@mp", make_entry(PluginScope::User, "2.0.0", None)).unwrap());

    let entries = reg.get("hello@mp").unwrap();
    assert_eq!(entries.len(), 1);
    // A straight re-add does not bump the version.
    assert_eq!(entries[0].version, "1.0.0");
}

#[test]
fn test_project_scope_allows_one_entry_per_project() {
    let mut reg = InstalledPluginsRegistry::empty();
    reg.add("hello@mp", make_entry(PluginScope::Project, "1.0.0", Some("/a")))
        .unwrap();
    reg.add("hello@mp", make_entry(PluginScope::Project, "1.0.0", Some("/b")))
        .unwrap();
    reg.add("hello@mp", make_entry(PluginScope::Project, "1.0.0", Some("/a")))
        .unwrap();

    assert_eq!(reg.get("hello@mp").unwrap().len(), 2);
}

#[test]
fn test_project_scope_requires_project_path() {
    let mut reg = InstalledPluginsRegistry::empty();
    let err = reg
        .add("hello@mp", make_entry(PluginScope::Project, "1.0.0", None))
        .unwrap_err();
    assert!(matches!(err, crate::PluginError::MissingProjectPath { .. }));
    assert!(reg.is_empty());
}

#[test]
fn test_remove() {
    let mut reg = InstalledPluginsRegistry::empty();
    reg.add("hello@mp", make_entry(PluginScope::User, "1.0.0", None)).unwrap();
    reg.add("hello@mp", make_entry(PluginScope::Project, "1.1.0", Some("/w")))
        .unwrap();

    let removed = reg.remove("hello@mp", PluginScope::User, None).unwrap();
    assert_eq!(removed.version, "1.0.0");

    let entries = reg.get("hello@mp").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].scope, PluginScope::Project);
}

#[test]
fn test_remove_requires_matching_project() {
    let mut reg = InstalledPluginsRegistry::empty();
    reg.add("hello@mp", make_entry(PluginScope::Project, "1.0.0", Some("/a")))
        .unwrap();

    assert!(reg
        .remove("hello@mp", PluginScope::Project, Some(Path::new("/b")))
        .is_none());
    assert!(reg
        .remove("hello@mp", PluginScope::Project, Some(Path::new("/a")))
        .is_some());
}

#[test]
fn test_remove_last_entry_removes_key() {
    let mut reg = InstalledPluginsRegistry::empty();
    reg.add("hello@mp", make_entry(PluginScope::User, "1.0.0", None)).unwrap();
    reg.remove("hello@mp", PluginScope::User, None);

    assert!(reg.get("hello@mp").is_none());
    assert!(reg.is_empty());
    assert_eq!(
        serde_json::to_value(&reg).unwrap(),
        json!({"version": 2, "plugins": {}})
    );
}

#[test]
fn test_remove_nonexistent() {
    let mut reg = InstalledPluginsRegistry::empty();
    assert!(reg.remove("nonexistent", PluginScope::User, None).is_none());
}

#[test]
fn test_replace_updates_version_in_place() {
    let mut reg = InstalledPluginsRegistry::empty();
    reg.add("hello@mp", make_entry(PluginScope::User, "1.0.0", None)).unwrap();

    let previous = reg
        .replace("hello@mp", make_entry(PluginScope::User, "2.0.0", None))
        .unwrap()
        .unwrap();
    assert_eq!(previous.version, "1.0.0");
    let entries = reg.get("hello@mp").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].version, "2.0.0");
}

#[test]
fn test_applies_to() {
    let user = make_entry(PluginScope::User, "1", None);
    assert!(user.applies_to(PluginScope::User, Some(Path::new("/any"))));
    assert!(!user.applies_to(PluginScope::Local, Some(Path::new("/any"))));

    let project = make_entry(PluginScope::Project, "1", Some("/w"));
    assert!(project.applies_to(PluginScope::Project, Some(Path::new("/w"))));
    assert!(!project.applies_to(PluginScope::Project, Some(Path::new("/other"))));
    assert!(!project.applies_to(PluginScope::Project, None));

    let local_unbound = make_entry(PluginScope::Local, "1", None);
    assert!(local_unbound.applies_to(PluginScope::Local, Some(Path::new("/w"))));

    let local_bound = make_entry(PluginScope::Local, "1", Some("/w"));
    assert!(local_bound.applies_to(PluginScope::Local, Some(Path::new("/w"))));
    assert!(!local_bound.applies_to(PluginScope::Local, Some(Path::new("/x"))));
}

#[test]
fn test_unknown_fields_survive_roundtrip() {
    let raw = json!({
        "version": 2,
        "plugins": {
            "a@mp": [{
                "scope": "user",
                "installPath": "/cache/a",
                "version": "1.0.0",
                "installedAt": "2025-01-01T00:00:00.000Z",
                "lastUpdated": "2025-01-01T00:00:00.000Z",
                "isLocal": true
            }]
        },
        "migratedFrom": 1
    });

    let reg: InstalledPluginsRegistry = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(serde_json::to_value(&reg).unwrap(), raw);
}

#[test]
fn test_flatten_and_ids() {
    let mut reg = InstalledPluginsRegistry::empty();
    reg.add("beta@mp", make_entry(PluginScope::User, "1", None)).unwrap();
    reg.add("alpha@mp", make_entry(PluginScope::Local, "1", Some("/w")))
        .unwrap();
    reg.add("alpha@mp", make_entry(PluginScope::User, "1", None)).unwrap();

    assert_eq!(reg.all_plugin_ids(), vec!["alpha@mp", "beta@mp"]);

    let flat: Vec<(String, PluginScope)> = reg
        .flatten()
        .into_iter()
        .map(|(id, r)| (id, r.scope))
        .collect();
    assert_eq!(
        flat,
        vec![
            ("alpha@mp".to_string(), PluginScope::Local),
            ("alpha@mp".to_string(), PluginScope::User),
            ("beta@mp".to_string(), PluginScope::User),
        ]
    );
}

#[test]
fn test_new_record_timestamps_parse() {
    let record = InstallRecord::new(PluginScope::User, PathBuf::from("/x"), "1.0.0", None);
    assert_eq!(record.installed_at, record.last_updated);
    assert!(chrono::DateTime::parse_from_rfc3339(&record.installed_at).is_ok());
    assert!(record.installed_at.ends_with('Z'));
}

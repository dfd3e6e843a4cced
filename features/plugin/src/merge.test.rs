use super::*;
use pretty_assertions::assert_eq;

fn record(scope: PluginScope, last_updated: &str) -> InstallRecord {
    let project = scope.requires_project().then(|| PathBuf::from("/work/app"));
    InstallRecord {
        last_updated: last_updated.to_string(),
        ..InstallRecord::new(scope, PathBuf::from("/cache/a"), "1.0.0", project)
    }
}

fn catalog(id: &str, description: &str) -> CatalogEntry {
    let (name, marketplace) = split_plugin_id(id);
    CatalogEntry {
        plugin_id: Some(id.to_string()),
        name: name.to_string(),
        marketplace_name: marketplace.unwrap_or_default().to_string(),
        description: Some(description.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_merge_installed_and_available() {
    let installed = vec![(
        "a@mp".to_string(),
        record(PluginScope::User, "2025-01-01T00:00:00.000Z"),
    )];
    let available = vec![catalog("b@mp", "e"), catalog("a@mp", "d")];

    let merged = merge_plugins(&installed, &available, None);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].id, "a@mp");
    assert_eq!(merged[1].id, "b@mp");
    assert!(merged[0].user_install.is_some());
    assert!(merged[1].user_install.is_none());
    assert_eq!(merged[0].description.as_deref(), Some("d"));
    assert_eq!(merged[0].marketplace_name.as_deref(), Some("mp"));
    assert!(!merged[1].is_installed());
}

#[test]
fn test_merge_routes_records_by_scope() {
    let installed = vec![
        ("a@mp".to_string(), record(PluginScope::User, "")),
        ("a@mp".to_string(), record(PluginScope::Project, "")),
        ("a@mp".to_string(), record(PluginScope::Local, "")),
    ];
    let merged = merge_plugins(&installed, &[], None);
    assert_eq!(merged.len(), 1);

    let plugin = &merged[0];
    assert_eq!(plugin.name, "a");
    assert_eq!(plugin.version.as_deref(), Some("1.0.0"));
    assert_eq!(plugin.project_installs.len(), 1);
    assert_eq!(
        plugin.installed_scopes(),
        vec![PluginScope::User, PluginScope::Project, PluginScope::Local]
    );
    assert!(
        plugin
            .install_at(PluginScope::Project, Some(Path::new("/work/app")))
            .is_some()
    );
    assert!(
        plugin
            .install_at(PluginScope::Project, Some(Path::new("/elsewhere")))
            .is_none()
    );
}

#[test]
fn test_local_slot_prefers_active_workspace() {
    let local = |project: &str| {
        InstallRecord::new(
            PluginScope::Local,
            PathBuf::from("/cache/a"),
            "1.0.0",
            Some(PathBuf::from(project)),
        )
    };
    let installed = vec![
        ("a@mp".to_string(), local("/work/app")),
        ("a@mp".to_string(), local("/elsewhere")),
    ];

    let merged = merge_plugins(&installed, &[], Some(Path::new("/work/app")));
    let slot = merged[0].local_install.as_ref().unwrap();
    assert_eq!(slot.project_path.as_deref(), Some(Path::new("/work/app")));
    assert!(
        merged[0]
            .install_at(PluginScope::Local, Some(Path::new("/work/app")))
            .is_some()
    );

    let reversed: Vec<_> = installed.into_iter().rev().collect();
    let merged = merge_plugins(&reversed, &[], Some(Path::new("/work/app")));
    let slot = merged[0].local_install.as_ref().unwrap();
    assert_eq!(slot.project_path.as_deref(), Some(Path::new("/work/app")));
}

#[test]
fn test_catalog_fills_gaps_but_keeps_versioned_fields() {
    let installed = vec![("a@mp".to_string(), record(PluginScope::User, ""))];
    let first = CatalogEntry {
        version: Some("9.9.9".to_string()),
        author: Some("Ada".to_string()),
        ..catalog("a@mp", "first")
    };
    let second = catalog("a@mp", "second");

    let merged = merge_plugins(&installed, &[first, second], None);
    let plugin = &merged[0];
    // Version came from the install record and is never replaced.
    assert_eq!(plugin.version.as_deref(), Some("1.0.0"));
    assert_eq!(plugin.description.as_deref(), Some("first"));
    assert_eq!(plugin.author.as_deref(), Some("Ada"));
}

#[test]
fn test_catalog_overwrites_while_unversioned() {
    let merged = merge_plugins(&[], &[catalog("a@mp", "first"), catalog("a@mp", "second")], None);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].description.as_deref(), Some("second"));
}

#[test]
fn test_available_last_updated_keeps_newest() {
    let older = CatalogEntry {
        last_updated: Some("2025-01-01T00:00:00.000Z".to_string()),
        ..catalog("a@mp", "d")
    };
    let newer = CatalogEntry {
        last_updated: Some("2025-06-01T00:00:00+02:00".to_string()),
        ..catalog("a@mp", "d")
    };
    let merged = merge_plugins(&[], &[newer, older], None);
    assert_eq!(
        merged[0].available_last_updated.as_deref(),
        Some("2025-06-01T00:00:00+02:00")
    );
}

#[test]
fn test_sort_is_case_insensitive_with_id_tiebreak() {
    let available = vec![
        catalog("beta@mp", "x"),
        catalog("Alpha@mp2", "x"),
        catalog("alpha@mp1", "x"),
    ];
    let ids: Vec<String> = merge_plugins(&[], &available, None)
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["Alpha@mp2", "alpha@mp1", "beta@mp"]);
}

#[test]
fn test_has_update_requires_install() {
    let plugin = MergedPlugin {
        id: "a@mp".to_string(),
        available_last_updated: Some("2030-01-01T00:00:00.000Z".to_string()),
        ..Default::default()
    };
    assert!(!has_update(&plugin));
}

#[test]
fn test_has_update_compares_instants() {
    let mut plugin = MergedPlugin {
        id: "a@mp".to_string(),
        available_last_updated: Some("2025-01-01T12:00:00+00:00".to_string()),
        user_install: Some(record(PluginScope::User, "2025-01-01T13:00:00.000+01:00")),
        ..Default::default()
    };
    // Same instant in different offsets: tie, no update.
    assert!(!plugin.has_update());

    plugin.local_install = Some(record(PluginScope::Local, "2024-12-31T00:00:00.000Z"));
    assert!(!plugin.has_update());

    plugin.available_last_updated = Some("2025-01-01T12:00:00.001Z".to_string());
    assert!(plugin.has_update());
}

#[test]
fn test_has_update_ignores_unparseable_timestamps() {
    let plugin = MergedPlugin {
        id: "a@mp".to_string(),
        available_last_updated: Some("2025-01-01T00:00:00.000Z".to_string()),
        user_install: Some(record(PluginScope::User, "yesterday")),
        ..Default::default()
    };
    assert!(!has_update(&plugin));

    let plugin = MergedPlugin {
        available_last_updated: Some("soon".to_string()),
        user_install: Some(record(PluginScope::User, "2020-01-01T00:00:00.000Z")),
        ..plugin
    };
    assert!(!has_update(&plugin));
}

#[test]
fn test_merged_plugin_serializes_camel_case() {
    let merged = merge_plugins(
        &[("a@mp".to_string(), record(PluginScope::User, ""))],
        &[],
        None,
    );
    let value = serde_json::to_value(&merged[0]).unwrap();
    assert!(value.get("userInstall").is_some());
    assert!(value.get("projectInstalls").is_some());
    assert_eq!(value["marketplaceName"], "mp");
}

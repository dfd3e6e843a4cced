use super::*;

#[test]
fn test_user_scope_ignores_project() {
    let paths = ClaudePaths::from_home("/home/u/.claude");
    let resolved =
        resolve_settings_path(&paths, PluginScope::User, Some(Path::new("/work/app"))).unwrap();
    assert_eq!(resolved, PathBuf::from("/home/u/.claude/settings.json"));
}

#[test]
fn test_project_and_local_paths() {
    let paths = ClaudePaths::from_home("/home/u/.claude");
    let project = Path::new("/work/app");

    assert_eq!(
        resolve_settings_path(&paths, PluginScope::Project, Some(project)).unwrap(),
        PathBuf::from("/work/app/.claude/settings.json")
    );
    assert_eq!(
        resolve_settings_path(&paths, PluginScope::Local, Some(project)).unwrap(),
        PathBuf::from("/work/app/.claude/settings.local.json")
    );
}

#[test]
fn test_project_scope_requires_path() {
    let paths = ClaudePaths::from_home("/home/u/.claude");
    let err = resolve_settings_path(&paths, PluginScope::Local, None).unwrap_err();
    assert!(matches!(err, crate::PluginError::MissingProjectPath { .. }));
}

#[test]
fn test_registry_and_marketplace_paths() {
    let paths = ClaudePaths::from_home("/home/u/.claude");
    assert_eq!(
        paths.installed_plugins(),
        PathBuf::from("/home/u/.claude/plugins/installed_plugins.json")
    );
    assert_eq!(
        paths.marketplaces_dir(),
        PathBuf::from("/home/u/.claude/plugins/marketplaces")
    );
}

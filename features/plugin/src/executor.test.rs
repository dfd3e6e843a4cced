use super::*;
use crate::catalog::CatalogEntry;
use crate::catalog::StaticCatalog;
use crate::document::MemoryDocumentStore;
use crate::error::PluginError;
use crate::paths::ClaudePaths;
use pretty_assertions::assert_eq;
use std::path::Path;

fn memory_store() -> ConfigStore {
    ConfigStore::new(
        Arc::new(MemoryDocumentStore::new()),
        ClaudePaths::from_home("/home/u/.claude"),
    )
}

fn looping_catalog(version: &str) -> Arc<StaticCatalog> {
    Arc::new(StaticCatalog::new(vec![CatalogEntry {
        name: "looping".to_string(),
        marketplace_name: "plugins-local".to_string(),
        version: Some(version.to_string()),
        source_dir: Some(PathBuf::from("/mp/plugins-local/plugins/looping")),
        ..Default::default()
    }]))
}

const ID: &str = "looping@plugins-local";

#[tokio::test]
async fn test_local_install_records_and_enables() {
    let store = memory_store();
    let project = PathBuf::from("/work/app");
    let executor =
        LocalExecutor::new(store.clone(), looping_catalog("1.0.0"), Some(project.clone()));

    executor.install(ID, PluginScope::Project).await.unwrap();

    let registry = store.read_installed_plugins().unwrap();
    let records = registry.get(ID).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].scope, PluginScope::Project);
    assert_eq!(records[0].version, "1.0.0");
    assert_eq!(records[0].project_path.as_deref(), Some(project.as_path()));
    assert_eq!(
        records[0].install_path,
        PathBuf::from("/mp/plugins-local/plugins/looping")
    );
    assert_eq!(
        store
            .read_enabled_plugins(PluginScope::Project, Some(&project))
            .unwrap()
            .get(ID),
        Some(&true)
    );
}

#[tokio::test]
async fn test_local_install_unknown_plugin() {
    let store = memory_store();
    let executor = LocalExecutor::new(store.clone(), looping_catalog("1.0.0"), None);

    let err = executor.install("ghost@mp", PluginScope::User).await.unwrap_err();
    assert!(matches!(err, PluginError::PluginNotFound { .. }));
    assert!(store.read_installed_plugins().unwrap().is_empty());
}

#[tokio::test]
async fn test_local_install_project_scope_needs_workspace() {
    let store = memory_store();
    let executor = LocalExecutor::new(store.clone(), looping_catalog("1.0.0"), None);

    let err = executor.install(ID, PluginScope::Project).await.unwrap_err();
    assert!(matches!(err, PluginError::MissingProjectPath { .. }));
    assert!(store.read_installed_plugins().unwrap().is_empty());
}

#[tokio::test]
async fn test_local_enable_disable() {
    let store = memory_store();
    let executor = LocalExecutor::new(store.clone(), looping_catalog("1.0.0"), None);

    executor.enable(ID, PluginScope::User).await.unwrap();
    executor.enable(ID, PluginScope::User).await.unwrap();
    assert_eq!(
        store.read_enabled_plugins(PluginScope::User, None).unwrap().len(),
        1
    );

    executor
        .run(PluginAction::Disable, ID, PluginScope::User)
        .await
        .unwrap();
    assert!(store.read_enabled_plugins(PluginScope::User, None).unwrap().is_empty());
}

#[tokio::test]
async fn test_local_update_refreshes_record() {
    let store = memory_store();
    let mut old = InstallRecord::new(
        PluginScope::User,
        PathBuf::from("/old"),
        "0.9.0",
        None,
    );
    old.installed_at = "2024-01-01T00:00:00.000Z".to_string();
    old.last_updated = "2024-01-01T00:00:00.000Z".to_string();
    store.add_install_entry(ID, old).unwrap();

    let executor = LocalExecutor::new(store.clone(), looping_catalog("1.1.0"), None);
    executor.update(ID, PluginScope::User).await.unwrap();

    let registry = store.read_installed_plugins().unwrap();
    let records = registry.get(ID).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].version, "1.1.0");
    assert_eq!(records[0].installed_at, "2024-01-01T00:00:00.000Z");
    assert!(records[0].last_updated.as_str() > "2024-01-01T00:00:00.000Z");
}

#[tokio::test]
async fn test_local_update_requires_install() {
    let executor = LocalExecutor::new(memory_store(), looping_catalog("1.0.0"), None);
    let err = executor.update(ID, PluginScope::User).await.unwrap_err();
    assert!(matches!(err, PluginError::PluginNotInstalled { .. }));
}

/// Writes a script named `plugin` that `sh plugin <args>` runs.
#[cfg(unix)]
fn cli_in(dir: &Path, script: &str) -> CliCommandExecutor {
    std::fs::write(dir.join("plugin"), script).unwrap();
    CliCommandExecutor::new(Some(dir.to_path_buf())).with_program("sh")
}

#[cfg(unix)]
#[tokio::test]
async fn test_cli_passes_action_id_and_scope() {
    let tmp = tempfile::tempdir().unwrap();
    let executor = cli_in(tmp.path(), "echo \"$@\" > calls.txt\n");

    executor.install(ID, PluginScope::Local).await.unwrap();

    let calls = std::fs::read_to_string(tmp.path().join("calls.txt")).unwrap();
    assert_eq!(calls.trim(), format!("install {ID} --scope local"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_cli_failure_carries_stderr() {
    let tmp = tempfile::tempdir().unwrap();
    let executor = cli_in(tmp.path(), "echo 'marketplace unreachable' >&2\nexit 3\n");

    let err = executor.enable(ID, PluginScope::User).await.unwrap_err();
    match err {
        PluginError::ExecutorFailure {
            action, message, ..
        } => {
            assert_eq!(action, "enable");
            assert_eq!(message, "marketplace unreachable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_cli_timeout() {
    let tmp = tempfile::tempdir().unwrap();
    let executor =
        cli_in(tmp.path(), "sleep 5\n").with_timeout(Duration::from_millis(100));

    let err = executor.update(ID, PluginScope::User).await.unwrap_err();
    assert!(matches!(err, PluginError::ExecutorTimeout { .. }));
}

#[tokio::test]
async fn test_cli_missing_program() {
    let executor = CliCommandExecutor::new(None).with_program("plugsync-no-such-program");
    let err = executor.disable(ID, PluginScope::User).await.unwrap_err();
    assert!(matches!(err, PluginError::ExecutorFailure { .. }));
    assert_eq!(executor.program(), "plugsync-no-such-program");
    assert_eq!(executor.timeout(), DEFAULT_TIMEOUT);
}

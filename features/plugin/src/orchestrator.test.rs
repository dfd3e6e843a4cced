use super::*;
use crate::catalog::CatalogEntry;
use crate::catalog::FsMarketplaceScanner;
use crate::catalog::StaticCatalog;
use crate::document::MemoryDocumentStore;
use crate::error::plugin_error::ExecutorFailureSnafu;
use crate::executor::LocalExecutor;
use crate::installed_registry::InstallRecord;
use crate::paths::ClaudePaths;
use crate::progress::OperationProgress;
use plugsync_error::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use tokio::sync::Notify;

type Call = (PluginAction, String, PluginScope);

/// Records calls and fails for selected plugin ids.
#[derive(Debug, Default)]
struct ScriptedExecutor {
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<String>>,
    gated: bool,
    started: Notify,
    release: Notify,
}

impl ScriptedExecutor {
    /// Every call waits for `release` after signalling `started`.
    fn gated() -> Self {
        Self {
            gated: true,
            ..Default::default()
        }
    }

    fn fail_on(&self, plugin_id: &str) {
        self.failing.lock().unwrap().insert(plugin_id.to_string());
    }

    fn succeed_on(&self, plugin_id: &str) {
        self.failing.lock().unwrap().remove(plugin_id);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(
        &self,
        action: PluginAction,
        plugin_id: &str,
        scope: PluginScope,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((action, plugin_id.to_string(), scope));
        if self.gated {
            self.started.notify_one();
            self.release.notified().await;
        }
        let fail = self.failing.lock().unwrap().contains(plugin_id);
        if fail {
            return ExecutorFailureSnafu {
                plugin_id,
                scope,
                action: action.to_string(),
                message: "scripted failure",
            }
            .fail();
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PluginCommandExecutor for ScriptedExecutor {
    async fn install(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        self.record(PluginAction::Install, plugin_id, scope).await
    }

    async fn enable(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        self.record(PluginAction::Enable, plugin_id, scope).await
    }

    async fn disable(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        self.record(PluginAction::Disable, plugin_id, scope).await
    }

    async fn update(&self, plugin_id: &str, scope: PluginScope) -> Result<()> {
        self.record(PluginAction::Update, plugin_id, scope).await
    }
}

const WORKSPACE: &str = "/work/app";

fn memory_store() -> ConfigStore {
    ConfigStore::new(
        Arc::new(MemoryDocumentStore::new()),
        ClaudePaths::from_home("/home/u/.claude"),
    )
}

fn catalog(ids: &[&str]) -> Arc<StaticCatalog> {
    Arc::new(StaticCatalog::new(
        ids.iter()
            .map(|id| {
                let (name, marketplace) = split_plugin_id(id);
                CatalogEntry {
                    name: name.to_string(),
                    marketplace_name: marketplace.unwrap_or_default().to_string(),
                    ..Default::default()
                }
            })
            .collect(),
    ))
}

fn orchestrator(store: ConfigStore, executor: Arc<ScriptedExecutor>) -> PluginOrchestrator {
    PluginOrchestrator::new(
        store,
        executor,
        catalog(&["a@mp", "b@mp", "c@mp"]),
        Some(PathBuf::from(WORKSPACE)),
    )
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn call(action: PluginAction, plugin_id: &str, scope: PluginScope) -> Call {
    (action, plugin_id.to_string(), scope)
}

fn install_record(scope: PluginScope, project: Option<&str>) -> InstallRecord {
    InstallRecord::new(scope, PathBuf::from("/cache"), "1.0.0", project.map(PathBuf::from))
}

#[tokio::test]
async fn test_bulk_enable_partial_failure() {
    let executor = Arc::new(ScriptedExecutor::default());
    executor.fail_on("b@mp");
    let orchestrator = orchestrator(memory_store(), executor.clone());
    let progress = orchestrator.subscribe_progress();

    let report = orchestrator
        .bulk_enable("mp", &ids(&["a@mp", "b@mp", "c@mp"]), PluginScope::User)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        executor.calls(),
        vec![
            call(PluginAction::Install, "a@mp", PluginScope::User),
            call(PluginAction::Install, "b@mp", PluginScope::User),
            call(PluginAction::Install, "c@mp", PluginScope::User),
        ]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].plugin_id, "b@mp");
    assert_eq!(report.failed[0].marketplace.as_deref(), Some("mp"));
    assert!(report.failed[0].message.contains("scripted failure"));
    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(
        report.progress,
        OperationProgress {
            action: BulkAction::Enable,
            current: 3,
            total: 3,
        }
    );
    assert!(report.progress.is_complete());
    assert!(!BulkReport::new(BulkAction::Enable, 3).progress.is_complete());
    assert_eq!(
        progress.borrow().clone(),
        Some(ProgressEvent {
            key: ProgressKey::Marketplace("mp".to_string()),
            progress: report.progress,
        })
    );
}

#[tokio::test]
async fn test_bulk_enable_skips_enabled_and_enables_installed() {
    let store = memory_store();
    store
        .set_enabled_plugin(PluginScope::User, None, "a@mp", true)
        .unwrap();
    store
        .add_install_entry("b@mp", install_record(PluginScope::User, None))
        .unwrap();
    let executor = Arc::new(ScriptedExecutor::default());
    let orchestrator = orchestrator(store, executor.clone());

    let report = orchestrator
        .bulk_enable("mp", &ids(&["a@mp", "b@mp", "b@mp"]), PluginScope::User)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        executor.calls(),
        vec![call(PluginAction::Enable, "b@mp", PluginScope::User)]
    );
    assert_eq!(report.progress.total, 1);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_bulk_disable_orders_by_item_then_scope() {
    let store = memory_store();
    let project = Some(Path::new(WORKSPACE));
    store
        .set_enabled_plugin(PluginScope::Local, project, "a@mp", true)
        .unwrap();
    store
        .set_enabled_plugin(PluginScope::User, None, "a@mp", true)
        .unwrap();
    store
        .set_enabled_plugin(PluginScope::Project, project, "b@mp", true)
        .unwrap();
    store
        .set_enabled_plugin(PluginScope::User, None, "other@elsewhere", true)
        .unwrap();
    let executor = Arc::new(ScriptedExecutor::default());
    let orchestrator = orchestrator(store, executor.clone());

    let report = orchestrator
        .bulk_disable("mp", &ids(&["a@mp", "b@mp", "c@mp"]))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        executor.calls(),
        vec![
            call(PluginAction::Disable, "a@mp", PluginScope::User),
            call(PluginAction::Disable, "a@mp", PluginScope::Local),
            call(PluginAction::Disable, "b@mp", PluginScope::Project),
        ]
    );
    assert_eq!(report.progress.action, BulkAction::Disable);
    assert_eq!(report.progress.current, 3);
}

#[tokio::test]
async fn test_concurrent_bulk_for_same_marketplace_is_noop() {
    let executor = Arc::new(ScriptedExecutor::gated());
    let orchestrator = orchestrator(memory_store(), executor.clone());
    let items = ids(&["a@mp"]);

    let (first, (second, other)) = tokio::join!(
        orchestrator.bulk_enable("mp", &items, PluginScope::User),
        async {
            executor.started.notified().await;
            let second = orchestrator
                .bulk_disable("mp", &items)
                .await
                .unwrap();
            // A different marketplace is not blocked.
            let other = orchestrator
                .bulk_enable("elsewhere", &[], PluginScope::User)
                .await
                .unwrap();
            executor.release.notify_one();
            (second, other)
        }
    );

    assert!(second.is_none());
    assert_eq!(other.unwrap().progress.total, 0);
    assert_eq!(first.unwrap().unwrap().succeeded.len(), 1);
    assert_eq!(executor.calls().len(), 1);

    // The guard is released once the first call returns.
    assert!(
        orchestrator
            .bulk_disable("mp", &items)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_concurrent_toggle_for_same_pair_is_skipped() {
    let executor = Arc::new(ScriptedExecutor::gated());
    let orchestrator = orchestrator(memory_store(), executor.clone());

    let (first, second) = tokio::join!(
        orchestrator.toggle("a@mp", PluginScope::User, true),
        async {
            executor.started.notified().await;
            let second = orchestrator.toggle("a@mp", PluginScope::User, false).await;
            executor.release.notify_one();
            second
        }
    );

    assert_eq!(first.unwrap(), ToggleOutcome::Installed);
    assert_eq!(second.unwrap(), ToggleOutcome::Skipped);
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_install_is_never_followed_by_enable() {
    let store = memory_store();
    let executor = Arc::new(ScriptedExecutor::default());
    let orchestrator = orchestrator(store.clone(), executor.clone());

    let outcome = orchestrator
        .toggle("a@mp", PluginScope::User, true)
        .await
        .unwrap();
    assert_eq!(outcome, ToggleOutcome::Installed);
    assert_eq!(
        executor.calls(),
        vec![call(PluginAction::Install, "a@mp", PluginScope::User)]
    );

    store
        .add_install_entry("a@mp", install_record(PluginScope::User, None))
        .unwrap();
    let outcome = orchestrator
        .toggle("a@mp", PluginScope::User, true)
        .await
        .unwrap();
    assert_eq!(outcome, ToggleOutcome::Enabled);
    assert_eq!(
        executor.calls().last(),
        Some(&call(PluginAction::Enable, "a@mp", PluginScope::User))
    );
}

#[tokio::test]
async fn test_project_record_of_other_workspace_means_install() {
    let store = memory_store();
    store
        .add_install_entry("a@mp", install_record(PluginScope::Project, Some("/elsewhere")))
        .unwrap();
    let executor = Arc::new(ScriptedExecutor::default());
    let orchestrator = orchestrator(store, executor.clone());

    let outcome = orchestrator
        .toggle("a@mp", PluginScope::Project, true)
        .await
        .unwrap();
    assert_eq!(outcome, ToggleOutcome::Installed);
}

#[tokio::test]
async fn test_disable_is_always_attempted() {
    let executor = Arc::new(ScriptedExecutor::default());
    let orchestrator = orchestrator(memory_store(), executor.clone());

    let outcome = orchestrator
        .toggle("never@mp", PluginScope::Local, false)
        .await
        .unwrap();
    assert_eq!(outcome, ToggleOutcome::Disabled);
    assert_eq!(
        executor.calls(),
        vec![call(PluginAction::Disable, "never@mp", PluginScope::Local)]
    );
}

#[tokio::test]
async fn test_toggle_error_is_keyed_and_cleared() {
    let executor = Arc::new(ScriptedExecutor::default());
    executor.fail_on("a@mp");
    let orchestrator = orchestrator(memory_store(), executor.clone());

    let err = orchestrator
        .toggle("a@mp", PluginScope::User, true)
        .await
        .unwrap_err();
    assert!(matches!(err, PluginError::ExecutorFailure { .. }));

    let message = orchestrator
        .toggle_error("a@mp", PluginScope::User, true)
        .unwrap();
    assert!(message.contains("scripted failure"));
    assert_eq!(orchestrator.toggle_error("a@mp", PluginScope::User, false), None);
    assert_eq!(orchestrator.toggle_error("a@mp", PluginScope::Local, true), None);
    // Other pairs are unaffected.
    assert_eq!(
        orchestrator
            .toggle("b@mp", PluginScope::User, true)
            .await
            .unwrap(),
        ToggleOutcome::Installed
    );

    let key = orchestrator.toggle_errors().into_keys().next().unwrap();
    assert_eq!(
        key,
        ToggleKey {
            plugin_id: "a@mp".to_string(),
            scope: PluginScope::User,
            enable: true,
        }
    );

    executor.succeed_on("a@mp");
    orchestrator.retry_toggle(&key).await.unwrap();
    assert!(orchestrator.toggle_errors().is_empty());
}

#[tokio::test]
async fn test_update_all_visits_installed_scopes_in_order() {
    let store = memory_store();
    store
        .add_install_entry("b@mp", install_record(PluginScope::User, None))
        .unwrap();
    store
        .add_install_entry("a@mp", install_record(PluginScope::Local, Some(WORKSPACE)))
        .unwrap();
    store
        .add_install_entry("a@mp", install_record(PluginScope::User, None))
        .unwrap();
    store
        .add_install_entry("b@mp", install_record(PluginScope::Project, Some("/elsewhere")))
        .unwrap();
    let executor = Arc::new(ScriptedExecutor::default());
    executor.fail_on("a@mp");
    let orchestrator = orchestrator(store, executor.clone());

    let report = orchestrator.update_all().await.unwrap().unwrap();

    assert_eq!(
        executor.calls(),
        vec![
            call(PluginAction::Update, "a@mp", PluginScope::User),
            call(PluginAction::Update, "a@mp", PluginScope::Local),
            call(PluginAction::Update, "b@mp", PluginScope::User),
        ]
    );
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed.iter().all(|e| e.plugin_id == "a@mp"));
    assert_eq!(report.progress.current, 3);
    assert_eq!(report.progress.total, 3);
    assert_eq!(orchestrator.merged_plugins().len(), 3);
}

#[tokio::test]
async fn test_update_all_finds_local_record_of_this_workspace() {
    let store = memory_store();
    store
        .add_install_entry("a@mp", install_record(PluginScope::Local, Some(WORKSPACE)))
        .unwrap();
    store
        .add_install_entry("a@mp", install_record(PluginScope::Local, Some("/elsewhere")))
        .unwrap();
    let executor = Arc::new(ScriptedExecutor::default());
    let orchestrator = orchestrator(store, executor.clone());

    let report = orchestrator.update_all().await.unwrap().unwrap();

    assert_eq!(
        executor.calls(),
        vec![call(PluginAction::Update, "a@mp", PluginScope::Local)]
    );
    assert_eq!(report.progress.total, 1);
    let merged = orchestrator.merged_plugins();
    let local = merged[0].local_install.as_ref().unwrap();
    assert_eq!(local.project_path.as_deref(), Some(Path::new(WORKSPACE)));
}

#[tokio::test]
async fn test_update_all_propagates_corrupt_registry() {
    let backend = Arc::new(MemoryDocumentStore::new());
    let paths = ClaudePaths::from_home("/home/u/.claude");
    backend.insert(paths.installed_plugins(), "{not json");
    let store = ConfigStore::new(backend, paths);
    let orchestrator = orchestrator(store, Arc::new(ScriptedExecutor::default()));

    let err = orchestrator.update_all().await.unwrap_err();
    assert!(matches!(err, PluginError::ConfigCorrupt { .. }));
    // The guard did not leak.
    assert!(matches!(
        orchestrator.update_all().await,
        Err(PluginError::ConfigCorrupt { .. })
    ));
}

#[tokio::test]
async fn test_handle_maps_requests() {
    let executor = Arc::new(ScriptedExecutor::default());
    executor.fail_on("c@mp");
    let orchestrator = orchestrator(memory_store(), executor.clone());

    let response = orchestrator
        .handle(PluginRequest::Enable {
            plugin_id: "a@mp".to_string(),
            scope: PluginScope::User,
        })
        .await;
    assert_eq!(
        response,
        PluginResponse::success(ResponsePayload::Outcome {
            outcome: ToggleOutcome::Installed
        })
    );

    let response = orchestrator.handle(PluginRequest::ListAvailable).await;
    match response {
        PluginResponse::Success {
            payload: ResponsePayload::Plugins { plugins },
        } => assert_eq!(plugins.len(), 3),
        other => panic!("unexpected response: {other:?}"),
    }

    let response = orchestrator
        .handle(PluginRequest::Update {
            plugin_id: "c@mp".to_string(),
            scope: PluginScope::User,
        })
        .await;
    match response {
        PluginResponse::Error { code, message } => {
            assert_eq!(code, StatusCode::ExecutorFailed as i32);
            assert!(message.contains("c@mp"));
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

fn setup_disk(tmp: &tempfile::TempDir) -> (ConfigStore, PathBuf) {
    let paths = ClaudePaths::from_home(tmp.path().join("home").join(".claude"));
    let manifest = paths
        .marketplaces_dir()
        .join("plugins-local")
        .join(".claude-plugin")
        .join("marketplace.json");
    std::fs::create_dir_all(manifest.parent().unwrap()).unwrap();
    std::fs::write(
        &manifest,
        json!({
            "name": "plugins-local",
            "plugins": [{"name": "looping", "source": "./plugins/looping", "version": "1.0.0"}]
        })
        .to_string(),
    )
    .unwrap();

    let project = tmp.path().join("work");
    std::fs::create_dir_all(&project).unwrap();
    (ConfigStore::on_disk(paths), project)
}

fn local_orchestrator(store: &ConfigStore, project: &Path) -> PluginOrchestrator {
    let scanner = Arc::new(FsMarketplaceScanner::new(store.paths().marketplaces_dir()));
    let executor = Arc::new(LocalExecutor::new(
        store.clone(),
        scanner.clone(),
        Some(project.to_path_buf()),
    ));
    PluginOrchestrator::new(store.clone(), executor, scanner, Some(project.to_path_buf()))
}

const LOOPING: &str = "looping@plugins-local";

#[tokio::test]
async fn test_project_scope_toggle_creates_settings() {
    let tmp = tempfile::tempdir().unwrap();
    let (store, project) = setup_disk(&tmp);
    assert!(!project.join(".claude").exists());
    let orchestrator = local_orchestrator(&store, &project);

    let outcome = orchestrator
        .toggle(LOOPING, PluginScope::Project, true)
        .await
        .unwrap();
    assert_eq!(outcome, ToggleOutcome::Installed);

    let settings: Value = serde_json::from_str(
        &std::fs::read_to_string(project.join(".claude").join("settings.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(settings, json!({"enabledPlugins": {"looping@plugins-local": true}}));

    let merged = orchestrator.merged_plugins();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].project_installs.len(), 1);
    assert_eq!(
        merged[0].project_installs[0].project_path.as_deref(),
        Some(project.as_path())
    );
}

#[tokio::test]
async fn test_enable_disable_enable_keeps_one_record() {
    let tmp = tempfile::tempdir().unwrap();
    let (store, project) = setup_disk(&tmp);
    let orchestrator = local_orchestrator(&store, &project);

    let outcomes = vec![
        orchestrator.toggle(LOOPING, PluginScope::User, true).await.unwrap(),
        orchestrator.toggle(LOOPING, PluginScope::User, false).await.unwrap(),
        orchestrator.toggle(LOOPING, PluginScope::User, true).await.unwrap(),
    ];
    assert_eq!(
        outcomes,
        vec![
            ToggleOutcome::Installed,
            ToggleOutcome::Disabled,
            ToggleOutcome::Enabled
        ]
    );

    let registry = store.read_installed_plugins().unwrap();
    assert_eq!(registry.get(LOOPING).unwrap().len(), 1);
    assert_eq!(
        store
            .read_enabled_plugins(PluginScope::User, None)
            .unwrap()
            .get(LOOPING),
        Some(&true)
    );
}

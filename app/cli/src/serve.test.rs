use super::*;
use plugsync_plugin::CatalogEntry;
use plugsync_plugin::ClaudePaths;
use plugsync_plugin::ConfigStore;
use plugsync_plugin::LocalExecutor;
use plugsync_plugin::MemoryDocumentStore;
use plugsync_plugin::PluginScope;
use plugsync_plugin::StaticCatalog;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use std::sync::Arc;

fn orchestrator() -> (PluginOrchestrator, ConfigStore) {
    let store = ConfigStore::new(
        Arc::new(MemoryDocumentStore::new()),
        ClaudePaths::from_home("/home/u/.claude"),
    );
    let catalog = Arc::new(StaticCatalog::new(vec![CatalogEntry {
        name: "looping".to_string(),
        marketplace_name: "plugins-local".to_string(),
        version: Some("1.0.0".to_string()),
        ..Default::default()
    }]));
    let executor = Arc::new(LocalExecutor::new(store.clone(), catalog.clone(), None));
    (
        PluginOrchestrator::new(store.clone(), executor, catalog, None),
        store,
    )
}

#[tokio::test]
async fn test_serve_answers_each_line() {
    let (orchestrator, store) = orchestrator();
    let input = concat!(
        r#"{"type":"enable","pluginId":"looping@plugins-local","scope":"user"}"#,
        "\n\n",
        "not json\n",
        r#"{"type":"disable","pluginId":"looping@plugins-local","scope":"project"}"#,
        "\n",
    );
    let mut output = Vec::new();

    serve(&orchestrator, input.as_bytes(), &mut output).await.unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(responses.len(), 3);
    assert_eq!(
        responses[0],
        json!({"status": "success", "payload": {"kind": "outcome", "outcome": "installed"}})
    );
    assert_eq!(responses[1]["status"], "error");
    assert_eq!(responses[1]["code"], StatusCode::ParseError as i32);
    // Project scope without a workspace is an ordinary error response.
    assert_eq!(responses[2]["status"], "error");
    assert_eq!(responses[2]["code"], StatusCode::InvalidArguments as i32);

    assert_eq!(
        store
            .read_enabled_plugins(PluginScope::User, None)
            .unwrap()
            .get("looping@plugins-local"),
        Some(&true)
    );
}

#[tokio::test]
async fn test_serve_empty_input() {
    let (orchestrator, _) = orchestrator();
    let mut output = Vec::new();
    serve(&orchestrator, &b""[..], &mut output).await.unwrap();
    assert!(output.is_empty());
}

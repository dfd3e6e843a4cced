use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn write(path: &Path, value: &Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "# doc\n").unwrap();
}

fn setup_marketplace(root: &Path) {
    let market = root.join("plugins-local");
    write(
        &market.join(MANIFEST_DIR).join(MARKETPLACE_MANIFEST),
        &json!({
            "name": "plugins-local",
            "plugins": [
                {
                    "name": "looping",
                    "source": "./plugins/looping",
                    "description": "from marketplace",
                    "version": "0.1.0"
                },
                {
                    "name": "remote",
                    "source": {"source": "github", "repo": "o/r"},
                    "description": "remote plugin",
                    "lastUpdated": "2025-03-01T00:00:00.000Z"
                }
            ]
        }),
    );

    let plugin = market.join("plugins").join("looping");
    write(
        &plugin.join(MANIFEST_DIR).join(PLUGIN_MANIFEST),
        &json!({
            "name": "looping",
            "description": "from plugin.json",
            "version": "1.0.0",
            "author": {"name": "Ada"},
            "mcpServers": {"loopd": {"command": "loopd"}}
        }),
    );
    touch(&plugin.join("commands").join("loop.md"));
    touch(&plugin.join("commands").join("notes.txt"));
    touch(&plugin.join("agents").join("looper.md"));
    touch(&plugin.join("skills").join("iterate").join("SKILL.md"));
    std::fs::create_dir_all(plugin.join("skills").join("empty")).unwrap();
    write(
        &plugin.join(MCP_CONFIG_FILE),
        &json!({"mcpServers": {"loopd": {}, "tracker": {}}}),
    );
}

#[test]
fn test_plugin_id_helpers() {
    assert_eq!(plugin_id("a", "mp"), "a@mp");
    assert_eq!(split_plugin_id("a@mp"), ("a", Some("mp")));
    assert_eq!(split_plugin_id("bare"), ("bare", None));
    assert_eq!(split_plugin_id("@scoped@mp"), ("@scoped", Some("mp")));

    let entry = CatalogEntry {
        name: "a".to_string(),
        marketplace_name: "mp".to_string(),
        ..Default::default()
    };
    assert_eq!(entry.id(), "a@mp");
    let explicit = CatalogEntry {
        plugin_id: Some("custom@elsewhere".to_string()),
        ..entry
    };
    assert_eq!(explicit.id(), "custom@elsewhere");
}

#[test]
fn test_scan_missing_dir_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let scanner = FsMarketplaceScanner::new(tmp.path().join("nope"));
    assert!(scanner.scan().unwrap().is_empty());
}

#[test]
fn test_scan_plugin_json_takes_precedence() {
    let tmp = tempfile::tempdir().unwrap();
    setup_marketplace(tmp.path());

    let entries = FsMarketplaceScanner::new(tmp.path().to_path_buf())
        .scan()
        .unwrap();
    assert_eq!(entries.len(), 2);

    let looping = &entries[0];
    assert_eq!(looping.id(), "looping@plugins-local");
    assert_eq!(looping.description.as_deref(), Some("from plugin.json"));
    assert_eq!(looping.version.as_deref(), Some("1.0.0"));
    assert_eq!(looping.author.as_deref(), Some("Ada"));
    assert!(looping.last_updated.is_some());
    assert_eq!(
        looping.source_dir.as_deref(),
        Some(tmp.path().join("plugins-local/plugins/looping").as_path())
    );
    assert_eq!(
        looping.contents,
        Some(PluginContents {
            commands: vec!["loop".to_string()],
            skills: vec!["iterate".to_string()],
            agents: vec!["looper".to_string()],
            mcp_servers: vec!["loopd".to_string(), "tracker".to_string()],
        })
    );
}

#[test]
fn test_scan_remote_source_keeps_marketplace_metadata() {
    let tmp = tempfile::tempdir().unwrap();
    setup_marketplace(tmp.path());

    let entries = FsMarketplaceScanner::new(tmp.path().to_path_buf())
        .scan()
        .unwrap();
    let remote = &entries[1];
    assert_eq!(remote.id(), "remote@plugins-local");
    assert_eq!(remote.description.as_deref(), Some("remote plugin"));
    assert_eq!(remote.source_dir, None);
    assert_eq!(remote.contents, None);
    assert_eq!(
        remote.last_updated.as_deref(),
        Some("2025-03-01T00:00:00.000Z")
    );
}

#[test]
fn test_scan_skips_broken_marketplace() {
    let tmp = tempfile::tempdir().unwrap();
    setup_marketplace(tmp.path());
    let broken = tmp.path().join("broken").join(MANIFEST_DIR).join(MARKETPLACE_MANIFEST);
    std::fs::create_dir_all(broken.parent().unwrap()).unwrap();
    std::fs::write(&broken, "{oops").unwrap();
    std::fs::create_dir_all(tmp.path().join("no-manifest")).unwrap();

    let entries = FsMarketplaceScanner::new(tmp.path().to_path_buf())
        .scan()
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.marketplace_name == "plugins-local"));
}

#[tokio::test]
async fn test_static_catalog() {
    let catalog = StaticCatalog::new(vec![CatalogEntry {
        name: "a".to_string(),
        marketplace_name: "mp".to_string(),
        ..Default::default()
    }]);
    let entries = catalog.scan_available_plugins().await.unwrap();
    assert_eq!(entries.len(), 1);
}

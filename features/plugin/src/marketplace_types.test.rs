use super::*;
use serde_json::json;

#[test]
fn test_relative_source() {
    let entry: MarketplacePluginEntry = serde_json::from_value(json!({
        "name": "looping",
        "source": "./plugins/looping",
        "description": "Loop helpers"
    }))
    .unwrap();
    assert_eq!(
        entry.source,
        MarketplacePluginSource::RelativePath("./plugins/looping".to_string())
    );
    assert_eq!(entry.description.as_deref(), Some("Loop helpers"));
}

#[test]
fn test_github_source() {
    let entry: MarketplacePluginEntry = serde_json::from_value(json!({
        "name": "remote",
        "source": {"source": "github", "repo": "owner/repo", "ref": "main"}
    }))
    .unwrap();
    if let MarketplacePluginSource::Remote(RemotePluginSource::Github { repo, git_ref }) =
        entry.source
    {
        assert_eq!(repo, "owner/repo");
        assert_eq!(git_ref.as_deref(), Some("main"));
    } else {
        panic!("Expected Github variant");
    }
}

#[test]
fn test_git_alias_maps_to_url() {
    let source: RemotePluginSource = serde_json::from_value(json!({
        "source": "git",
        "url": "https://example.com/repo.git"
    }))
    .unwrap();
    assert_eq!(
        source,
        RemotePluginSource::Url {
            url: "https://example.com/repo.git".to_string(),
            git_ref: None
        }
    );
}

#[test]
fn test_author_forms() {
    let plain: PluginAuthor = serde_json::from_value(json!("Ada")).unwrap();
    assert_eq!(plain.name(), "Ada");

    let detailed: PluginAuthor =
        serde_json::from_value(json!({"name": "Grace", "email": "g@example.com"})).unwrap();
    assert_eq!(detailed.name(), "Grace");
}

#[test]
fn test_plugin_manifest_ignores_unknown_fields() {
    let manifest: PluginManifest = serde_json::from_value(json!({
        "name": "looping",
        "version": "1.2.0",
        "hooks": "./hooks/hooks.json",
        "mcpServers": {"loopd": {"command": "loopd"}}
    }))
    .unwrap();
    assert_eq!(manifest.version.as_deref(), Some("1.2.0"));
    assert!(manifest.mcp_servers.unwrap().contains_key("loopd"));
}

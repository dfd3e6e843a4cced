use super::*;
use plugsync_plugin::BulkAction;
use plugsync_plugin::BulkError;
use plugsync_plugin::InstallRecord;
use plugsync_plugin::OperationProgress;
use plugsync_plugin::ResourceType;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

#[test]
fn test_render_plugins() {
    let mut installed = InstallRecord::new(PluginScope::User, PathBuf::from("/c"), "1.0.0", None);
    installed.last_updated = "2025-01-01T00:00:00.000Z".to_string();
    let plugins = vec![
        MergedPlugin {
            id: "a@mp".to_string(),
            name: "a".to_string(),
            version: Some("1.0.0".to_string()),
            description: Some("Does a".to_string()),
            available_last_updated: Some("2025-02-01T00:00:00.000Z".to_string()),
            user_install: Some(installed),
            ..Default::default()
        },
        MergedPlugin {
            id: "bb@mp".to_string(),
            name: "bb".to_string(),
            ..Default::default()
        },
    ];

    assert_eq!(
        render_plugins(&plugins),
        concat!(
            "a@mp   1.0.0       user  (update available)\n",
            "       Does a\n",
            "bb@mp  -           -\n",
        )
    );
    assert_eq!(render_plugins(&[]), "No plugins found.\n");
}

#[test]
fn test_render_report() {
    assert!(render_report(None).starts_with("Skipped"));

    let report = BulkReport {
        succeeded: Vec::new(),
        failed: vec![BulkError {
            marketplace: Some("mp".to_string()),
            plugin_id: "b@mp".to_string(),
            scope: PluginScope::User,
            message: "boom".to_string(),
        }],
        progress: OperationProgress {
            action: BulkAction::Enable,
            current: 1,
            total: 1,
        },
    };
    assert_eq!(
        render_report(Some(&report)),
        "0 succeeded, 1 failed (1/1)\n  b@mp (user): boom\n"
    );
}

#[test]
fn test_render_conflicts() {
    assert_eq!(render_conflicts(&[]), "No conflicts.\n");
    let conflicts = vec![ResourceConflict {
        resource_type: ResourceType::Command,
        name: "build".to_string(),
        plugin_ids: vec!["a@mp".to_string(), "b@mp".to_string()],
    }];
    assert_eq!(render_conflicts(&conflicts), "command build: a@mp, b@mp\n");
}

#[test]
fn test_render_outcome() {
    assert_eq!(
        render_outcome("a@mp", ToggleOutcome::Installed),
        "Installed a@mp\n"
    );
}

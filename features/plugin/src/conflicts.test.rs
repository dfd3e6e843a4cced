use super::*;
use crate::catalog::PluginContents;
use pretty_assertions::assert_eq;

fn plugin(id: &str, contents: PluginContents) -> MergedPlugin {
    MergedPlugin {
        id: id.to_string(),
        name: id.to_string(),
        contents: Some(contents),
        ..Default::default()
    }
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_no_conflicts_for_disjoint_plugins() {
    let plugins = vec![
        plugin(
            "a@mp",
            PluginContents {
                commands: names(&["build"]),
                ..Default::default()
            },
        ),
        plugin(
            "b@mp",
            PluginContents {
                commands: names(&["test"]),
                ..Default::default()
            },
        ),
    ];
    assert!(find_conflicts(&plugins).is_empty());
}

#[test]
fn test_conflicts_by_type_and_name() {
    let plugins = vec![
        plugin(
            "a@mp",
            PluginContents {
                commands: names(&["build"]),
                mcp_servers: names(&["github"]),
                ..Default::default()
            },
        ),
        plugin(
            "b@mp",
            PluginContents {
                commands: names(&["build"]),
                skills: names(&["github"]),
                ..Default::default()
            },
        ),
        plugin(
            "c@other",
            PluginContents {
                mcp_servers: names(&["github"]),
                ..Default::default()
            },
        ),
        plugin("d@mp", PluginContents::default()),
    ];

    let conflicts = find_conflicts(&plugins);
    assert_eq!(
        conflicts,
        vec![
            ResourceConflict {
                resource_type: ResourceType::Mcp,
                name: "github".to_string(),
                plugin_ids: names(&["a@mp", "c@other"]),
            },
            ResourceConflict {
                resource_type: ResourceType::Command,
                name: "build".to_string(),
                plugin_ids: names(&["a@mp", "b@mp"]),
            },
        ]
    );
}

#[test]
fn test_duplicates_inside_one_plugin_are_ignored() {
    let plugins = vec![plugin(
        "a@mp",
        PluginContents {
            agents: names(&["reviewer", "reviewer"]),
            ..Default::default()
        },
    )];
    assert!(find_conflicts(&plugins).is_empty());
}

#[test]
fn test_plugins_without_contents_are_skipped() {
    let bare = MergedPlugin {
        id: "a@mp".to_string(),
        ..Default::default()
    };
    assert!(find_conflicts(&[bare.clone(), bare]).is_empty());
}

#[test]
fn test_conflict_serializes_type_field() {
    let conflict = ResourceConflict {
        resource_type: ResourceType::Skill,
        name: "lint".to_string(),
        plugin_ids: names(&["a@mp", "b@mp"]),
    };
    let value = serde_json::to_value(&conflict).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"type": "skill", "name": "lint", "pluginIds": ["a@mp", "b@mp"]})
    );
    assert_eq!(ResourceType::Mcp.to_string(), "mcp");
}

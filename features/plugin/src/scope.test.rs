use super::*;

#[test]
fn test_scope_display() {
    assert_eq!(PluginScope::User.to_string(), "user");
    assert_eq!(PluginScope::Project.to_string(), "project");
    assert_eq!(PluginScope::Local.to_string(), "local");
}

#[test]
fn test_scope_from_str() {
    assert_eq!("user".parse::<PluginScope>().unwrap(), PluginScope::User);
    assert_eq!(" Project ".parse::<PluginScope>().unwrap(), PluginScope::Project);
    assert_eq!("LOCAL".parse::<PluginScope>().unwrap(), PluginScope::Local);

    let err = "global".parse::<PluginScope>().unwrap_err();
    assert!(err.to_string().contains("global"));
}

#[test]
fn test_scope_serde_lowercase() {
    let json = serde_json::to_string(&PluginScope::Local).unwrap();
    assert_eq!(json, "\"local\"");
    let scope: PluginScope = serde_json::from_str("\"project\"").unwrap();
    assert_eq!(scope, PluginScope::Project);
}

#[test]
fn test_requires_project() {
    assert!(!PluginScope::User.requires_project());
    assert!(PluginScope::Project.requires_project());
    assert!(PluginScope::Local.requires_project());
}

#[test]
fn test_scope_ordering() {
    let mut scopes = vec![PluginScope::Local, PluginScope::User, PluginScope::Project];
    scopes.sort();
    assert_eq!(scopes, PluginScope::ALL.to_vec());
}

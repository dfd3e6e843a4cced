use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_missing_file_is_default() {
    let tmp = tempfile::tempdir().unwrap();
    let config = load_config(&tmp.path().join(CONFIG_FILE)).unwrap();
    assert_eq!(config, CliConfig::default());
    assert_eq!(config.executor.kind, ExecutorKind::Cli);
    assert_eq!(config.executor.program, "claude");
}

#[test]
fn test_empty_file_is_default() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join(CONFIG_FILE);
    std::fs::write(&path, "  \n").unwrap();
    assert_eq!(load_config(&path).unwrap(), CliConfig::default());
}

#[test]
fn test_partial_file_merges_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join(CONFIG_FILE);
    std::fs::write(
        &path,
        r#"{"executor": {"kind": "local", "timeoutSecs": 5}, "logging": {"level": "debug"}}"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.executor.kind, ExecutorKind::Local);
    assert_eq!(config.executor.timeout(), Duration::from_secs(5));
    assert_eq!(config.executor.program, DEFAULT_PROGRAM);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_invalid_file_names_path() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join(CONFIG_FILE);
    std::fs::write(&path, "{oops").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(format!("{err}").contains(CONFIG_FILE));
}

#[test]
fn test_overrides_win() {
    let config = CliConfig::default().with_overrides(&ConfigOverrides {
        executor: Some(ExecutorKind::Local),
        timeout_secs: Some(9),
    });
    assert_eq!(config.executor.kind, ExecutorKind::Local);
    assert_eq!(config.executor.timeout_secs, 9);

    let untouched = CliConfig::default().with_overrides(&ConfigOverrides::default());
    assert_eq!(untouched, CliConfig::default());
}

#[test]
fn test_default_config_path() {
    let paths = ClaudePaths::from_home("/home/u/.claude");
    assert_eq!(
        default_config_path(&paths),
        PathBuf::from("/home/u/.claude/plugsync.json")
    );
}

use super::*;

#[test]
fn test_config_corrupt_mentions_path() {
    let err = plugin_error::ConfigCorruptSnafu {
        path: PathBuf::from("/home/u/.claude/settings.json"),
        message: "expected value at line 1 column 1".to_string(),
    }
    .build();
    assert!(err.to_string().contains("/home/u/.claude/settings.json"));
    assert_eq!(err.status_code(), StatusCode::ConfigFileError);
}

#[test]
fn test_executor_failure_display() {
    let err = plugin_error::ExecutorFailureSnafu {
        plugin_id: "looping@plugins-local".to_string(),
        scope: PluginScope::Project,
        action: "install".to_string(),
        message: "network unreachable".to_string(),
    }
    .build();
    assert_eq!(
        err.to_string(),
        "Failed to install looping@plugins-local (project): network unreachable"
    );
    assert!(err.is_retryable());
}

#[test]
fn test_error_status_codes() {
    let err = plugin_error::MissingProjectPathSnafu {
        scope: PluginScope::Local,
    }
    .build();
    assert_eq!(err.status_code(), StatusCode::InvalidArguments);

    let err = plugin_error::ExecutorTimeoutSnafu {
        plugin_id: "a@mp".to_string(),
        scope: PluginScope::User,
        action: "update".to_string(),
        seconds: 30_u64,
    }
    .build();
    assert_eq!(err.status_code(), StatusCode::ExecutorTimeout);
    assert!(err.to_string().contains("30s"));
}

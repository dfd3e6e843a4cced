use super::*;

#[test]
fn test_build_env_filter_with_default() {
    let filter = build_env_filter(&LoggingConfig::default(), None);
    assert!(format!("{filter}").contains("info"));
}

#[test]
fn test_build_env_filter_with_modules() {
    let logging = LoggingConfig {
        level: "warn".to_string(),
        modules: vec![
            "plugsync_plugin=debug".to_string(),
            "not a directive ===".to_string(),
        ],
        ..Default::default()
    };
    let filter = format!("{}", build_env_filter(&logging, None));
    assert!(filter.contains("warn"));
    assert!(filter.contains("plugsync_plugin=debug"));
}

#[test]
fn test_rust_log_wins() {
    let logging = LoggingConfig {
        level: "error".to_string(),
        ..Default::default()
    };
    let filter = format!("{}", build_env_filter(&logging, Some("trace")));
    assert!(filter.contains("trace"));
    assert!(!filter.contains("error"));

    let blank = format!("{}", build_env_filter(&logging, Some("  ")));
    assert!(blank.contains("error"));
}

#[test]
fn test_logging_config_partial_json() {
    let logging: LoggingConfig = serde_json::from_str(r#"{"modules": ["a=trace"]}"#).unwrap();
    assert_eq!(logging.level, DEFAULT_LEVEL);
    assert_eq!(logging.modules, vec!["a=trace".to_string()]);
}

use super::*;
use strum::IntoEnumIterator;

#[test]
fn test_status_code_values() {
    assert_eq!(StatusCode::Success as i32, 0);
    assert_eq!(StatusCode::Unknown as i32, 1_000);
    assert_eq!(StatusCode::InvalidArguments as i32, 2_000);
    assert_eq!(StatusCode::IoError as i32, 3_000);
    assert_eq!(StatusCode::InvalidConfig as i32, 10_000);
    assert_eq!(StatusCode::PluginNotFound as i32, 13_000);
}

#[test]
fn test_is_success() {
    assert!(StatusCode::is_success(0));
    assert!(!StatusCode::is_success(1_000));
}

#[test]
fn test_is_retryable() {
    assert!(StatusCode::ExecutorFailed.is_retryable());
    assert!(StatusCode::ExecutorTimeout.is_retryable());
    assert!(!StatusCode::ConfigFileError.is_retryable());
    assert!(!StatusCode::InvalidArguments.is_retryable());
}

#[test]
fn test_categories() {
    assert_eq!(StatusCode::IoError.category(), StatusCategory::IO);
    assert_eq!(StatusCode::ConfigFileError.category(), StatusCategory::Config);
    assert_eq!(StatusCode::ExecutorFailed.category(), StatusCategory::Plugin);
}

#[test]
fn test_from_i32_roundtrips_every_code() {
    for code in StatusCode::iter() {
        assert_eq!(StatusCode::from_i32(code as i32), Some(code));
    }
    assert_eq!(StatusCode::from_i32(99_999), None);
}

#[test]
fn test_name_matches_as_ref() {
    for code in StatusCode::iter() {
        assert_eq!(code.name(), code.as_ref());
    }
}

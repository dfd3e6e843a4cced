use super::*;

#[test]
fn test_plain_error() {
    let err = PlainError::new("bad scope", StatusCode::InvalidArguments);
    assert_eq!(err.status_code(), StatusCode::InvalidArguments);
    assert_eq!(err.to_string(), "bad scope");
    assert!(!err.is_retryable());
}

#[test]
fn test_plain_error_retryable() {
    let err = PlainError::new("claude exited with 1", StatusCode::ExecutorFailed);
    assert!(err.is_retryable());
}

#[test]
fn test_output_msg_hides_internal() {
    let err = PlainError::new("sensitive details", StatusCode::Internal);
    assert_eq!(err.output_msg(), "Internal error: 1001");
}

#[test]
fn test_output_msg_shows_user_errors() {
    let err = PlainError::new("Invalid scope: global", StatusCode::InvalidArguments);
    assert_eq!(err.output_msg(), "Invalid scope: global");
}

#[test]
fn test_downcast_through_as_any() {
    let err = PlainError::new("x", StatusCode::IoError);
    assert!(err.as_any().downcast_ref::<PlainError>().is_some());
}

use super::*;
use crate::progress::BulkAction;
use crate::progress::OperationProgress;
use plugsync_error::PlainError;
use plugsync_error::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_request_wire_format() {
    let request: PluginRequest = serde_json::from_value(json!({
        "type": "enable",
        "pluginId": "looping@plugins-local",
        "scope": "project"
    }))
    .unwrap();
    assert_eq!(
        request,
        PluginRequest::Enable {
            plugin_id: "looping@plugins-local".to_string(),
            scope: PluginScope::Project,
        }
    );

    let list: PluginRequest = serde_json::from_value(json!({"type": "listAvailable"})).unwrap();
    assert_eq!(list, PluginRequest::ListAvailable);
}

#[test]
fn test_bulk_request_fields() {
    let request = PluginRequest::BulkEnable {
        marketplace: "plugins-local".to_string(),
        plugin_ids: vec!["a@plugins-local".to_string()],
        scope: PluginScope::User,
    };
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "type": "bulkEnable",
            "marketplace": "plugins-local",
            "pluginIds": ["a@plugins-local"],
            "scope": "user"
        })
    );
}

#[test]
fn test_unknown_request_type_is_rejected() {
    let result = serde_json::from_value::<PluginRequest>(json!({"type": "uninstall"}));
    assert!(result.is_err());
}

#[test]
fn test_success_response_shape() {
    let response = PluginResponse::success(ResponsePayload::Outcome {
        outcome: ToggleOutcome::Installed,
    });
    assert!(response.is_success());
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"status": "success", "payload": {"kind": "outcome", "outcome": "installed"}})
    );
}

#[test]
fn test_bulk_response_shape() {
    let response = PluginResponse::success(ResponsePayload::Bulk {
        report: Some(BulkReport {
            succeeded: Vec::new(),
            failed: Vec::new(),
            progress: OperationProgress {
                action: BulkAction::Disable,
                current: 0,
                total: 0,
            },
        }),
    });
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(
        value["payload"]["report"]["progress"],
        json!({"action": "disable", "current": 0, "total": 0})
    );
    let back: PluginResponse = serde_json::from_value(value).unwrap();
    assert_eq!(back, response);
}

#[test]
fn test_error_response_from_error() {
    let error = PlainError::new("Failed to enable a@mp (user): boom", StatusCode::ExecutorFailed);
    let response = PluginResponse::from_error(&error);
    assert!(!response.is_success());
    assert_eq!(
        response,
        PluginResponse::Error {
            message: "Failed to enable a@mp (user): boom".to_string(),
            code: StatusCode::ExecutorFailed as i32,
        }
    );
}

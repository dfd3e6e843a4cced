//! Request/response vocabulary between a UI or transport and the
//! orchestrator.
//!
//! ```json
//! {"type": "enable", "pluginId": "looping@plugins-local", "scope": "project"}
//! {"status": "success", "payload": {"kind": "outcome", "outcome": "installed"}}
//! {"status": "error", "message": "Failed to enable ...", "code": 13002}
//! ```

use plugsync_error::ErrorExt;
use serde::Deserialize;
use serde::Serialize;

use crate::conflicts::ResourceConflict;
use crate::merge::MergedPlugin;
use crate::orchestrator::ToggleOutcome;
use crate::progress::BulkReport;
use crate::scope::PluginScope;

/// A request from the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PluginRequest {
    Install {
        plugin_id: String,
        scope: PluginScope,
    },
    Enable {
        plugin_id: String,
        scope: PluginScope,
    },
    Disable {
        plugin_id: String,
        scope: PluginScope,
    },
    Update {
        plugin_id: String,
        scope: PluginScope,
    },
    ListAvailable,
    UpdateAll,
    BulkEnable {
        marketplace: String,
        plugin_ids: Vec<String>,
        scope: PluginScope,
    },
    BulkDisable {
        marketplace: String,
        plugin_ids: Vec<String>,
    },
    ListConflicts,
}

/// Successful result of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResponsePayload {
    Outcome {
        outcome: ToggleOutcome,
    },
    Plugins {
        plugins: Vec<MergedPlugin>,
    },
    /// `None` when the bulk operation was already running.
    Bulk {
        report: Option<BulkReport>,
    },
    Conflicts {
        conflicts: Vec<ResourceConflict>,
    },
}

/// Reply to a [`PluginRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PluginResponse {
    Success {
        payload: ResponsePayload,
    },
    Error {
        message: String,
        code: i32,
    },
}

impl PluginResponse {
    pub fn success(payload: ResponsePayload) -> Self {
        Self::Success { payload }
    }

    pub fn error(message: impl Into<String>, code: plugsync_error::StatusCode) -> Self {
        Self::Error {
            message: message.into(),
            code: code as i32,
        }
    }

    pub fn from_error<E: ErrorExt>(error: &E) -> Self {
        Self::error(error.output_msg(), error.status_code())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[cfg(test)]
#[path = "protocol.test.rs"]
mod tests;

//! Progress and outcome types for bulk operations.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::scope::PluginScope;

/// What a bulk loop does to each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Enable,
    Disable,
    Update,
}

impl BulkAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{action, current, total}` after each completed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationProgress {
    pub action: BulkAction,
    pub current: usize,
    pub total: usize,
}

impl OperationProgress {
    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

/// Guard key of a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressKey {
    UpdateAll,
    Marketplace(String),
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdateAll => f.write_str("update-all"),
            Self::Marketplace(name) => write!(f, "marketplace:{name}"),
        }
    }
}

/// Progress published on the orchestrator's watch channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub key: ProgressKey,
    pub progress: OperationProgress,
}

/// One `(plugin, scope)` unit of a bulk loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItem {
    pub plugin_id: String,
    pub scope: PluginScope,
}

/// A failed item. Collected, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketplace: Option<String>,
    pub plugin_id: String,
    pub scope: PluginScope,
    pub message: String,
}

/// Result of a bulk loop that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    pub succeeded: Vec<BulkItem>,
    pub failed: Vec<BulkError>,
    pub progress: OperationProgress,
}

impl BulkReport {
    pub fn new(action: BulkAction, total: usize) -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            progress: OperationProgress {
                action,
                current: 0,
                total,
            },
        }
    }

    pub fn action(&self) -> BulkAction {
        self.progress.action
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

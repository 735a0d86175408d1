//! Request-side models shared by the proxy routes and the CLI.
//!
//! Workflows and executions themselves stay opaque JSON; only the few
//! parameters this system reads are typed.

use serde::{Deserialize, Serialize};

/// Query parameters accepted by `GET /executions`.
///
/// Unset fields are left out of the upstream query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ExecutionFilter {
    pub fn for_workflow(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: Some(workflow_id.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.workflow_id.is_none() && self.status.is_none() && self.limit.is_none()
    }
}

/// Body of the toggle call: `{ "active": true | false }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub active: bool,
}

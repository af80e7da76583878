//! PipelineRun resource
//!
//! Instantiates a Pipeline with concrete params and workspace bindings.

use crate::common::{Condition, ExtraFields, Param, PipelineRef, WorkspaceBinding};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// PipelineRunSpec defines which Pipeline to run and with what inputs
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "tekton.dev",
    version = "v1",
    kind = "PipelineRun",
    namespaced,
    status = "PipelineRunStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_ref: Option<PipelineRef>,

    /// Inline Pipeline definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_spec: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workspaces: Vec<WorkspaceBinding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_run_template: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutFields>,

    /// Requested lifecycle state, e.g. "Cancelled" or "PipelineRunPending"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Timeouts of the whole run and of its task groups (Go duration strings)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finally: Option<String>,
}

/// PipelineRunStatus is reported by the Tekton controller
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<chrono::DateTime<chrono::Utc>>,

    /// childReferences, pipelineSpec, provenance, ...
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl PipelineRunStatus {
    /// The `Succeeded` condition, if the controller has reported one
    pub fn succeeded(&self) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|c| c.condition_type == "Succeeded")
    }
}

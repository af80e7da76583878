//! Pipeline resource
//!
//! A Pipeline is a graph of Tasks wired together through params, results
//! and workspaces.

use crate::common::{ExtraFields, Param, ParamSpec, PipelineWorkspaceDeclaration, TaskRef, WorkspacePipelineTaskBinding};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// PipelineSpec defines the tasks and their ordering
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(group = "tekton.dev", version = "v1", kind = "Pipeline", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamSpec>,

    /// Tasks that make up the Pipeline graph
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<PipelineTask>,

    /// Tasks run after all of `tasks`, regardless of their outcome
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finally: Vec<PipelineTask>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workspaces: Vec<PipelineWorkspaceDeclaration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<Value>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A node of the Pipeline graph
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTask {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<TaskRef>,

    /// Inline Task definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_spec: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,

    /// Names of tasks that must complete before this one starts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub run_after: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workspaces: Vec<WorkspacePipelineTaskBinding>,

    /// when, retries, timeout, matrix, ...
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl PipelineSpec {
    /// Look up a task (including `finally` tasks) by name
    pub fn task(&self, name: &str) -> Option<&PipelineTask> {
        self.tasks
            .iter()
            .chain(self.finally.iter())
            .find(|t| t.name == name)
    }
}

//! TriggerTemplate resource
//!
//! Templates the resources (usually PipelineRuns) created when a trigger fires.

use crate::common::ParamSpec;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "triggers.tekton.dev",
    version = "v1beta1",
    kind = "TriggerTemplate",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct TriggerTemplateSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamSpec>,

    /// Resource manifests with `$(tt.params.*)` placeholders
    #[serde(default, rename = "resourcetemplates", skip_serializing_if = "Vec::is_empty")]
    pub resource_templates: Vec<Value>,
}

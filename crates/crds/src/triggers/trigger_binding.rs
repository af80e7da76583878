//! TriggerBinding resource
//!
//! Extracts fields from an event payload into named params.

use crate::common::Param;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "triggers.tekton.dev",
    version = "v1beta1",
    kind = "TriggerBinding",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct TriggerBindingSpec {
    /// Params whose values are JSONPath expressions over `body`, `header` and `extensions`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
}

//! EventListener resource
//!
//! Exposes an HTTP sink that evaluates triggers against incoming events.

use crate::common::{Condition, ExtraFields};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "triggers.tekton.dev",
    version = "v1beta1",
    kind = "EventListener",
    namespaced,
    status = "EventListenerStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct EventListenerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<EventListenerTrigger>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A trigger: bindings plus a template, optionally guarded by interceptors
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventListenerTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<TriggerSpecBinding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TriggerSpecTemplate>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interceptors: Vec<Value>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Reference to a (Cluster)TriggerBinding, or an inline name/value pair
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSpecBinding {
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub binding_ref: Option<String>,

    /// TriggerBinding or ClusterTriggerBinding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Reference to a TriggerTemplate
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSpecTemplate {
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub template_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventListenerStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Addressable URL of the listener's service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

//! Exportable manifest shape
//!
//! `TektonManifest` is the schema-agnostic view of any Tekton resource used
//! when handing a resource back to users as YAML. Only the metadata fields a
//! user would write by hand are kept; server-populated fields such as `uid`,
//! `managedFields` and `generation` are dropped on deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Annotation written by `kubectl apply` holding the previous manifest
pub const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Metadata subset kept in exported manifests
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestMetadata {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

/// A Tekton resource as `apiVersion`/`kind`/`metadata`/`spec`/`status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TektonManifest {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ManifestMetadata,
    #[serde(default = "empty_spec")]
    pub spec: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

impl TektonManifest {
    /// Strip the parts of a live resource that do not belong in a manifest:
    /// the `status` block and the last-applied-configuration annotation.
    pub fn into_export(mut self) -> Self {
        self.metadata.annotations.remove(LAST_APPLIED_ANNOTATION);
        self.status = None;
        if self.spec.is_null() {
            self.spec = empty_spec();
        }
        self
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

fn empty_spec() -> Value {
    Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn live_task() -> Value {
        json!({
            "apiVersion": "tekton.dev/v1",
            "kind": "Task",
            "metadata": {
                "name": "testtask",
                "namespace": "default",
                "uid": "0b6c5e0e-3f0e-4c42-9d0b-2d5f3c1f3a11",
                "generation": 3,
                "managedFields": [{"manager": "kubectl"}],
                "labels": {"app": "testtask"},
                "annotations": {
                    LAST_APPLIED_ANNOTATION: "{\"kind\":\"Task\"}",
                    "tekton.dev/tags": "cli"
                }
            },
            "spec": {"steps": [{"name": "tkn", "image": "tkn"}]},
            "status": {"podName": "x"}
        })
    }

    #[test]
    fn export_drops_status_and_last_applied() {
        let manifest: TektonManifest = serde_json::from_value(live_task()).unwrap();
        let exported = manifest.into_export();
        let yaml = exported.to_yaml().unwrap();

        let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert!(doc.get("status").is_none());
        assert!(!yaml.contains(LAST_APPLIED_ANNOTATION));
        assert!(!yaml.contains("managedFields"));
        assert!(!yaml.contains("uid"));
        assert!(yaml.contains("tekton.dev/tags: cli"));
        assert_eq!(doc["metadata"]["name"].as_str(), Some("testtask"));
    }

    #[test]
    fn export_without_annotations_omits_the_key() {
        let mut live = live_task();
        live["metadata"]
            .as_object_mut()
            .unwrap()
            .remove("annotations");
        let manifest: TektonManifest = serde_json::from_value(live).unwrap();
        let yaml = manifest.into_export().to_yaml().unwrap();
        assert!(!yaml.contains("annotations"));
    }

    #[test]
    fn missing_or_null_spec_exports_as_empty_mapping() {
        let mut live = live_task();
        live.as_object_mut().unwrap().remove("spec");
        let manifest: TektonManifest = serde_json::from_value(live.clone()).unwrap();
        let yaml = manifest.into_export().to_yaml().unwrap();
        assert!(yaml.contains("spec: {}"));

        live["spec"] = Value::Null;
        let manifest: TektonManifest = serde_json::from_value(live).unwrap();
        let yaml = manifest.into_export().to_yaml().unwrap();
        assert!(yaml.contains("spec: {}"));
        assert!(!yaml.contains("null"));
    }
}

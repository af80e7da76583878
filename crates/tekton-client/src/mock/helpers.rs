//! Helper functions for building fixture objects and manifests

use kube::api::DynamicObject;
use kube::core::{ObjectMeta, TypeMeta};
use tekton_crds::TektonKind;

/// An untyped object of `kind` with the given identity
pub fn object(kind: TektonKind, name: &str, namespace: Option<&str>) -> DynamicObject {
    DynamicObject {
        types: Some(TypeMeta {
            api_version: kind.api_version(),
            kind: kind.kind().to_string(),
        }),
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: namespace.map(str::to_string),
            ..ObjectMeta::default()
        },
        data: serde_json::json!({ "spec": {} }),
    }
}

/// YAML for a minimal Task running one `alpine` step
pub fn task_manifest(name: &str, namespace: Option<&str>) -> String {
    let namespace = namespace
        .map(|ns| format!("\n  namespace: {ns}"))
        .unwrap_or_default();
    format!(
        "apiVersion: tekton.dev/v1
kind: Task
metadata:
  name: {name}{namespace}
  labels:
    app: {name}
spec:
  steps:
  - name: echo
    image: alpine
    script: echo hello
"
    )
}

/// YAML for a minimal manifest of any Tekton kind
pub fn manifest(kind: TektonKind, name: &str, namespace: Option<&str>) -> String {
    let namespace = namespace
        .map(|ns| format!("\n  namespace: {ns}"))
        .unwrap_or_default();
    format!(
        "apiVersion: {}\nkind: {}\nmetadata:\n  name: {name}{namespace}\nspec: {{}}\n",
        kind.api_version(),
        kind.kind()
    )
}

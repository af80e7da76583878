//! Tekton Triggers facades (`triggers.tekton.dev/v1beta1`)

use super::ResourceApi;
use tekton_crds::{EventListener, TriggerBinding, TriggerTemplate};

pub type TriggerBindingApi = ResourceApi<TriggerBinding>;

pub type TriggerTemplateApi = ResourceApi<TriggerTemplate>;

pub type EventListenerApi = ResourceApi<EventListener>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::query::ListOptions;
    use crate::context::CallContext;
    use crate::mock::MockCluster;
    use crate::resources::test_support::facade;
    use kube::ResourceExt;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn event_listener_list_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/triggers.tekton.dev/v1beta1/namespaces/default/eventlisteners"))
            .and(query_param("fieldSelector", "metadata.name=github"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiVersion": "triggers.tekton.dev/v1beta1",
                "kind": "EventListenerList",
                "metadata": {"resourceVersion": "7"},
                "items": [{
                    "apiVersion": "triggers.tekton.dev/v1beta1",
                    "kind": "EventListener",
                    "metadata": {
                        "name": "github",
                        "namespace": "default",
                        "annotations": {"kubectl.kubernetes.io/last-applied-configuration": "{}"},
                        "managedFields": [{"manager": "kubectl", "operation": "Update"}]
                    },
                    "spec": {
                        "serviceAccountName": "tekton-triggers",
                        "triggers": [{
                            "name": "push",
                            "bindings": [{"ref": "github-push"}],
                            "template": {"ref": "build-template"}
                        }]
                    },
                    "status": {
                        "conditions": [{"type": "Ready", "status": "True"}],
                        "address": {"url": "http://el-github.default.svc.cluster.local:8080"}
                    }
                }]
            })))
            .mount(&server)
            .await;
        let listeners: EventListenerApi = facade(&server, MockCluster::with_tekton());

        let items = listeners
            .list(
                &CallContext::background(),
                &ListOptions::new().fields("metadata.name=github"),
            )
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        let el = &items[0];
        assert!(el.annotations().is_empty());
        assert!(el.metadata.managed_fields.is_none());
        assert_eq!(el.spec.service_account_name.as_deref(), Some("tekton-triggers"));
        assert_eq!(el.spec.triggers[0].bindings[0].binding_ref.as_deref(), Some("github-push"));
    }

    #[tokio::test]
    async fn trigger_template_get_yaml_keeps_resource_templates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/triggers.tekton.dev/v1beta1/namespaces/default/triggertemplates/build-template"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiVersion": "triggers.tekton.dev/v1beta1",
                "kind": "TriggerTemplate",
                "metadata": {"name": "build-template", "namespace": "default"},
                "spec": {
                    "params": [{"name": "revision"}],
                    "resourcetemplates": [{
                        "apiVersion": "tekton.dev/v1",
                        "kind": "PipelineRun",
                        "metadata": {"generateName": "build-run-"},
                        "spec": {"pipelineRef": {"name": "build"}}
                    }]
                }
            })))
            .mount(&server)
            .await;
        let templates: TriggerTemplateApi = facade(&server, MockCluster::with_tekton());

        let yaml = templates
            .get_yaml(&CallContext::background(), "build-template")
            .await
            .unwrap();

        assert!(yaml.starts_with("apiVersion: triggers.tekton.dev/v1beta1"));
        assert!(yaml.contains("resourcetemplates:"));
        assert!(yaml.contains("generateName: build-run-"));
    }

    #[tokio::test]
    async fn trigger_binding_create_then_update() {
        let server = MockServer::start().await;
        let cluster = MockCluster::with_tekton();
        let bindings: TriggerBindingApi = facade(&server, cluster.clone());
        let manifest = "apiVersion: triggers.tekton.dev/v1beta1
kind: TriggerBinding
metadata:
  name: github-push
  namespace: default
spec:
  params:
  - name: revision
    value: $(body.head_commit.id)
";
        let ctx = CallContext::background();

        assert_eq!(bindings.create(&ctx, manifest).await.unwrap().created(), 1);
        assert_eq!(bindings.create(&ctx, manifest).await.unwrap().updated(), 1);
        assert_eq!(cluster.creates(), 1);
        assert_eq!(cluster.updates(), 1);
    }
}

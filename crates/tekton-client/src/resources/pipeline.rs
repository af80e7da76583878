//! Tekton Pipelines facades (`tekton.dev/v1`)

use super::ResourceApi;
use tekton_crds::{Pipeline, PipelineRun, Task};

/// `/apis/tekton.dev/v1/namespaces/<ns>/tasks`
pub type TaskApi = ResourceApi<Task>;

/// `/apis/tekton.dev/v1/namespaces/<ns>/pipelines`
pub type PipelineApi = ResourceApi<Pipeline>;

/// `/apis/tekton.dev/v1/namespaces/<ns>/pipelineruns`
pub type PipelineRunApi = ResourceApi<PipelineRun>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::query::ListOptions;
    use crate::context::CallContext;
    use crate::error::TektonError;
    use crate::mock::MockCluster;
    use crate::mock::helpers::task_manifest;
    use crate::resources::test_support::facade;
    use kube::ResourceExt;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn task_json(name: &str) -> serde_json::Value {
        json!({
            "apiVersion": "tekton.dev/v1",
            "kind": "Task",
            "metadata": {
                "name": name,
                "namespace": "default",
                "labels": {"app": "testtask"},
                "resourceVersion": "42",
                "creationTimestamp": "2024-05-01T10:00:00Z",
                "annotations": {
                    "kubectl.kubernetes.io/last-applied-configuration": "{}",
                    "team": "ci"
                },
                "managedFields": [{"manager": "kubectl", "operation": "Update"}]
            },
            "spec": {"steps": [{"name": "echo", "image": "alpine", "script": "echo hello"}]},
            "status": {"observed": true}
        })
    }

    #[tokio::test]
    async fn list_sends_selectors_limit_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/tekton.dev/v1/namespaces/default/tasks"))
            .and(query_param("labelSelector", "app=testtask"))
            .and(query_param("limit", "3"))
            .and(header("authorization", "Bearer t0ken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiVersion": "tekton.dev/v1",
                "kind": "TaskList",
                "metadata": {},
                "items": [task_json("a"), task_json("b")]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let tasks: TaskApi = facade(&server, MockCluster::with_tekton());

        let items = tasks
            .list(
                &CallContext::background(),
                &ListOptions::new().labels("app=testtask").limit(3),
            )
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|t| t.labels().get("app").map(String::as_str) == Some("testtask")));
        assert!(!items[0].annotations().contains_key("kubectl.kubernetes.io/last-applied-configuration"));
        assert_eq!(items[0].annotations().get("team").map(String::as_str), Some("ci"));
        assert!(items[0].metadata.managed_fields.is_none());
        assert_eq!(items[0].spec.steps[0].image.as_deref(), Some("alpine"));
    }

    #[tokio::test]
    async fn list_defaults_to_five_hundred() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/tekton.dev/v1/namespaces/default/pipelines"))
            .and(query_param("limit", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;
        let pipelines: PipelineApi = facade(&server, MockCluster::with_tekton());

        let items = pipelines
            .list(&CallContext::background(), &ListOptions::default())
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn list_all_follows_continue_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/tekton.dev/v1/namespaces/default/tasks"))
            .and(query_param("continue", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metadata": {},
                "items": [task_json("b")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/apis/tekton.dev/v1/namespaces/default/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metadata": {"continue": "page2"},
                "items": [task_json("a")]
            })))
            .mount(&server)
            .await;
        let tasks: TaskApi = facade(&server, MockCluster::with_tekton());

        let names: Vec<String> = tasks
            .list_all(&CallContext::background(), &ListOptions::new().limit(1))
            .await
            .unwrap()
            .iter()
            .map(ResourceExt::name_any)
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[tokio::test]
    async fn get_returns_the_typed_resource() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/tekton.dev/v1/namespaces/default/tasks/testtask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_json("testtask")))
            .mount(&server)
            .await;
        let tasks: TaskApi = facade(&server, MockCluster::with_tekton());

        let task = tasks.get(&CallContext::background(), "testtask").await.unwrap();
        assert_eq!(task.name_any(), "testtask");
        assert_eq!(task.namespace().as_deref(), Some("default"));
    }

    #[tokio::test]
    async fn get_of_missing_resource_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/tekton.dev/v1/namespaces/default/tasks/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "kind": "Status",
                "message": "tasks.tekton.dev \"missing\" not found",
                "reason": "NotFound",
                "code": 404
            })))
            .mount(&server)
            .await;
        let tasks: TaskApi = facade(&server, MockCluster::with_tekton());

        let err = tasks.get(&CallContext::background(), "missing").await.unwrap_err();
        assert!(matches!(err, TektonError::NotFound(ref m) if m.contains("missing")));
    }

    #[tokio::test]
    async fn get_yaml_strips_status_and_last_applied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/tekton.dev/v1/namespaces/default/tasks/testtask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_json("testtask")))
            .mount(&server)
            .await;
        let tasks: TaskApi = facade(&server, MockCluster::with_tekton());

        let yaml = tasks
            .get_yaml(&CallContext::background(), "testtask")
            .await
            .unwrap();

        assert!(!yaml.contains("status"));
        assert!(!yaml.contains("last-applied-configuration"));
        assert!(!yaml.contains("managedFields"));
        assert!(yaml.contains("name: testtask"));
        assert!(yaml.contains("team: ci"));
        assert!(yaml.contains("image: alpine"));
    }

    #[tokio::test]
    async fn delete_issues_a_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/apis/tekton.dev/v1/namespaces/default/pipelineruns/run-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "Status", "status": "Success"})))
            .expect(1)
            .mount(&server)
            .await;
        let runs: PipelineRunApi = facade(&server, MockCluster::with_tekton());

        runs.delete(&CallContext::background(), "run-1").await.unwrap();
    }

    #[tokio::test]
    async fn delete_propagates_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "kind": "Status",
                "message": "pipelineruns.tekton.dev \"run-1\" is forbidden",
                "reason": "Forbidden",
                "code": 403
            })))
            .mount(&server)
            .await;
        let runs: PipelineRunApi = facade(&server, MockCluster::with_tekton());

        let err = runs.delete(&CallContext::background(), "run-1").await.unwrap_err();
        assert_eq!(err.status_code(), Some(403));
    }

    #[tokio::test]
    async fn create_applies_with_the_facade_kind() {
        let server = MockServer::start().await;
        let cluster = MockCluster::with_tekton();
        let tasks: TaskApi = facade(&server, cluster.clone());

        let outcome = tasks
            .create(&CallContext::background(), &task_manifest("testtask", Some("default")))
            .await
            .unwrap();
        assert_eq!(outcome.created(), 1);
        assert!(cluster.object("tasks", "default", "testtask").is_some());

        let pipelines: PipelineApi = facade(&server, cluster.clone());
        let err = pipelines
            .create(&CallContext::background(), &task_manifest("other", Some("default")))
            .await
            .unwrap_err();
        assert!(matches!(err, TektonError::KindMismatch { .. }));
    }

    #[test]
    fn paths_follow_the_resource_scope() {
        let server_uri = "http://127.0.0.1:1";
        let tasks: TaskApi = ResourceApi::from_parts(
            crate::common::HttpClient::new(reqwest::Client::new(), server_uri, false),
            std::sync::Arc::new(MockCluster::new()),
            "ci",
            secrecy::SecretString::from("x".to_string()),
        );
        assert_eq!(tasks.collection_path(), "/apis/tekton.dev/v1/namespaces/ci/tasks");
        assert_eq!(tasks.namespace(), "ci");
    }
}

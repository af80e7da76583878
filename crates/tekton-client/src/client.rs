//! Tekton client
//!
//! Entry point of the SDK: loads the cluster configuration once, then hands
//! out per-namespace facades for the six Tekton kinds.

use crate::apply::{ApplyEngine, ApplyOutcome};
use crate::cluster::KubeCluster;
use crate::cluster_trait::ClusterApi;
use crate::common::HttpClient;
use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::credentials::CredentialResolver;
use crate::error::TektonError;
use crate::resources::{
    EventListenerApi, PipelineApi, PipelineRunApi, ResourceApi, TaskApi, TriggerBindingApi,
    TriggerTemplateApi,
};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::NamespaceResourceScope;
use kube::Resource;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

/// Tekton Pipelines and Triggers client
pub struct TektonClient {
    config: ClientConfig,
    http: HttpClient,
    cluster: Arc<dyn ClusterApi>,
    credentials: CredentialResolver,
}

impl std::fmt::Debug for TektonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TektonClient")
            .field("base_url", &self.http.base_url())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl TektonClient {
    /// Connect using `config`
    ///
    /// Loads the kubeconfig named by the config (or the in-cluster
    /// configuration), builds the kube client used for discovery and applies,
    /// and the raw HTTP client used by the facades.
    pub async fn new(config: ClientConfig) -> Result<Self, TektonError> {
        let kube_config = load_kube_config(&config).await?;
        let preset = match config.bearer_token.clone() {
            Some(token) => Some(token),
            None => kube_token(&kube_config).await?,
        };
        let http = build_http(&config, &kube_config)?;
        let client = kube::Client::try_from(kube_config)?;
        info!("Connected Tekton client to {}", http.base_url());

        let credentials = CredentialResolver::new(config.secret_prefix.clone(), preset);
        Ok(Self {
            config,
            http,
            cluster: Arc::new(KubeCluster::new(client)),
            credentials,
        })
    }

    /// Assemble a client from already built parts
    pub fn from_parts(config: ClientConfig, http: HttpClient, cluster: Arc<dyn ClusterApi>) -> Self {
        let credentials =
            CredentialResolver::new(config.secret_prefix.clone(), config.bearer_token.clone());
        Self {
            config,
            http,
            cluster,
            credentials,
        }
    }

    /// Configuration the client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL of the API server the facades talk to
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Apply a manifest of any kind served by the cluster
    pub async fn apply(
        &self,
        ctx: &CallContext,
        namespace: &str,
        manifest: &str,
        expected_kind: &str,
    ) -> Result<ApplyOutcome, TektonError> {
        ApplyEngine::new(self.cluster.as_ref())
            .apply(ctx, namespace, manifest, expected_kind)
            .await
    }

    /// Bearer token the facades use for `namespace`
    pub async fn token(&self, ctx: &CallContext, namespace: &str) -> Result<SecretString, TektonError> {
        self.credentials
            .resolve(self.cluster.as_ref(), ctx, namespace)
            .await
    }

    async fn facade<K>(&self, ctx: &CallContext, namespace: &str) -> Result<ResourceApi<K>, TektonError>
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope> + DeserializeOwned,
    {
        let token = self.token(ctx, namespace).await?;
        debug!("Resolved credentials for {} in {}", K::kind(&()), namespace);
        Ok(ResourceApi::from_parts(
            self.http.clone(),
            Arc::clone(&self.cluster),
            namespace,
            token,
        ))
    }

    /// Task facade for `namespace`
    pub async fn task(&self, ctx: &CallContext, namespace: &str) -> Result<TaskApi, TektonError> {
        self.facade(ctx, namespace).await
    }

    /// Pipeline facade for `namespace`
    pub async fn pipeline(&self, ctx: &CallContext, namespace: &str) -> Result<PipelineApi, TektonError> {
        self.facade(ctx, namespace).await
    }

    /// PipelineRun facade for `namespace`
    pub async fn pipeline_run(
        &self,
        ctx: &CallContext,
        namespace: &str,
    ) -> Result<PipelineRunApi, TektonError> {
        self.facade(ctx, namespace).await
    }

    /// TriggerBinding facade for `namespace`
    pub async fn trigger_binding(
        &self,
        ctx: &CallContext,
        namespace: &str,
    ) -> Result<TriggerBindingApi, TektonError> {
        self.facade(ctx, namespace).await
    }

    /// TriggerTemplate facade for `namespace`
    pub async fn trigger_template(
        &self,
        ctx: &CallContext,
        namespace: &str,
    ) -> Result<TriggerTemplateApi, TektonError> {
        self.facade(ctx, namespace).await
    }

    /// EventListener facade for `namespace`
    pub async fn event_listener(
        &self,
        ctx: &CallContext,
        namespace: &str,
    ) -> Result<EventListenerApi, TektonError> {
        self.facade(ctx, namespace).await
    }
}

async fn load_kube_config(config: &ClientConfig) -> Result<kube::Config, TektonError> {
    match &config.kubeconfig {
        Some(path) => {
            debug!("Loading kubeconfig from {}", path.display());
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                TektonError::Config(format!("failed to read kubeconfig {}: {e}", path.display()))
            })?;
            let options = KubeConfigOptions {
                context: config.context.clone(),
                ..KubeConfigOptions::default()
            };
            kube::Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| TektonError::Config(format!("invalid kubeconfig {}: {e}", path.display())))
        }
        None => {
            debug!("Loading in-cluster configuration");
            kube::Config::incluster()
                .map_err(|e| TektonError::Config(format!("in-cluster configuration unavailable: {e}")))
        }
    }
}

/// Bearer token carried by the kube configuration itself, if any
async fn kube_token(kube_config: &kube::Config) -> Result<Option<SecretString>, TektonError> {
    if let Some(token) = &kube_config.auth_info.token {
        return Ok(Some(token.clone()));
    }
    match &kube_config.auth_info.token_file {
        Some(path) => {
            let token = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| TektonError::Config(format!("failed to read token file {path}: {e}")))?;
            let token = token.trim();
            Ok((!token.is_empty()).then(|| SecretString::from(token.to_string())))
        }
        None => Ok(None),
    }
}

fn build_http(config: &ClientConfig, kube_config: &kube::Config) -> Result<HttpClient, TektonError> {
    let mut builder = reqwest::Client::builder()
        .timeout(config.timeout)
        .danger_accept_invalid_certs(
            config.insecure_skip_tls_verify || kube_config.accept_invalid_certs,
        );
    for der in kube_config.root_cert.iter().flatten() {
        builder = builder.add_root_certificate(reqwest::Certificate::from_der(der)?);
    }
    Ok(HttpClient::new(
        builder.build()?,
        kube_config.cluster_url.to_string(),
        config.debug,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::query::ListOptions;
    use crate::mock::MockCluster;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_with(server: &MockServer, cluster: MockCluster, config: ClientConfig) -> TektonClient {
        TektonClient::from_parts(
            config,
            HttpClient::new(reqwest::Client::new(), server.uri(), false),
            Arc::new(cluster),
        )
    }

    #[tokio::test]
    async fn facades_authenticate_with_the_namespace_secret() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/tekton.dev/v1/namespaces/ci/pipelineruns"))
            .and(header("authorization", "Bearer ci-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;
        let cluster = MockCluster::with_tekton();
        cluster.add_secret("ci", "tekton-sa-token-x1", Some("ci-token"));
        let client = client_with(
            &server,
            cluster,
            ClientConfig::new().with_secret_prefix("tekton-sa-token"),
        );
        let ctx = CallContext::background();

        let runs = client.pipeline_run(&ctx, "ci").await.unwrap();
        runs.list(&ctx, &ListOptions::default()).await.unwrap();
        assert_eq!(runs.namespace(), "ci");
    }

    #[tokio::test]
    async fn facade_without_a_token_fails_to_build() {
        let server = MockServer::start().await;
        let client = client_with(
            &server,
            MockCluster::with_tekton(),
            ClientConfig::new().with_secret_prefix("missing"),
        );

        let err = client
            .event_listener(&CallContext::background(), "default")
            .await
            .unwrap_err();
        assert!(matches!(err, TektonError::Authentication(_)));
    }

    #[tokio::test]
    async fn configured_token_wins_over_secrets() {
        let server = MockServer::start().await;
        let cluster = MockCluster::with_tekton();
        cluster.add_secret("default", "default-token-x", Some("secret-token"));
        let client = client_with(
            &server,
            cluster.clone(),
            ClientConfig::new().with_bearer_token("configured"),
        );

        let token = client.token(&CallContext::background(), "default").await.unwrap();
        assert_eq!(token.expose_secret(), "configured");
        assert!(cluster.calls().is_empty());
    }

    #[tokio::test]
    async fn apply_accepts_any_served_kind() {
        let server = MockServer::start().await;
        let cluster = MockCluster::with_tekton();
        let client = client_with(&server, cluster.clone(), ClientConfig::new());
        let manifest = "apiVersion: tekton.dev/v1\nkind: TaskRun\nmetadata:\n  name: run-1\nspec:\n  taskRef:\n    name: testtask\n";

        let outcome = client
            .apply(&CallContext::background(), "default", manifest, "TaskRun")
            .await
            .unwrap();
        assert_eq!(outcome.created(), 1);
        assert!(cluster.object("taskruns", "default", "run-1").is_some());
    }

    #[tokio::test]
    async fn new_reads_server_and_token_from_kubeconfig() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/tekton.dev/v1/namespaces/default/tasks/testtask"))
            .and(header("authorization", "Bearer kubeconfig-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiVersion": "tekton.dev/v1",
                "kind": "Task",
                "metadata": {"name": "testtask", "namespace": "default"},
                "spec": {}
            })))
            .expect(1)
            .mount(&server)
            .await;
        let kubeconfig = format!(
            "apiVersion: v1
kind: Config
current-context: test
clusters:
- name: test
  cluster:
    server: {}
contexts:
- name: test
  context:
    cluster: test
    user: tester
users:
- name: tester
  user:
    token: kubeconfig-token
",
            server.uri()
        );
        let path = std::env::temp_dir().join(format!("tekton-kubeconfig-{}", std::process::id()));
        std::fs::write(&path, kubeconfig).unwrap();

        let client = TektonClient::new(ClientConfig::new().with_kubeconfig(&path))
            .await
            .unwrap();
        let ctx = CallContext::background();
        let task = client
            .task(&ctx, "default")
            .await
            .unwrap()
            .get(&ctx, "testtask")
            .await
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(task.metadata.name.as_deref(), Some("testtask"));
        assert_eq!(client.base_url(), server.uri());
    }

    #[tokio::test]
    async fn unreadable_kubeconfig_is_a_config_error() {
        let err = TektonClient::new(ClientConfig::new().with_kubeconfig("/nonexistent/kubeconfig"))
            .await
            .unwrap_err();
        assert!(matches!(err, TektonError::Config(ref m) if m.contains("/nonexistent/kubeconfig")));
    }
}

//! kube-backed `ClusterApi`
//!
//! Discovery, untyped get/create/update and secret listing on top of a
//! `kube::Client`. Every call races the caller's `CallContext`.

use crate::cluster_trait::{ClusterApi, SecretToken};
use crate::context::CallContext;
use crate::error::{TektonError, from_kube};
use crate::mapper::{DiscoveredResource, ResourceMapping};
use k8s_openapi::api::core::v1::Secret;
use kube::api::{ApiResource, DynamicObject, ListParams, PostParams};
use kube::discovery::{Discovery, Scope};
use kube::{Api, Client};
use tracing::debug;

/// `ClusterApi` talking to a real API server
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl std::fmt::Debug for KubeCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeCluster")
            .field("default_namespace", &self.client.default_namespace())
            .finish_non_exhaustive()
    }
}

impl KubeCluster {
    /// Wrap a connected kube client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The underlying kube client
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn dynamic_api(&self, mapping: &ResourceMapping, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = ApiResource::from_gvk_with_plural(&mapping.gvk, &mapping.gvr.resource);
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}

#[async_trait::async_trait]
impl ClusterApi for KubeCluster {
    async fn discover(
        &self,
        ctx: &CallContext,
        group: &str,
        version: &str,
    ) -> Result<Vec<DiscoveredResource>, TektonError> {
        ctx.run(async {
            let discovery = Discovery::new(self.client.clone())
                .filter(&[group])
                .run()
                .await
                .map_err(from_kube)?;

            let resources: Vec<DiscoveredResource> = discovery
                .groups()
                .filter(|g| g.name() == group)
                .flat_map(|g| g.versioned_resources(version))
                .map(|(resource, caps)| {
                    DiscoveredResource::new(
                        resource.plural,
                        resource.kind,
                        caps.scope == Scope::Namespaced,
                    )
                })
                .collect();
            debug!(
                "Discovery found {} resource(s) in {}/{}",
                resources.len(),
                group,
                version
            );
            Ok(resources)
        })
        .await
    }

    async fn get(
        &self,
        ctx: &CallContext,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, TektonError> {
        let api = self.dynamic_api(mapping, namespace);
        ctx.run(async { api.get(name).await.map_err(from_kube) }).await
    }

    async fn create(
        &self,
        ctx: &CallContext,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> Result<DynamicObject, TektonError> {
        let api = self.dynamic_api(mapping, namespace);
        ctx.run(async {
            api.create(&PostParams::default(), object)
                .await
                .map_err(from_kube)
        })
        .await
    }

    async fn update(
        &self,
        ctx: &CallContext,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> Result<DynamicObject, TektonError> {
        let api = self.dynamic_api(mapping, namespace);
        let name = object.metadata.name.clone().unwrap_or_default();
        ctx.run(async {
            api.replace(&name, &PostParams::default(), object)
                .await
                .map_err(from_kube)
        })
        .await
    }

    async fn list_secrets(
        &self,
        ctx: &CallContext,
        namespace: &str,
    ) -> Result<Vec<SecretToken>, TektonError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secrets = ctx
            .run(async { api.list(&ListParams::default()).await.map_err(from_kube) })
            .await?;

        Ok(secrets
            .items
            .into_iter()
            .map(|secret| SecretToken {
                name: secret.metadata.name.unwrap_or_default(),
                token: secret
                    .data
                    .as_ref()
                    .and_then(|data| data.get("token"))
                    .map(|bytes| String::from_utf8_lossy(&bytes.0).into_owned()),
            })
            .collect())
    }
}

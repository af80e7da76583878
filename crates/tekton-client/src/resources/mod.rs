//! Per-kind resource facades
//!
//! `ResourceApi<K>` is a thin REST wrapper scoped to one namespace: list,
//! get, get-yaml and delete go straight to the API server over HTTP with the
//! namespace's bearer token, create hands the manifest to the apply engine
//! with `K`'s kind as the expected kind.

pub mod pipeline;
pub mod triggers;

pub use pipeline::{PipelineApi, PipelineRunApi, TaskApi};
pub use triggers::{EventListenerApi, TriggerBindingApi, TriggerTemplateApi};

use crate::apply::{ApplyEngine, ApplyOutcome};
use crate::cluster_trait::ClusterApi;
use crate::common::HttpClient;
use crate::common::query::{ListOptions, query_all, query_page};
use crate::context::CallContext;
use crate::error::TektonError;
use kube::core::NamespaceResourceScope;
use kube::{Resource, ResourceExt};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tekton_crds::{LAST_APPLIED_ANNOTATION, TektonManifest};
use tracing::debug;

/// REST facade for one namespaced resource kind
pub struct ResourceApi<K> {
    http: HttpClient,
    cluster: Arc<dyn ClusterApi>,
    namespace: String,
    token: SecretString,
    _kind: PhantomData<fn() -> K>,
}

impl<K> std::fmt::Debug for ResourceApi<K>
where
    K: Resource<DynamicType = ()>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceApi")
            .field("kind", &K::kind(&()))
            .field("namespace", &self.namespace)
            .field("base_url", &self.http.base_url())
            .finish_non_exhaustive()
    }
}

impl<K> ResourceApi<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope> + DeserializeOwned,
{
    /// Build a facade from an HTTP client, a cluster and an already resolved token
    pub fn from_parts(
        http: HttpClient,
        cluster: Arc<dyn ClusterApi>,
        namespace: impl Into<String>,
        token: SecretString,
    ) -> Self {
        Self {
            http,
            cluster,
            namespace: namespace.into(),
            token,
            _kind: PhantomData,
        }
    }

    /// Namespace every call is scoped to
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `/apis/<group>/<version>/namespaces/<ns>/<plural>`
    pub fn collection_path(&self) -> String {
        K::url_path(&(), Some(self.namespace.as_str()))
    }

    fn item_path(&self, name: &str) -> String {
        format!("{}/{}", self.collection_path(), urlencoding::encode(name))
    }

    /// List one page of resources matching `opts`, at most `limit` items
    pub async fn list(&self, ctx: &CallContext, opts: &ListOptions) -> Result<Vec<K>, TektonError> {
        debug!("Listing {} in {}", K::plural(&()), self.namespace);
        let page = query_page(&self.http, ctx, &self.collection_path(), &self.token, opts).await?;
        Ok(page.items.into_iter().map(normalize).collect())
    }

    /// List every matching resource, following continue tokens
    pub async fn list_all(
        &self,
        ctx: &CallContext,
        opts: &ListOptions,
    ) -> Result<Vec<K>, TektonError> {
        debug!("Listing all {} in {}", K::plural(&()), self.namespace);
        let items: Vec<K> =
            query_all(&self.http, ctx, &self.collection_path(), &self.token, opts).await?;
        Ok(items.into_iter().map(normalize).collect())
    }

    /// Fetch one resource by name
    pub async fn get(&self, ctx: &CallContext, name: &str) -> Result<K, TektonError> {
        debug!("Getting {} {}/{}", K::kind(&()), self.namespace, name);
        self.http.get(ctx, &self.item_path(name), &self.token).await
    }

    /// Fetch one resource as manifest YAML, without `status` and without the
    /// last-applied-configuration annotation
    pub async fn get_yaml(&self, ctx: &CallContext, name: &str) -> Result<String, TektonError> {
        debug!("Getting {} {}/{} as YAML", K::kind(&()), self.namespace, name);
        let manifest: TektonManifest = self.http.get(ctx, &self.item_path(name), &self.token).await?;
        Ok(manifest.into_export().to_yaml()?)
    }

    /// Delete one resource by name
    pub async fn delete(&self, ctx: &CallContext, name: &str) -> Result<(), TektonError> {
        debug!("Deleting {} {}/{}", K::kind(&()), self.namespace, name);
        self.http.delete(ctx, &self.item_path(name), &self.token).await
    }

    /// Create or update every document of `manifest`, which must all be of this kind
    pub async fn create(&self, ctx: &CallContext, manifest: &str) -> Result<ApplyOutcome, TektonError> {
        ApplyEngine::new(self.cluster.as_ref())
            .apply(ctx, &self.namespace, manifest, &K::kind(&()))
            .await
    }
}

/// Drop bookkeeping metadata clients never want to see in list output
fn normalize<K: Resource>(mut item: K) -> K {
    item.annotations_mut().remove(LAST_APPLIED_ANNOTATION);
    item.meta_mut().managed_fields = None;
    item
}

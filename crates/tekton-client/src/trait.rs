//! ClusterApi trait for mocking
//!
//! This trait abstracts the dynamic side of the Kubernetes API (discovery,
//! untyped get/create/update, secret listing) so the apply engine and the
//! credential resolver can be unit tested against an in-memory cluster.
//! [`KubeCluster`](crate::cluster::KubeCluster) is the real implementation.

use crate::context::CallContext;
use crate::error::TektonError;
use crate::mapper::{DiscoveredResource, ResourceMapping};
use kube::api::DynamicObject;

/// A secret seen while scanning a namespace for a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretToken {
    /// Secret name
    pub name: String,
    /// Decoded `data.token`, if the secret has one
    pub token: Option<String>,
}

/// Trait for the cluster operations the apply engine depends on
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
/// `namespace: None` addresses the resource without a namespace segment.
#[async_trait::async_trait]
pub trait ClusterApi: Send + Sync {
    /// Resources served under `group/version`, read from live discovery.
    /// An empty `group` is the core group.
    async fn discover(
        &self,
        ctx: &CallContext,
        group: &str,
        version: &str,
    ) -> Result<Vec<DiscoveredResource>, TektonError>;

    /// Fetch one object. A missing object is `TektonError::NotFound`.
    async fn get(
        &self,
        ctx: &CallContext,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, TektonError>;

    /// Create `object`. An existing object with the same name is a 409.
    async fn create(
        &self,
        ctx: &CallContext,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> Result<DynamicObject, TektonError>;

    /// Replace an existing object with `object`
    async fn update(
        &self,
        ctx: &CallContext,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> Result<DynamicObject, TektonError>;

    /// All secrets in `namespace`, with their `token` key decoded
    async fn list_secrets(
        &self,
        ctx: &CallContext,
        namespace: &str,
    ) -> Result<Vec<SecretToken>, TektonError>;
}

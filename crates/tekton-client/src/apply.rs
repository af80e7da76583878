//! Apply engine
//!
//! Applies a manifest stream to the cluster with create-or-update semantics,
//! one document at a time:
//!
//! 1. decode the next document; an exhausted stream ends the call
//! 2. check the document's kind against the expected kind
//! 3. resolve its group/version/kind through fresh discovery
//! 4. probe for an existing object by target namespace and name
//! 5. create it when absent, update it when present
//!
//! Processing is fail-fast. Documents applied before a failure stay applied.
//! A successful create ends the call without looking at the remaining
//! documents; a successful update moves on to the next one.
//!
//! The update is scoped to the target namespace only when the target equals
//! the namespace the document declares (an undeclared namespace counts as
//! empty). Otherwise the update is issued without a namespace.

use crate::cluster_trait::ClusterApi;
use crate::context::CallContext;
use crate::error::TektonError;
use crate::manifest::ManifestDecoder;
use crate::mapper::{self, ResourceMapping, parse_gvk};
use kube::api::DynamicObject;
use tracing::{debug, info, warn};

/// What the engine did with one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyAction {
    /// The object did not exist and was created
    Created,
    /// An existing object was replaced
    Updated,
}

/// One applied document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedResource {
    /// Kind of the document, e.g. `Task`
    pub kind: String,
    /// Name returned by the server (resolved from `generateName` on create)
    pub name: String,
    /// Namespace the object lives in, `None` for cluster-scoped kinds
    pub namespace: Option<String>,
    /// Whether the document was created or updated
    pub action: ApplyAction,
}

/// Report of one apply call, in application order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Applied documents
    pub applied: Vec<AppliedResource>,
}

impl ApplyOutcome {
    /// Number of documents that were created
    pub fn created(&self) -> usize {
        self.count(ApplyAction::Created)
    }

    /// Number of documents that were updated
    pub fn updated(&self) -> usize {
        self.count(ApplyAction::Updated)
    }

    /// Whether nothing was applied
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    fn count(&self, action: ApplyAction) -> usize {
        self.applied.iter().filter(|a| a.action == action).count()
    }
}

/// Create-or-update engine over any `ClusterApi`
#[derive(Debug)]
pub struct ApplyEngine<'a, C: ClusterApi + ?Sized> {
    cluster: &'a C,
}

impl<'a, C: ClusterApi + ?Sized> ApplyEngine<'a, C> {
    /// Engine applying through `cluster`
    pub fn new(cluster: &'a C) -> Self {
        Self { cluster }
    }

    /// Apply every document of `manifest` into `namespace`, requiring each
    /// to be of `expected_kind`.
    pub async fn apply(
        &self,
        ctx: &CallContext,
        namespace: &str,
        manifest: &str,
        expected_kind: &str,
    ) -> Result<ApplyOutcome, TektonError> {
        let mut outcome = ApplyOutcome::default();

        // The YAML decoder is not Send; decode up front, apply in order
        let documents: Vec<_> = ManifestDecoder::new(manifest).collect();
        debug!(
            "Applying {} document(s) of kind {} into namespace '{}'",
            documents.len(),
            expected_kind,
            namespace
        );

        for (index, document) in documents.into_iter().enumerate() {
            ctx.check()?;
            let object = document.inspect_err(|e| {
                warn!("Rejected manifest document {}: {}", index, e);
            })?;

            let applied = self
                .apply_document(ctx, namespace, object, expected_kind)
                .await?;
            let action = applied.action;
            outcome.applied.push(applied);
            if action == ApplyAction::Created {
                debug!("Create succeeded, ending apply after document {}", index);
                return Ok(outcome);
            }
        }

        debug!("Manifest stream exhausted");
        Ok(outcome)
    }

    async fn apply_document(
        &self,
        ctx: &CallContext,
        namespace: &str,
        mut object: DynamicObject,
        expected_kind: &str,
    ) -> Result<AppliedResource, TektonError> {
        let types = object.types.clone().unwrap_or_default();
        if types.kind != expected_kind {
            warn!(
                "Rejected {} document: expected kind {}",
                types.kind, expected_kind
            );
            return Err(TektonError::KindMismatch {
                found: types.kind,
                expected: expected_kind.to_string(),
            });
        }

        let gvk = parse_gvk(&types.api_version, &types.kind)?;
        let mapping = mapper::resolve(self.cluster, ctx, &gvk).await?;
        let target = if mapping.namespaced {
            non_empty(namespace)
        } else {
            None
        };
        let name = object.metadata.name.clone().unwrap_or_default();

        // generateName objects cannot be probed and are always created
        if name.is_empty() {
            debug!("{} has no name, creating from generateName", types.kind);
            return self.create(ctx, &mapping, target, &object, &name).await;
        }

        debug!("Probing for {} {} in {:?}", types.kind, name, target);
        let live = match self.cluster.get(ctx, &mapping, target, &name).await {
            Ok(live) => live,
            Err(e) if e.is_not_found() => {
                return self.create(ctx, &mapping, target, &object, &name).await;
            }
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                warn!("Probe for {} {} failed, creating instead: {}", types.kind, name, e);
                return self.create(ctx, &mapping, target, &object, &name).await;
            }
        };

        if object.metadata.resource_version.is_none() {
            object.metadata.resource_version = live.metadata.resource_version.clone();
        }
        let declared = object.metadata.namespace.as_deref().unwrap_or_default();
        let scope = if namespace == declared { target } else { None };
        debug!("Updating {} {} with namespace scope {:?}", types.kind, name, scope);

        let updated = self
            .cluster
            .update(ctx, &mapping, scope, &object)
            .await
            .map_err(|e| TektonError::apply(&name, e))?;
        info!("Updated {} {}", types.kind, name);

        Ok(AppliedResource {
            kind: types.kind,
            name,
            namespace: updated.metadata.namespace,
            action: ApplyAction::Updated,
        })
    }

    async fn create(
        &self,
        ctx: &CallContext,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        object: &DynamicObject,
        name: &str,
    ) -> Result<AppliedResource, TektonError> {
        let created = self
            .cluster
            .create(ctx, mapping, namespace, object)
            .await
            .map_err(|e| TektonError::apply(name, e))?;
        let name = created.metadata.name.clone().unwrap_or_else(|| name.to_string());
        info!("Created {} {}", mapping.gvk.kind, name);

        Ok(AppliedResource {
            kind: mapping.gvk.kind.clone(),
            name,
            namespace: created.metadata.namespace,
            action: ApplyAction::Created,
        })
    }
}

fn non_empty(namespace: &str) -> Option<&str> {
    (!namespace.is_empty()).then_some(namespace)
}

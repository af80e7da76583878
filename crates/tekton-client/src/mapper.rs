//! Resource-type mapping
//!
//! Resolves the group/version/kind written in a manifest to the plural
//! resource name and scope the API server expects in its REST paths. The
//! mapping is built from live discovery on every call and never cached, so
//! a CRD installed a moment ago is visible to the very next apply.

use crate::cluster_trait::ClusterApi;
use crate::context::CallContext;
use crate::error::TektonError;
use kube::core::{GroupVersionKind, GroupVersionResource};
use tracing::debug;

/// One entry of a discovery document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredResource {
    /// Plural resource name, e.g. "tasks"
    pub name: String,
    /// Kind served by the resource, e.g. "Task"
    pub kind: String,
    pub namespaced: bool,
}

impl DiscoveredResource {
    /// Catalog entry for plural `name` serving `kind`
    pub fn new(name: impl Into<String>, kind: impl Into<String>, namespaced: bool) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            namespaced,
        }
    }
}

/// A resolved GVK → GVR mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMapping {
    pub gvk: GroupVersionKind,
    pub gvr: GroupVersionResource,
    pub namespaced: bool,
}

/// Split `group/version` (or a bare core `version`) into its parts.
/// Returns `None` for empty or malformed values such as `a/b/c` or `/v1`.
pub fn split_api_version(api_version: &str) -> Option<(&str, &str)> {
    let (group, version) = match api_version.split_once('/') {
        Some((group, version)) => {
            if group.is_empty() {
                return None;
            }
            (group, version)
        }
        None => ("", api_version),
    };
    if version.is_empty() || version.contains('/') || api_version.trim() != api_version {
        return None;
    }
    Some((group, version))
}

/// Build a GVK from manifest fields, rejecting malformed `apiVersion` values
pub fn parse_gvk(api_version: &str, kind: &str) -> Result<GroupVersionKind, TektonError> {
    let (group, version) = split_api_version(api_version).ok_or_else(|| {
        TektonError::Decode(format!("malformed apiVersion '{api_version}'"))
    })?;
    if kind.is_empty() {
        return Err(TektonError::Decode("Object 'Kind' is missing".to_string()));
    }
    Ok(GroupVersionKind::gvk(group, version, kind))
}

/// Discovery-backed mapper for a single group/version
#[derive(Debug, Clone)]
pub struct RestMapper {
    group: String,
    version: String,
    resources: Vec<DiscoveredResource>,
}

impl RestMapper {
    /// Build a mapper from discovery entries already fetched
    pub fn from_resources(
        group: impl Into<String>,
        version: impl Into<String>,
        resources: Vec<DiscoveredResource>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resources,
        }
    }

    /// Query live discovery for `group/version` and build a mapper from it
    pub async fn discover<C: ClusterApi + ?Sized>(
        cluster: &C,
        ctx: &CallContext,
        group: &str,
        version: &str,
    ) -> Result<Self, TektonError> {
        debug!("Discovering resources for {}/{}", group, version);
        let resources = cluster.discover(ctx, group, version).await?;
        Ok(Self::from_resources(group, version, resources))
    }

    /// Map `kind` to its resource. Kind matching is exact: no case folding,
    /// no plural or short-name guessing.
    pub fn mapping(&self, kind: &str) -> Result<ResourceMapping, TektonError> {
        let api_version = if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        };

        if self.resources.is_empty() {
            return Err(TektonError::Mapping {
                api_version,
                kind: kind.to_string(),
                reason: "group/version is not served by the cluster".to_string(),
            });
        }

        let resource = self
            .resources
            .iter()
            .find(|r| r.kind == kind)
            .ok_or_else(|| TektonError::Mapping {
                api_version: api_version.clone(),
                kind: kind.to_string(),
                reason: "kind is not served in this group/version".to_string(),
            })?;

        Ok(ResourceMapping {
            gvk: GroupVersionKind::gvk(&self.group, &self.version, kind),
            gvr: GroupVersionResource::gvr(&self.group, &self.version, &resource.name),
            namespaced: resource.namespaced,
        })
    }
}

/// Resolve a GVK against fresh discovery
pub async fn resolve<C: ClusterApi + ?Sized>(
    cluster: &C,
    ctx: &CallContext,
    gvk: &GroupVersionKind,
) -> Result<ResourceMapping, TektonError> {
    let mapper = RestMapper::discover(cluster, ctx, &gvk.group, &gvk.version).await?;
    let mapping = mapper.mapping(&gvk.kind)?;
    debug!(
        "Mapped {}/{} {} to resource {}",
        gvk.group, gvk.version, gvk.kind, mapping.gvr.resource
    );
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCluster;

    #[test]
    fn splits_group_and_core_versions() {
        assert_eq!(split_api_version("tekton.dev/v1"), Some(("tekton.dev", "v1")));
        assert_eq!(split_api_version("v1"), Some(("", "v1")));
        assert_eq!(split_api_version(""), None);
        assert_eq!(split_api_version("a/b/c"), None);
        assert_eq!(split_api_version("/v1"), None);
        assert_eq!(split_api_version("tekton.dev/"), None);
        assert_eq!(split_api_version(" v1"), None);
    }

    #[test]
    fn kind_match_is_case_sensitive() {
        let mapper = RestMapper::from_resources(
            "tekton.dev",
            "v1",
            vec![DiscoveredResource::new("tasks", "Task", true)],
        );
        assert_eq!(mapper.mapping("Task").unwrap().gvr.resource, "tasks");
        assert!(matches!(
            mapper.mapping("task"),
            Err(TektonError::Mapping { .. })
        ));
    }

    #[tokio::test]
    async fn resolves_tekton_kinds_through_discovery() {
        let cluster = MockCluster::with_tekton();
        let ctx = CallContext::background();
        let gvk = parse_gvk("triggers.tekton.dev/v1beta1", "EventListener").unwrap();

        let mapping = resolve(&cluster, &ctx, &gvk).await.unwrap();
        assert_eq!(mapping.gvr.resource, "eventlisteners");
        assert_eq!(mapping.gvr.group, "triggers.tekton.dev");
        assert_eq!(mapping.gvr.version, "v1beta1");
        assert!(mapping.namespaced);
    }

    #[tokio::test]
    async fn unknown_kind_is_a_mapping_error() {
        let cluster = MockCluster::with_tekton();
        let ctx = CallContext::background();
        let gvk = parse_gvk("tekton.dev/v1", "Bogus").unwrap();

        let err = resolve(&cluster, &ctx, &gvk).await.unwrap_err();
        assert!(matches!(err, TektonError::Mapping { ref kind, .. } if kind == "Bogus"));
    }

    #[tokio::test]
    async fn discovery_is_queried_on_every_resolution() {
        let cluster = MockCluster::with_tekton();
        let ctx = CallContext::background();
        let gvk = parse_gvk("tekton.dev/v1", "Task").unwrap();

        resolve(&cluster, &ctx, &gvk).await.unwrap();
        resolve(&cluster, &ctx, &gvk).await.unwrap();
        assert_eq!(cluster.discovery_calls(), 2);
    }
}

//! Mock cluster for unit testing
//!
//! This module provides an in-memory implementation of `ClusterApi` that can be
//! used in unit tests without a running API server.
//!
//! - `mod.rs` - discovery catalog, object store, secrets and the call log
//! - `helpers.rs` - helper functions for building fixture objects and manifests
//!
//! The mock follows the API server where it matters to the apply engine:
//! creating an object that already exists is a 409, an update whose
//! `resourceVersion` is stale is a 409, a namespaced object addressed
//! without a namespace is not found on `get` or `update`.

pub mod helpers;

use crate::cluster_trait::{ClusterApi, SecretToken};
use crate::context::CallContext;
use crate::error::TektonError;
use crate::mapper::{DiscoveredResource, ResourceMapping};
use kube::api::DynamicObject;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tekton_crds::TektonKind;

/// One call made against the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterCall {
    Discover {
        group: String,
        version: String,
    },
    Get {
        resource: String,
        namespace: Option<String>,
        name: String,
    },
    Create {
        resource: String,
        namespace: Option<String>,
        name: String,
    },
    Update {
        resource: String,
        namespace: Option<String>,
        name: String,
    },
    ListSecrets {
        namespace: String,
    },
}

type ObjectKey = (String, String, String);

/// In-memory `ClusterApi`
#[derive(Clone, Default)]
pub struct MockCluster {
    // (group, version) -> served resources
    pub(crate) catalog: Arc<Mutex<HashMap<(String, String), Vec<DiscoveredResource>>>>,
    // (resource, namespace, name) -> object; cluster-scoped objects use ""
    pub(crate) objects: Arc<Mutex<BTreeMap<ObjectKey, DynamicObject>>>,
    pub(crate) secrets: Arc<Mutex<HashMap<String, Vec<SecretToken>>>>,
    pub(crate) calls: Arc<Mutex<Vec<ClusterCall>>>,
    pub(crate) reject_creates: Arc<Mutex<Option<(u16, String)>>>,
    pub(crate) reject_updates: Arc<Mutex<Option<(u16, String)>>>,
    pub(crate) reject_gets: Arc<Mutex<Option<(u16, String)>>>,
    pub(crate) latency: Arc<Mutex<Option<Duration>>>,
    // Counter for resourceVersion values
    pub(crate) next_version: Arc<Mutex<u64>>,
}

impl std::fmt::Debug for MockCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCluster")
            .field("objects", &self.objects.lock().unwrap().len())
            .field("calls", &self.calls.lock().unwrap().len())
            .finish_non_exhaustive()
    }
}

impl MockCluster {
    /// Create an empty mock: no groups served, no objects, no secrets
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock serving the Tekton Pipelines and Triggers groups
    pub fn with_tekton() -> Self {
        let cluster = Self::new();
        for kind in TektonKind::ALL {
            cluster.add_resource(
                kind.group(),
                kind.version(),
                DiscoveredResource::new(kind.plural(), kind.kind(), true),
            );
        }
        cluster.add_resource(
            "tekton.dev",
            "v1",
            DiscoveredResource::new("taskruns", "TaskRun", true),
        );
        cluster.add_resource(
            "triggers.tekton.dev",
            "v1beta1",
            DiscoveredResource::new("clustertriggerbindings", "ClusterTriggerBinding", false),
        );
        cluster
    }

    /// Serve `resource` under `group/version`
    pub fn add_resource(&self, group: &str, version: &str, resource: DiscoveredResource) {
        self.catalog
            .lock()
            .unwrap()
            .entry((group.to_string(), version.to_string()))
            .or_default()
            .push(resource);
    }

    /// Store an object as if it already existed in the cluster
    pub fn seed(&self, resource: &str, mut object: DynamicObject) {
        let namespace = object.metadata.namespace.clone().unwrap_or_default();
        let name = object.metadata.name.clone().unwrap_or_default();
        if object.metadata.resource_version.is_none() {
            object.metadata.resource_version = Some(self.bump_version());
        }
        self.objects
            .lock()
            .unwrap()
            .insert((resource.to_string(), namespace, name), object);
    }

    /// Add a secret to `namespace`
    pub fn add_secret(&self, namespace: &str, name: &str, token: Option<&str>) {
        self.secrets
            .lock()
            .unwrap()
            .entry(namespace.to_string())
            .or_default()
            .push(SecretToken {
                name: name.to_string(),
                token: token.map(str::to_string),
            });
    }

    /// Fail every create with the given API status
    pub fn reject_creates(&self, code: u16, message: &str) {
        *self.reject_creates.lock().unwrap() = Some((code, message.to_string()));
    }

    /// Fail every update with the given API status
    pub fn reject_updates(&self, code: u16, message: &str) {
        *self.reject_updates.lock().unwrap() = Some((code, message.to_string()));
    }

    /// Fail every get with the given API status
    pub fn reject_gets(&self, code: u16, message: &str) {
        *self.reject_gets.lock().unwrap() = Some((code, message.to_string()));
    }

    /// Delay every call by `latency`
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap() = Some(latency);
        self
    }

    /// Look up a stored object
    pub fn object(&self, resource: &str, namespace: &str, name: &str) -> Option<DynamicObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(resource.to_string(), namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<ClusterCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn discovery_calls(&self) -> usize {
        self.count(|c| matches!(c, ClusterCall::Discover { .. }))
    }

    pub fn creates(&self) -> usize {
        self.count(|c| matches!(c, ClusterCall::Create { .. }))
    }

    pub fn updates(&self) -> usize {
        self.count(|c| matches!(c, ClusterCall::Update { .. }))
    }

    /// Creates and updates: every call that would change cluster state
    pub fn mutations(&self) -> usize {
        self.creates() + self.updates()
    }

    fn count(&self, pred: impl Fn(&ClusterCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: ClusterCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn bump_version(&self) -> String {
        let mut next = self.next_version.lock().unwrap();
        *next += 1;
        next.to_string()
    }

    async fn delay(&self) {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn rejection(slot: &Mutex<Option<(u16, String)>>) -> Option<TektonError> {
        slot.lock().unwrap().as_ref().map(|(code, message)| {
            if *code == 404 {
                TektonError::NotFound(message.clone())
            } else {
                TektonError::Api {
                    code: *code,
                    reason: reason_for(*code).to_string(),
                    message: message.clone(),
                }
            }
        })
    }
}

fn reason_for(code: u16) -> &'static str {
    match code {
        400 => "BadRequest",
        403 => "Forbidden",
        409 => "Conflict",
        422 => "Invalid",
        500 => "InternalError",
        503 => "ServiceUnavailable",
        _ => "Unknown",
    }
}

fn not_found(mapping: &ResourceMapping, name: &str) -> TektonError {
    TektonError::NotFound(format!(
        "{}.{} \"{}\" not found",
        mapping.gvr.resource, mapping.gvr.group, name
    ))
}

fn scope_key(mapping: &ResourceMapping, namespace: Option<&str>) -> String {
    if mapping.namespaced {
        namespace.unwrap_or_default().to_string()
    } else {
        String::new()
    }
}

#[async_trait::async_trait]
impl ClusterApi for MockCluster {
    async fn discover(
        &self,
        ctx: &CallContext,
        group: &str,
        version: &str,
    ) -> Result<Vec<DiscoveredResource>, TektonError> {
        ctx.run(async {
            self.delay().await;
            self.record(ClusterCall::Discover {
                group: group.to_string(),
                version: version.to_string(),
            });
            Ok(self
                .catalog
                .lock()
                .unwrap()
                .get(&(group.to_string(), version.to_string()))
                .cloned()
                .unwrap_or_default())
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
        ctx.run(async {
            self.delay().await;
            self.record(ClusterCall::Get {
                resource: mapping.gvr.resource.clone(),
                namespace: namespace.map(str::to_string),
                name: name.to_string(),
            });
            if let Some(err) = Self::rejection(&self.reject_gets) {
                return Err(err);
            }
            // A namespaced resource addressed without a namespace has no object path
            if mapping.namespaced && namespace.is_none() {
                return Err(not_found(mapping, name));
            }
            let key = (
                mapping.gvr.resource.clone(),
                scope_key(mapping, namespace),
                name.to_string(),
            );
            self.objects
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .ok_or_else(|| not_found(mapping, name))
        })
        .await
    }

    async fn create(
        &self,
        ctx: &CallContext,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> Result<DynamicObject, TektonError> {
        ctx.run(async {
            self.delay().await;
            let mut created = object.clone();
            if created.metadata.name.as_deref().unwrap_or_default().is_empty() {
                if let Some(prefix) = created.metadata.generate_name.clone() {
                    let suffix = self.bump_version();
                    created.metadata.name = Some(format!("{prefix}{suffix:0>5}"));
                }
            }
            let name = created.metadata.name.clone().unwrap_or_default();
            self.record(ClusterCall::Create {
                resource: mapping.gvr.resource.clone(),
                namespace: namespace.map(str::to_string),
                name: name.clone(),
            });
            if let Some(err) = Self::rejection(&self.reject_creates) {
                return Err(err);
            }
            if name.is_empty() {
                return Err(TektonError::Api {
                    code: 422,
                    reason: "Invalid".to_string(),
                    message: "metadata.name: Required value".to_string(),
                });
            }

            let scope = scope_key(mapping, namespace);
            if mapping.namespaced {
                match created.metadata.namespace.as_deref() {
                    Some(declared) if !declared.is_empty() && declared != scope => {
                        return Err(TektonError::Api {
                            code: 400,
                            reason: "BadRequest".to_string(),
                            message: "the namespace of the provided object does not match the namespace sent on the request".to_string(),
                        });
                    }
                    _ => created.metadata.namespace = Some(scope.clone()),
                }
            }

            let key = (mapping.gvr.resource.clone(), scope, name.clone());
            let mut objects = self.objects.lock().unwrap();
            if objects.contains_key(&key) {
                return Err(TektonError::Api {
                    code: 409,
                    reason: "AlreadyExists".to_string(),
                    message: format!(
                        "{}.{} \"{}\" already exists",
                        mapping.gvr.resource, mapping.gvr.group, name
                    ),
                });
            }
            created.metadata.resource_version = Some(self.bump_version());
            created.metadata.uid = Some(format!("uid-{name}"));
            objects.insert(key, created.clone());
            Ok(created)
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
        ctx.run(async {
            self.delay().await;
            let name = object.metadata.name.clone().unwrap_or_default();
            self.record(ClusterCall::Update {
                resource: mapping.gvr.resource.clone(),
                namespace: namespace.map(str::to_string),
                name: name.clone(),
            });
            if let Some(err) = Self::rejection(&self.reject_updates) {
                return Err(err);
            }

            if namespace.is_none() && mapping.namespaced {
                return Err(not_found(mapping, &name));
            }
            let key = (
                mapping.gvr.resource.clone(),
                scope_key(mapping, namespace),
                name.clone(),
            );

            let mut objects = self.objects.lock().unwrap();
            let live = objects.get(&key).ok_or_else(|| not_found(mapping, &name))?;
            if object.metadata.resource_version.is_some()
                && object.metadata.resource_version != live.metadata.resource_version
            {
                return Err(TektonError::Api {
                    code: 409,
                    reason: "Conflict".to_string(),
                    message: format!(
                        "Operation cannot be fulfilled on {}.{} \"{}\": the object has been modified",
                        mapping.gvr.resource, mapping.gvr.group, name
                    ),
                });
            }

            let mut updated = object.clone();
            updated.metadata.namespace = live.metadata.namespace.clone();
            updated.metadata.uid = live.metadata.uid.clone();
            updated.metadata.resource_version = Some(self.bump_version());
            objects.insert(key, updated.clone());
            Ok(updated)
        })
        .await
    }

    async fn list_secrets(
        &self,
        ctx: &CallContext,
        namespace: &str,
    ) -> Result<Vec<SecretToken>, TektonError> {
        ctx.run(async {
            self.delay().await;
            self.record(ClusterCall::ListSecrets {
                namespace: namespace.to_string(),
            });
            Ok(self
                .secrets
                .lock()
                .unwrap()
                .get(namespace)
                .cloned()
                .unwrap_or_default())
        })
        .await
    }
}

//! Tekton Client
//!
//! A Rust client library for Tekton Pipelines and Tekton Triggers resources.
//! Provides typed facades for the six Tekton kinds and a discovery-driven
//! engine that applies YAML or JSON manifests with create-or-update semantics.
//!
//! # Example
//!
//! ```no_run
//! use tekton_client::{CallContext, ClientConfig, ListOptions, TektonClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a client from a kubeconfig
//! let config = ClientConfig::new()
//!     .with_kubeconfig("./kubeconfig")
//!     .with_secret_prefix("default-token");
//! let client = TektonClient::new(config).await?;
//! let ctx = CallContext::background();
//!
//! // Create or update a Task
//! let tasks = client.task(&ctx, "default").await?;
//! tasks.create(&ctx, "apiVersion: tekton.dev/v1\nkind: Task\nmetadata:\n  name: testtask\nspec: {}\n").await?;
//!
//! // Query Tasks by label
//! let items = tasks.list(&ctx, &ListOptions::new().labels("app=testtask").limit(3)).await?;
//!
//! // Export a Task without its status
//! let yaml = tasks.get_yaml(&ctx, "testtask").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Apply Engine**: multi-document manifests, kind checking, fresh discovery per apply
//! - **Typed Facades**: list/get/get-yaml/delete/create for Task, Pipeline, PipelineRun,
//!   TriggerBinding, TriggerTemplate and EventListener
//! - **Credentials**: bearer token from config, kubeconfig or a namespace secret
//! - **Cancellation**: every network call honours a `CallContext` deadline or cancel

pub mod apply;
pub mod client;
pub mod cluster;
pub mod common;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod manifest;
pub mod mapper;
pub mod resources;
#[path = "trait.rs"]
pub mod cluster_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use apply::{ApplyAction, ApplyEngine, ApplyOutcome, AppliedResource};
pub use client::TektonClient;
pub use cluster::KubeCluster;
pub use cluster_trait::{ClusterApi, SecretToken};
pub use common::query::ListOptions;
pub use common::{HttpClient, ListResponse};
pub use config::ClientConfig;
pub use context::{CallContext, CancelHandle};
pub use credentials::CredentialResolver;
pub use error::TektonError;
pub use manifest::{ManifestDecoder, decode_all};
pub use mapper::{DiscoveredResource, ResourceMapping, RestMapper};
pub use resources::*;
pub use tekton_crds as crds;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockCluster;

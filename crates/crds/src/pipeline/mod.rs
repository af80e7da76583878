//! Tekton Pipelines resources (`tekton.dev/v1`)

pub mod pipeline;
pub mod pipeline_run;
pub mod task;

pub use pipeline::*;
pub use pipeline_run::*;
pub use task::*;

/// API group of the Tekton Pipelines resources
pub const PIPELINE_GROUP: &str = "tekton.dev";

/// API version served for the Tekton Pipelines resources
pub const PIPELINE_VERSION: &str = "v1";

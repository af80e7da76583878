//! Tekton CRD Definitions
//!
//! Typed models of the Tekton Pipelines (`tekton.dev/v1`) and Tekton Triggers
//! (`triggers.tekton.dev/v1beta1`) custom resources, plus the export shape
//! used when rendering resources back to YAML.

pub mod common;
pub mod kind;
pub mod manifest;
pub mod pipeline;
pub mod triggers;

pub use common::*;
pub use kind::{TektonKind, UnknownKind};
pub use manifest::{LAST_APPLIED_ANNOTATION, ManifestMetadata, TektonManifest};
pub use pipeline::*;
pub use triggers::*;

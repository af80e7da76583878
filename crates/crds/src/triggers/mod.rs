//! Tekton Triggers resources (`triggers.tekton.dev/v1beta1`)

pub mod event_listener;
pub mod trigger_binding;
pub mod trigger_template;

pub use event_listener::*;
pub use trigger_binding::*;
pub use trigger_template::*;

/// API group of the Tekton Triggers resources
pub const TRIGGERS_GROUP: &str = "triggers.tekton.dev";

/// API version served for the Tekton Triggers resources
pub const TRIGGERS_VERSION: &str = "v1beta1";

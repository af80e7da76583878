//! The Tekton kinds known at compile time
//!
//! `TektonKind` is the closed set of resource types the SDK ships typed
//! facades for. Everything else goes through the untyped apply path.

use crate::pipeline::{PIPELINE_GROUP, PIPELINE_VERSION};
use crate::triggers::{TRIGGERS_GROUP, TRIGGERS_VERSION};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string names none of the Tekton kinds
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown Tekton kind '{0}' (expected one of: task, pipeline, pipelinerun, triggerbinding, triggertemplate, eventlistener)")]
pub struct UnknownKind(pub String);

/// One of the six Tekton resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TektonKind {
    /// `tekton.dev/v1` Task
    Task,
    /// `tekton.dev/v1` Pipeline
    Pipeline,
    /// `tekton.dev/v1` PipelineRun
    PipelineRun,
    /// `triggers.tekton.dev/v1beta1` TriggerBinding
    TriggerBinding,
    /// `triggers.tekton.dev/v1beta1` TriggerTemplate
    TriggerTemplate,
    /// `triggers.tekton.dev/v1beta1` EventListener
    EventListener,
}

impl TektonKind {
    /// All kinds, Pipelines resources first
    pub const ALL: [TektonKind; 6] = [
        TektonKind::Task,
        TektonKind::Pipeline,
        TektonKind::PipelineRun,
        TektonKind::TriggerBinding,
        TektonKind::TriggerTemplate,
        TektonKind::EventListener,
    ];

    /// The `kind` field value, case-sensitive
    pub fn kind(self) -> &'static str {
        match self {
            TektonKind::Task => "Task",
            TektonKind::Pipeline => "Pipeline",
            TektonKind::PipelineRun => "PipelineRun",
            TektonKind::TriggerBinding => "TriggerBinding",
            TektonKind::TriggerTemplate => "TriggerTemplate",
            TektonKind::EventListener => "EventListener",
        }
    }

    /// API group serving the kind
    pub fn group(self) -> &'static str {
        if self.is_trigger() {
            TRIGGERS_GROUP
        } else {
            PIPELINE_GROUP
        }
    }

    /// API version served for the kind
    pub fn version(self) -> &'static str {
        if self.is_trigger() {
            TRIGGERS_VERSION
        } else {
            PIPELINE_VERSION
        }
    }

    /// Plural resource name used in REST paths
    pub fn plural(self) -> &'static str {
        match self {
            TektonKind::Task => "tasks",
            TektonKind::Pipeline => "pipelines",
            TektonKind::PipelineRun => "pipelineruns",
            TektonKind::TriggerBinding => "triggerbindings",
            TektonKind::TriggerTemplate => "triggertemplates",
            TektonKind::EventListener => "eventlisteners",
        }
    }

    /// `group/version` as written in manifests
    pub fn api_version(self) -> String {
        format!("{}/{}", self.group(), self.version())
    }

    fn is_trigger(self) -> bool {
        matches!(
            self,
            TektonKind::TriggerBinding | TektonKind::TriggerTemplate | TektonKind::EventListener
        )
    }
}

impl fmt::Display for TektonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Parses kind names case-insensitively, accepting singular and plural forms
/// ("Task", "tasks", "pipelinerun", "EventListeners").
impl FromStr for TektonKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        TektonKind::ALL
            .into_iter()
            .find(|k| k.kind().to_ascii_lowercase() == lower || k.plural() == lower)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

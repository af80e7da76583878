//! Tekton client errors

use thiserror::Error;

/// Errors that can occur when talking to the cluster through the Tekton client
#[derive(Debug, Error)]
pub enum TektonError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// kube client or configuration error that is not an API status
    #[error("Kubernetes client error: {0}")]
    Kube(#[from] kube::Error),

    /// The API server answered with a non-success status.
    /// `code` and `message` are the server's own.
    #[error("Kubernetes API error ({code} {reason}): {message}")]
    Api {
        code: u16,
        reason: String,
        message: String,
    },

    /// A manifest document could not be parsed
    #[error("decode error: {0}")]
    Decode(String),

    /// A manifest document is not of the kind the caller asked to apply
    #[error("Kind {found} mismatch with {expected}")]
    KindMismatch { found: String, expected: String },

    /// Discovery has no resource for the group/version/kind
    #[error("no resource mapping for kind {kind} in {api_version}: {reason}")]
    Mapping {
        api_version: String,
        kind: String,
        reason: String,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The cluster rejected a create or update
    #[error("unable to apply resource {name}: {source}")]
    Apply {
        name: String,
        #[source]
        source: Box<TektonError>,
    },

    /// No bearer token could be resolved for a namespace
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The call context was cancelled or its deadline passed
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TektonError {
    /// HTTP status code reported by the API server, looking through `Apply`
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TektonError::Api { code, .. } => Some(*code),
            TektonError::NotFound(_) => Some(404),
            TektonError::Http(e) => e.status().map(|s| s.as_u16()),
            TektonError::Apply { source, .. } => source.status_code(),
            _ => None,
        }
    }

    /// Whether this error means the resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Whether this error came from a cancelled or expired call context
    pub fn is_cancelled(&self) -> bool {
        match self {
            TektonError::Cancelled(_) => true,
            TektonError::Apply { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// Server-side failures worth retrying: 5xx and 429
    pub fn is_transient(&self) -> bool {
        matches!(self.status_code(), Some(code) if code >= 500 || code == 429)
    }

    /// Wrap a create/update failure with the name of the resource being applied.
    /// Cancellation is passed through unwrapped so it stays distinguishable.
    pub(crate) fn apply(name: &str, source: TektonError) -> TektonError {
        if source.is_cancelled() {
            return source;
        }
        TektonError::Apply {
            name: name.to_string(),
            source: Box::new(source),
        }
    }
}

/// Convert kube errors, keeping the server's status code and message when there is one
pub(crate) fn from_kube(err: kube::Error) -> TektonError {
    match err {
        kube::Error::Api(resp) if resp.code == 404 => TektonError::NotFound(resp.message),
        kube::Error::Api(resp) => TektonError::Api {
            code: resp.code,
            reason: resp.reason,
            message: resp.message,
        },
        other => TektonError::Kube(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_error_keeps_server_code() {
        let err = TektonError::apply(
            "testtask",
            TektonError::Api {
                code: 503,
                reason: "ServiceUnavailable".to_string(),
                message: "etcd leader changed".to_string(),
            },
        );
        assert_eq!(err.status_code(), Some(503));
        assert!(err.is_transient());
        assert!(err.to_string().contains("testtask"));
        assert!(err.to_string().contains("etcd leader changed"));
    }

    #[test]
    fn cancellation_is_not_wrapped() {
        let err = TektonError::apply("x", TektonError::Cancelled("deadline exceeded".into()));
        assert!(matches!(err, TektonError::Cancelled(_)));
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = TektonError::Api {
            code: 422,
            reason: "Invalid".to_string(),
            message: "spec.steps: Required value".to_string(),
        };
        assert!(!err.is_transient());
        assert!(!err.is_not_found());
        assert!(TektonError::NotFound("tasks/x".into()).is_not_found());
    }
}

//! Client configuration
//!
//! `ClientConfig` is built once by the caller and handed to
//! [`TektonClient::new`](crate::TektonClient::new). It is never mutated
//! afterwards and nothing in the crate reads configuration from globals.

use secrecy::SecretString;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-request HTTP timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection, credential and logging settings for a [`TektonClient`](crate::TektonClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Kubeconfig to load. `None` means in-cluster configuration.
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of the current one
    pub context: Option<String>,
    /// Prefix of the secret holding the namespace's bearer token
    pub secret_prefix: String,
    /// Preconfigured bearer token; skips secret discovery when set
    pub bearer_token: Option<SecretString>,
    /// Log request and response bodies at debug level
    pub debug: bool,
    /// Skip TLS verification on the raw HTTP client
    pub insecure_skip_tls_verify: bool,
    /// Per-request HTTP timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            secret_prefix: String::new(),
            bearer_token: None,
            debug: false,
            insecure_skip_tls_verify: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// In-cluster configuration with no secret prefix
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// * `TEKTON_KUBECONFIG` (falls back to `KUBECONFIG`)
    /// * `TEKTON_CONTEXT`
    /// * `TEKTON_SECRET_PREFIX`
    /// * `TEKTON_TOKEN`
    /// * `TEKTON_DEBUG` (`1`/`true` to enable)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.kubeconfig = env::var("TEKTON_KUBECONFIG")
            .or_else(|_| env::var("KUBECONFIG"))
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        config.context = env::var("TEKTON_CONTEXT").ok().filter(|s| !s.is_empty());
        config.secret_prefix = env::var("TEKTON_SECRET_PREFIX").unwrap_or_default();
        config.bearer_token = env::var("TEKTON_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::from);
        config.debug = env::var("TEKTON_DEBUG")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        config
    }

    /// Load this kubeconfig instead of the in-cluster configuration
    pub fn with_kubeconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    /// Use this kubeconfig context instead of the current one
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Prefix of the secret holding the namespace's token
    pub fn with_secret_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.secret_prefix = prefix.into();
        self
    }

    /// Fixed bearer token; disables the secret lookup
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(SecretString::from(token.into()));
        self
    }

    /// Log request and response bodies
    pub fn with_debug(mut self, enable: bool) -> Self {
        self.debug = enable;
        self
    }

    /// Accept any server certificate on facade calls
    pub fn with_insecure_skip_tls_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_tls_verify = skip;
        self
    }

    /// Per-request timeout of the facade HTTP client
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

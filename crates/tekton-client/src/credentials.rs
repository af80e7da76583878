//! Bearer-token resolution
//!
//! Facades authenticate their REST calls with a bearer token. A preset token
//! (from the client config or the kubeconfig) is used as is. Otherwise the
//! namespace's secrets are scanned for the first one whose name starts with
//! the configured prefix and that carries a `token` key.

use crate::cluster_trait::ClusterApi;
use crate::context::CallContext;
use crate::error::TektonError;
use secrecy::SecretString;
use tracing::debug;

/// Finds the bearer token for a namespace
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    secret_prefix: String,
    preset: Option<SecretString>,
}

impl CredentialResolver {
    /// Resolver scanning for `secret_prefix`, or always returning `preset` when set
    pub fn new(secret_prefix: impl Into<String>, preset: Option<SecretString>) -> Self {
        Self {
            secret_prefix: secret_prefix.into(),
            preset,
        }
    }

    /// Prefix of the secrets that may hold the token
    pub fn secret_prefix(&self) -> &str {
        &self.secret_prefix
    }

    /// Token for calls into `namespace`
    pub async fn resolve<C: ClusterApi + ?Sized>(
        &self,
        cluster: &C,
        ctx: &CallContext,
        namespace: &str,
    ) -> Result<SecretString, TektonError> {
        if let Some(token) = &self.preset {
            debug!("Using preconfigured bearer token for namespace {}", namespace);
            return Ok(token.clone());
        }

        debug!(
            "Looking up secret with prefix '{}' in namespace {}",
            self.secret_prefix, namespace
        );
        let secrets = cluster.list_secrets(ctx, namespace).await?;
        let secret = secrets
            .into_iter()
            .filter(|s| s.name.starts_with(&self.secret_prefix))
            .find(|s| s.token.as_deref().is_some_and(|t| !t.is_empty()))
            .ok_or_else(|| {
                TektonError::Authentication(format!(
                    "cannot find secret with prefix={} in namespace {}",
                    self.secret_prefix, namespace
                ))
            })?;

        debug!("Using token from secret {}", secret.name);
        Ok(SecretString::from(secret.token.unwrap_or_default()))
    }
}

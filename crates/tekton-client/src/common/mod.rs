//! Common utilities for the Tekton REST facades
//!
//! Provides the authenticated HTTP wrapper shared by every resource facade.

pub mod query;

use crate::context::CallContext;
use crate::error::TektonError;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use reqwest::{Client, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// List response wrapper from the Kubernetes API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Subset of a Kubernetes `Status` body used to report failures
#[derive(Debug, Default, Deserialize)]
struct StatusBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    reason: String,
}

/// HTTP client wrapper with bearer authentication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    debug: bool,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: impl Into<String>, debug: bool) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            debug,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Build a query string from key/value pairs
    pub fn build_query_string(&self, params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Make a GET request and decode the JSON body
    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        path: &str,
        token: &SecretString,
    ) -> Result<T, TektonError> {
        let body = self.send(ctx, Method::GET, path, token).await?;
        serde_json::from_str(&body).map_err(|e| {
            TektonError::Decode(format!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                body.chars().take(500).collect::<String>()
            ))
        })
    }

    /// Make a DELETE request
    pub async fn delete(
        &self,
        ctx: &CallContext,
        path: &str,
        token: &SecretString,
    ) -> Result<(), TektonError> {
        self.send(ctx, Method::DELETE, path, token).await?;
        Ok(())
    }

    async fn send(
        &self,
        ctx: &CallContext,
        method: Method,
        path: &str,
        token: &SecretString,
    ) -> Result<String, TektonError> {
        let url = self.build_url(path);
        debug!("{} {}", method, url);

        ctx.run(async {
            let response = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(token.expose_secret())
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(TektonError::Http)?;

            let status = response.status();
            let body = response.text().await.map_err(TektonError::Http)?;
            debug!("{} {} -> {}", method, path, status);
            if self.debug {
                debug!("Response body: {}", body);
            }

            if !status.is_success() {
                return Err(status_error(status, &body));
            }
            Ok(body)
        })
        .await
    }
}

/// Turn a failed response into an error, keeping the server's code and message
fn status_error(status: StatusCode, body: &str) -> TektonError {
    let parsed = serde_json::from_str::<StatusBody>(body).unwrap_or_default();
    let message = if parsed.message.is_empty() {
        body.to_string()
    } else {
        parsed.message
    };
    if status == StatusCode::NOT_FOUND {
        return TektonError::NotFound(message);
    }
    let reason = if parsed.reason.is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        parsed.reason
    };
    TektonError::Api {
        code: status.as_u16(),
        reason,
        message,
    }
}

//! Query utilities for list calls
//!
//! Provides list filtering options and pagination through continue tokens.

use crate::common::{HttpClient, ListResponse};
use crate::context::CallContext;
use crate::error::TektonError;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Page size used when the caller does not set one
pub const DEFAULT_LIMIT: u32 = 500;

/// Filters for a list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Label selector, e.g. `app=testtask`
    pub label_selector: Option<String>,
    /// Field selector, e.g. `metadata.name=testtask`
    pub field_selector: Option<String>,
    /// Maximum items per page; `None` or `0` means [`DEFAULT_LIMIT`]
    pub limit: Option<u32>,
    /// Continue token from a previous page
    pub continue_token: Option<String>,
}

impl ListOptions {
    /// Options with no filters and the default page size
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by label selector
    pub fn labels(mut self, selector: impl Into<String>) -> Self {
        self.label_selector = Some(selector.into());
        self
    }

    /// Filter by field selector
    pub fn fields(mut self, selector: impl Into<String>) -> Self {
        self.field_selector = Some(selector.into());
        self
    }

    /// Set the page size
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume from a continue token
    pub fn continue_from(mut self, token: impl Into<String>) -> Self {
        self.continue_token = Some(token.into());
        self
    }

    /// Query parameters in the order the API server documents them
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(selector) = self.label_selector.as_deref().filter(|s| !s.is_empty()) {
            params.push(("labelSelector", selector.to_string()));
        }
        if let Some(selector) = self.field_selector.as_deref().filter(|s| !s.is_empty()) {
            params.push(("fieldSelector", selector.to_string()));
        }
        let limit = self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT);
        params.push(("limit", limit.to_string()));
        if let Some(token) = self.continue_token.as_deref().filter(|s| !s.is_empty()) {
            params.push(("continue", token.to_string()));
        }
        params
    }
}

/// Fetch one page of a collection
pub async fn query_page<T: DeserializeOwned>(
    http: &HttpClient,
    ctx: &CallContext,
    collection: &str,
    token: &SecretString,
    opts: &ListOptions,
) -> Result<ListResponse<T>, TektonError> {
    let url = format!(
        "{}?{}",
        collection,
        http.build_query_string(&opts.query_params())
    );
    http.get(ctx, &url, token).await
}

/// Fetch every page of a collection by following continue tokens
pub async fn query_all<T: DeserializeOwned>(
    http: &HttpClient,
    ctx: &CallContext,
    collection: &str,
    token: &SecretString,
    opts: &ListOptions,
) -> Result<Vec<T>, TektonError> {
    let mut opts = opts.clone();
    let mut all_items = Vec::new();

    loop {
        let page: ListResponse<T> = query_page(http, ctx, collection, token, &opts).await?;
        all_items.extend(page.items);

        match page.metadata.continue_.filter(|c| !c.is_empty()) {
            Some(next) => {
                debug!("Fetching next page of {}", collection);
                opts.continue_token = Some(next);
            }
            None => break,
        }
    }

    Ok(all_items)
}

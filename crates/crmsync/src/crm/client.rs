//! Rate-limited CRM API client.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigError, SyncerConfig};
use crate::entity::resource_type::ResourceType;
use crate::http::{HttpRequest, HttpTransport};

use super::error::{CrmError, Result};
use super::rate_limit::ApiRateLimiter;
use super::types::{Page, PER_PAGE};

/// A client for one CRM tenant's listing endpoints.
///
/// Holds the credentials, the shared rate limiter and the transport. All
/// pagination sequences of a run go through the same client, so the minimum
/// inter-request delay is enforced across resources as well as within one
/// resource's pages.
///
/// GET semantics make every fetch idempotent at the protocol level, so a
/// failed page is safe to retry.
#[derive(Clone)]
pub struct CrmClient {
    base_url: String,
    api_key: String,
    transport: Arc<dyn HttpTransport>,
    limiter: ApiRateLimiter,
    request_timeout: Duration,
}

impl std::fmt::Debug for CrmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmClient")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl CrmClient {
    /// Create a client from a validated configuration.
    ///
    /// # Errors
    /// Returns `ConfigError` when the base URL or API key is missing or
    /// malformed; this is the fail-fast point for a misconfigured deployment.
    pub fn new(
        config: &SyncerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            base_url: config.base_url_trimmed().to_string(),
            api_key: config.api_key.trim().to_string(),
            transport,
            limiter: ApiRateLimiter::new(config.page_delay),
            request_timeout: config.request_timeout,
        })
    }

    /// Build the listing route for a resource page.
    #[must_use]
    pub fn route(&self, resource: ResourceType, page: u32) -> String {
        format!(
            "{}/{}?page={}&per_page={}",
            self.base_url,
            resource.collection(),
            page,
            PER_PAGE
        )
    }

    /// Fetch one listing page. `page` is 1-indexed.
    ///
    /// Waits on the shared rate limiter before issuing the request; the wait
    /// and the request together are bounded by the configured per-page
    /// timeout. Non-success statuses surface as [`CrmError::Api`], network
    /// failures and the elapsed timeout as [`CrmError::Transport`].
    pub async fn fetch_page(&self, resource: ResourceType, page: u32) -> Result<Page> {
        debug_assert!(page >= 1, "listing pages are 1-indexed");

        let request = HttpRequest::new(self.route(resource, page))
            .with_header("Authorization", format!("Token token={}", self.api_key))
            .with_header("Accept", "application/json");

        let attempt = async {
            self.limiter.wait().await;
            self.transport.get(request).await
        };

        let response = match tokio::time::timeout(self.request_timeout, attempt).await {
            Err(_) => {
                return Err(CrmError::timeout(format!(
                    "fetching {} page {} exceeded {:?}",
                    resource, page, self.request_timeout
                )));
            }
            Ok(Err(e)) => return Err(CrmError::transport(e.to_string())),
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            return Err(CrmError::api(response.status, &response.body));
        }

        let page = Page::from_response(resource, page, &response.body)?;
        tracing::trace!(
            %resource,
            records = page.records.len(),
            has_next = page.next_page.is_some(),
            "Fetched page"
        );
        Ok(page)
    }
}

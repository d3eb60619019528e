//! Sync configuration.
//!
//! All knobs the engine honors live in one explicit struct handed to the
//! client and orchestrator at construction. There is no ambient or global
//! configuration; required fields are validated up front so a misconfigured
//! deployment fails before the first request instead of partway through a run.

use std::time::Duration;

use thiserror::Error;

use crate::entity::resource_type::ResourceType;
use crate::retry::RetryConfig;
use crate::sync::types::{
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_MS,
};

/// Configuration errors raised at startup, before any sync work happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CRM base URL is not configured")]
    MissingBaseUrl,

    #[error("CRM base URL is not an http(s) URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("CRM API key is not configured")]
    MissingApiKey,

    #[error("no resource types configured to sync")]
    NoResources,

    #[error("max_pages must be at least 1")]
    ZeroMaxPages,
}

/// Configuration for a sync run.
#[derive(Debug, Clone)]
pub struct SyncerConfig {
    /// API base URL, e.g. `https://acme.myfreshworks.com/crm/sales/api`.
    pub base_url: String,
    /// API key sent as `Authorization: Token token=<key>`.
    pub api_key: String,
    /// Resource types to sync, in processing order.
    pub resource_types: Vec<ResourceType>,
    /// Minimum delay between paginated requests.
    pub page_delay: Duration,
    /// Safety bound on pages fetched per resource.
    pub max_pages: u32,
    /// Overall timeout for one page fetch (rate-limit wait + request).
    pub request_timeout: Duration,
    /// Retry policy for transient page-fetch failures.
    pub retry: RetryConfig,
}

impl SyncerConfig {
    /// Create a configuration with defaults for everything but the endpoint.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            resource_types: ResourceType::ALL.to_vec(),
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            max_pages: DEFAULT_MAX_PAGES,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            retry: RetryConfig::default(),
        }
    }

    /// Validate required fields. Called by the client constructor; callers
    /// building a config by hand can also invoke it directly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.resource_types.is_empty() {
            return Err(ConfigError::NoResources);
        }
        if self.max_pages == 0 {
            return Err(ConfigError::ZeroMaxPages);
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed, ready for route joining.
    #[must_use]
    pub(crate) fn base_url_trimmed(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}
